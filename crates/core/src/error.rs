//! Error types for the hufflimit codec.
//!
//! Every fallible operation returns a structured error instead of panicking.
//! The variants follow the stages of a run so a caller can tell a bad
//! request (configuration) from a damaged file (format or bitstream).

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all codec operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Config: the requested length limit cannot be honoured
/// - Format: the container header is malformed or truncated
/// - Bitstream: the packed payload is truncated or corrupt
/// - Huffman: internal codebook construction failed
/// - I/O: opening, reading or writing a source or sink
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid compression settings, detected before any output is written
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed container header
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Corrupt or truncated packed bitstream
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// Huffman codebook error
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// File or stream I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the requested compression settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// More distinct symbols than codes of length `limit` can address
    #[error(
        "length limit {limit} cannot encode {symbols} distinct symbols (need 2^limit >= {symbols})"
    )]
    InfeasibleLimit { symbols: usize, limit: u32 },

    /// Limit does not fit the one-byte header field
    #[error("length limit {0} exceeds 255")]
    LimitTooLarge(u32),

    /// Input and output resolve to the same file
    #[error("input and output are the same file: {}", .0.display())]
    SameFile(PathBuf),
}

/// Container header errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Magic tag mismatch
    #[error("invalid magic tag: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Header ended before the named field could be read
    #[error("truncated header while reading {field}")]
    Truncated { field: &'static str },

    /// Code length of zero or longer than the supported maximum
    #[error("invalid code length {length} for symbol {symbol:#04x}")]
    InvalidCodeLength { symbol: u8, length: u8 },

    /// Symbol listed twice in the length table
    #[error("symbol {0:#04x} appears more than once in the length table")]
    DuplicateSymbol(u8),

    /// Lengths violate the Kraft inequality, no prefix code exists
    #[error("code lengths are oversubscribed (Kraft sum exceeds 1)")]
    OversubscribedLengths,

    /// Symbol count larger than the byte alphabet
    #[error("symbol count {0} exceeds alphabet size 256")]
    TooManySymbols(u16),

    /// Non-empty payload announced with an empty length table
    #[error("original size {original_size} declared but no symbols present")]
    MissingSymbols { original_size: u32 },

    /// Input too long for the 32-bit size field
    #[error("input of {0} bytes exceeds the 4 GiB container limit")]
    InputTooLarge(u64),
}

/// Packed bitstream errors raised while decoding.
#[derive(Debug, Error)]
pub enum BitstreamError {
    /// Source ran out of bits before every symbol was decoded
    #[error("bitstream truncated: decoded {decoded} of {expected} symbols")]
    Truncated { decoded: u64, expected: u64 },

    /// Bit sequence does not lead to any code
    #[error("invalid code at bit position {bit_position}")]
    InvalidCode { bit_position: u64 },
}

/// Huffman codebook errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// Code length exceeds the widest code the codec can pack
    #[error("code length {length} exceeds maximum {max}")]
    CodeLengthTooLong { length: usize, max: usize },

    /// Encoder was handed a byte absent from the codebook
    #[error("symbol {0:#04x} has no code in the codebook")]
    SymbolNotInCodebook(u8),

    /// Two codes collide while building the decode trie
    #[error("code for symbol {symbol:#04x} collides with an existing code")]
    ConflictingCode { symbol: u8 },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
