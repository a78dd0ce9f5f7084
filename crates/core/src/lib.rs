//! hufflimit-core: length-limited canonical Huffman compression
//!
//! This library compresses a byte stream with a static Huffman code whose
//! codeword lengths can be capped at a maximum `L`, and stores the result in
//! a small self-describing container:
//! - Byte frequencies are counted over the whole input
//! - A Huffman tree yields per-symbol code lengths
//! - Lengths deeper than `L` are folded back under the limit
//! - Canonical codes are rebuilt from the lengths alone
//! - The container header carries the lengths, the bitstream the codes
//!
//! # Architecture
//!
//! One module per stage:
//! - `frequency`: Byte histogram of the input
//! - `tree`: Arena Huffman tree and length extraction
//! - `lengths`: Validated per-symbol code length table
//! - `limit`: Length limiting and feasibility check
//! - `codebook`: Canonical code assignment and encoding
//! - `trie`: Decode trie for the bitstream
//! - `bitio`: Low-level bit reading/writing
//! - `container`: Header serialization
//! - `codec`: Compress/decompress over streams, buffers and files
//! - `stats`: Per-run statistics
//!
//! # Example
//!
//! ```
//! use hufflimit_core::{compress_bytes, decompress_bytes};
//!
//! let packed = compress_bytes(b"abracadabra", 3).unwrap();
//! assert_eq!(decompress_bytes(&packed).unwrap(), b"abracadabra");
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Fail early**: Infeasible limits are rejected before any output
//! - **Deterministic**: Identical input and limit give identical bytes

pub mod bitio;
pub mod codebook;
pub mod codec;
pub mod container;
pub mod error;
pub mod frequency;
pub mod lengths;
pub mod limit;
pub mod stats;
pub mod trie;
pub mod tree;

// Re-export commonly used types
pub use codebook::{Code, Codebook};
pub use codec::{
    compress, compress_bytes, compress_file, decompress, decompress_bytes, decompress_file,
    CompressOptions, Report,
};
pub use error::{Error, Result};
pub use lengths::{LengthTable, MAX_CODE_LENGTH};
pub use stats::{Direction, Stats};
