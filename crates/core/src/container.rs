//! Container header serialization and parsing.
//!
//! The header makes a compressed file self-describing: it carries the
//! original size (so decoding knows when to stop) and the code length of
//! every present symbol. Codes themselves are never stored; canonical
//! assignment rebuilds them from the lengths.
//!
//! # File Format
//!
//! ```text
//! +---------------------+
//! | Magic (4 bytes)     |  0x48 0x55 0x46 0x31 ("HUF1")
//! +---------------------+
//! | original_size (4)   |  u32 little-endian, decoded byte count
//! +---------------------+
//! | length_limit (1)    |  u8, configured max code length (0 = none)
//! +---------------------+
//! | symbol_count (2)    |  u16 little-endian, N
//! +---------------------+
//! | N x (symbol, length)|  1 byte each, ascending by symbol
//! +---------------------+
//! | bitstream           |  MSB-first codes, zero-padded final byte
//! +---------------------+
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, FormatError, Result};
use crate::frequency::ALPHABET_SIZE;
use crate::lengths::{LengthTable, MAX_CODE_LENGTH};

/// Magic tag: "HUF1"
pub const MAGIC: [u8; 4] = *b"HUF1";

/// Size of the fixed part of the header, before the symbol table.
pub const FIXED_HEADER_SIZE: usize = 11;

/// Parsed container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Number of bytes the bitstream decodes to
    pub original_size: u32,

    /// Length limit the file was compressed with (informational)
    pub length_limit: u8,

    /// Code length per symbol
    pub lengths: LengthTable,
}

impl Header {
    pub fn new(original_size: u32, length_limit: u8, lengths: LengthTable) -> Self {
        Self {
            original_size,
            length_limit,
            lengths,
        }
    }

    /// Serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_SIZE + 2 * self.lengths.symbol_count()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let symbol_count = self.lengths.symbol_count() as u16;

        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.original_size.to_le_bytes());
        out.push(self.length_limit);
        out.extend_from_slice(&symbol_count.to_le_bytes());
        for (symbol, length) in self.lengths.present() {
            out.push(symbol);
            out.push(length);
        }
        out
    }

    /// Write the header, returning the number of bytes written.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<usize> {
        let bytes = self.to_bytes();
        sink.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Read and validate a header, leaving `source` at the first bitstream
    /// byte.
    ///
    /// # Errors
    /// - `FormatError::InvalidMagic` if the magic tag doesn't match
    /// - `FormatError::Truncated` if any field is cut short
    /// - `FormatError::TooManySymbols`, `InvalidCodeLength`,
    ///   `DuplicateSymbol`, `OversubscribedLengths` for an impossible table
    /// - `FormatError::MissingSymbols` for a non-empty size with no symbols
    pub fn read_from<R: Read>(source: &mut R) -> Result<Self> {
        let magic: [u8; 4] = read_array(source, "magic tag")?;
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let original_size = u32::from_le_bytes(read_array(source, "original size")?);
        let [length_limit] = read_array::<_, 1>(source, "length limit")?;
        let symbol_count = u16::from_le_bytes(read_array(source, "symbol count")?);

        if symbol_count as usize > ALPHABET_SIZE {
            return Err(FormatError::TooManySymbols(symbol_count).into());
        }

        let mut lengths = [0u8; ALPHABET_SIZE];
        for _ in 0..symbol_count {
            let [symbol, length] = read_array::<_, 2>(source, "symbol table")?;
            if length == 0 || length > MAX_CODE_LENGTH {
                return Err(FormatError::InvalidCodeLength { symbol, length }.into());
            }
            if lengths[symbol as usize] != 0 {
                return Err(FormatError::DuplicateSymbol(symbol).into());
            }
            lengths[symbol as usize] = length;
        }

        if symbol_count == 0 && original_size > 0 {
            return Err(FormatError::MissingSymbols { original_size }.into());
        }

        Ok(Self {
            original_size,
            length_limit,
            lengths: LengthTable::from_lengths(lengths)?,
        })
    }
}

fn read_array<R: Read, const N: usize>(source: &mut R, field: &'static str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    source.read_exact(&mut buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => FormatError::Truncated { field }.into(),
        _ => Error::Io(e),
    })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lengths() -> LengthTable {
        let mut raw = [0u8; ALPHABET_SIZE];
        raw[b'a' as usize] = 1;
        raw[b'b' as usize] = 2;
        raw[b'c' as usize] = 2;
        LengthTable::from_lengths(raw).unwrap()
    }

    #[test]
    fn test_byte_layout() {
        let header = Header::new(0x0102_0304, 7, sample_lengths());
        let bytes = header.to_bytes();
        assert_eq!(
            bytes,
            vec![
                b'H', b'U', b'F', b'1', // magic
                0x04, 0x03, 0x02, 0x01, // original size
                7,    // limit
                3, 0, // symbol count
                b'a', 1, b'b', 2, b'c', 2,
            ]
        );
        assert_eq!(header.encoded_len(), bytes.len());
    }

    #[test]
    fn test_parse_leaves_bitstream() {
        let header = Header::new(12, 0, sample_lengths());
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(&[0xAB, 0xCD]);

        let mut source = &bytes[..];
        let parsed = Header::read_from(&mut source).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(source, &[0xAB, 0xCD]);
    }

    #[test]
    fn test_empty_header() {
        let header = Header::new(0, 0, LengthTable::empty());
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), FIXED_HEADER_SIZE);

        let parsed = Header::read_from(&mut &bytes[..]).unwrap();
        assert_eq!(parsed.original_size, 0);
        assert!(parsed.lengths.is_empty());
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = Header::new(1, 0, sample_lengths()).to_bytes();
        bytes[0] = b'X';
        let result = Header::read_from(&mut &bytes[..]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::InvalidMagic { .. }))
        ));
    }

    #[test]
    fn test_truncated_at_every_offset() {
        let bytes = Header::new(5, 0, sample_lengths()).to_bytes();
        for cut in 0..bytes.len() {
            let result = Header::read_from(&mut &bytes[..cut]);
            assert!(
                matches!(result, Err(Error::Format(FormatError::Truncated { .. }))),
                "cut at {} gave {:?}",
                cut,
                result
            );
        }
    }

    #[test]
    fn test_duplicate_symbol() {
        let mut bytes = Header::new(3, 0, sample_lengths()).to_bytes();
        // turn 'c' into a second 'b'
        let last = bytes.len() - 2;
        bytes[last] = b'b';
        let result = Header::read_from(&mut &bytes[..]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::DuplicateSymbol(b'b')))
        ));
    }

    #[test]
    fn test_zero_length_entry() {
        let mut bytes = Header::new(3, 0, sample_lengths()).to_bytes();
        let last = bytes.len() - 1;
        bytes[last] = 0;
        let result = Header::read_from(&mut &bytes[..]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::InvalidCodeLength { length: 0, .. }))
        ));
    }

    #[test]
    fn test_oversubscribed_table() {
        let mut bytes = Header::new(3, 0, sample_lengths()).to_bytes();
        // 'b' from 2 bits to 1 bit: 1/2 + 1/2 + 1/4 > 1
        let b_len = FIXED_HEADER_SIZE + 3;
        bytes[b_len] = 1;
        let result = Header::read_from(&mut &bytes[..]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::OversubscribedLengths))
        ));
    }

    #[test]
    fn test_too_many_symbols() {
        let mut bytes = Header::new(0, 0, LengthTable::empty()).to_bytes();
        bytes[9..11].copy_from_slice(&257u16.to_le_bytes());
        let result = Header::read_from(&mut &bytes[..]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::TooManySymbols(257)))
        ));
    }

    #[test]
    fn test_size_without_symbols() {
        let header = Header::new(10, 0, LengthTable::empty());
        let result = Header::read_from(&mut &header.to_bytes()[..]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::MissingSymbols { original_size: 10 }))
        ));
    }
}
