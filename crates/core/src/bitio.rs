//! Bit-level I/O over byte sinks and sources.
//!
//! `BitWriter` and `BitReader` pack and unpack Huffman codes MSB-first
//! (most significant bit first), the order the decode trie walks them.
//!
//! # Padding Rules
//! - BitWriter: pads the final partial byte with trailing zeros
//! - BitReader: cannot tell padding from data; the caller stops after the
//!   expected number of symbols
//!
//! # Example
//! ```
//! use hufflimit_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! let bytes = writer.finish().unwrap();
//! assert_eq!(bytes, vec![0b1011_1000]);
//!
//! let mut reader = BitReader::new(&bytes[..]);
//! assert_eq!(reader.read_bit().unwrap(), Some(true));
//! assert_eq!(reader.read_bit().unwrap(), Some(false));
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::error::{HuffmanError, Result};

/// Widest value accepted by a single `write_bits` call.
pub const MAX_BITS_PER_WRITE: usize = 64;

/// Writes bits MSB-first into a byte sink.
///
/// Completed bytes are flushed to the sink as soon as they fill up.
///
/// # Invariants
/// - `bit_count` is always < 8 between calls
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    sink: W,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
    /// Complete bytes flushed so far
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            bit_buffer: 0,
            bit_count: 0,
            bytes_written: 0,
        }
    }

    /// Write the lowest `count` bits of `value`, most significant first.
    ///
    /// # Errors
    /// - `HuffmanError::CodeLengthTooLong` if count > 64
    /// - `Error::Io` if the sink rejects a flushed byte
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > MAX_BITS_PER_WRITE {
            return Err(HuffmanError::CodeLengthTooLong {
                length: count,
                max: MAX_BITS_PER_WRITE,
            }
            .into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let free = 8 - self.bit_count as usize;
            let take = remaining.min(free);
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u64 << take) - 1)) as u8;

            self.bit_buffer |= bits << (free - take);
            self.bit_count += take as u8;
            remaining -= take;

            if self.bit_count == 8 {
                self.flush_byte()?;
            }
        }

        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Pad the last partial byte with zeros, flush it and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.bit_count > 0 {
            self.flush_byte()?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }

    /// Total number of bits written (including the partial byte).
    pub fn bit_len(&self) -> u64 {
        self.bytes_written * 8 + self.bit_count as u64
    }

    fn flush_byte(&mut self) -> Result<()> {
        self.sink.write_all(&[self.bit_buffer])?;
        self.bytes_written += 1;
        self.bit_buffer = 0;
        self.bit_count = 0;
        Ok(())
    }
}

/// Reads bits MSB-first from a byte source, one byte fetched at a time.
///
/// Exhaustion of the source is reported as `Ok(None)` rather than an
/// error; the caller decides whether running dry means truncation.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    source: R,
    current: u8,
    /// Unread bits left in `current` (0-8)
    bits_left: u8,
    /// Bits consumed so far (0 = MSB of first byte)
    bit_position: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            current: 0,
            bits_left: 0,
            bit_position: 0,
        }
    }

    /// Read one bit, or `None` once the source has no more bytes.
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.bits_left == 0 {
            match self.fetch_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.bits_left = 8;
                }
                None => return Ok(None),
            }
        }

        self.bits_left -= 1;
        self.bit_position += 1;
        Ok(Some((self.current >> self.bits_left) & 1 == 1))
    }

    /// Current bit position.
    pub fn position(&self) -> u64 {
        self.bit_position
    }

    fn fetch_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
