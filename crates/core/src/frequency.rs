//! Byte frequency counting.
//!
//! The first pass over the input. Every byte is read exactly once and the
//! source is never rewound here; the encoder re-reads the input itself for
//! the second pass.

use std::io::{ErrorKind, Read};

use tracing::trace;

use crate::error::Result;

/// Number of symbols in the byte alphabet.
pub const ALPHABET_SIZE: usize = 256;

const READ_CHUNK: usize = 64 * 1024;

/// Occurrence count per byte value, plus the total number of bytes seen.
///
/// Built once per compression run and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
    total: u64,
}

impl FrequencyTable {
    /// Count every byte of an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; ALPHABET_SIZE];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self {
            counts,
            total: data.len() as u64,
        }
    }

    /// Build a table directly from per-symbol counts.
    pub fn from_counts(counts: [u64; ALPHABET_SIZE]) -> Self {
        let total = counts.iter().sum();
        Self { counts, total }
    }

    /// Consume `source` to the end, counting each byte.
    pub fn count<R: Read>(mut source: R) -> Result<Self> {
        let mut counts = [0u64; ALPHABET_SIZE];
        let mut total = 0u64;
        let mut buf = vec![0u8; READ_CHUNK];

        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in &buf[..n] {
                counts[byte as usize] += 1;
            }
            total += n as u64;
        }

        let table = Self { counts, total };
        table.trace_counts();
        Ok(table)
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn counts(&self) -> &[u64; ALPHABET_SIZE] {
        &self.counts
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Present symbols in ascending order with their counts.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }

    fn trace_counts(&self) {
        for (symbol, count) in self.present() {
            trace!("{}: {}", display_symbol(symbol), count);
        }
    }
}

/// Render a symbol as `'c'` when printable ASCII, `0xNN` otherwise.
pub fn display_symbol(symbol: u8) -> String {
    if (0x20..=0x7e).contains(&symbol) {
        format!("'{}'", symbol as char)
    } else {
        format!("0x{:02X}", symbol)
    }
}
