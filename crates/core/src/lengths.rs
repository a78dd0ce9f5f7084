//! Per-symbol code lengths.
//!
//! A `LengthTable` is the only state the container persists about the code:
//! canonical assignment rebuilds every bit pattern from it.

use crate::error::{FormatError, Result};
use crate::frequency::ALPHABET_SIZE;

/// Longest code the codec will assign or accept.
pub const MAX_CODE_LENGTH: u8 = 64;

/// Code length in bits for every byte value; 0 marks an absent symbol.
///
/// # Invariants
/// - every length is 0 or in `1..=MAX_CODE_LENGTH`
/// - the present lengths satisfy the Kraft inequality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthTable {
    lengths: [u8; ALPHABET_SIZE],
}

impl LengthTable {
    /// Table with no present symbols (empty input).
    pub fn empty() -> Self {
        Self {
            lengths: [0; ALPHABET_SIZE],
        }
    }

    /// Validate raw lengths and wrap them.
    ///
    /// # Errors
    /// - `FormatError::InvalidCodeLength` for a length above `MAX_CODE_LENGTH`
    /// - `FormatError::OversubscribedLengths` if the Kraft sum exceeds 1
    pub fn from_lengths(lengths: [u8; ALPHABET_SIZE]) -> Result<Self> {
        if let Some((symbol, &length)) = lengths
            .iter()
            .enumerate()
            .find(|&(_, &l)| l > MAX_CODE_LENGTH)
        {
            return Err(FormatError::InvalidCodeLength {
                symbol: symbol as u8,
                length,
            }
            .into());
        }

        let table = Self { lengths };
        if !table.satisfies_kraft() {
            return Err(FormatError::OversubscribedLengths.into());
        }
        Ok(table)
    }

    /// Wrap lengths produced by the codec's own stages, which uphold the
    /// invariants by construction.
    pub(crate) fn from_lengths_unchecked(lengths: [u8; ALPHABET_SIZE]) -> Self {
        let table = Self { lengths };
        debug_assert!(table.satisfies_kraft());
        table
    }

    pub fn get(&self, symbol: u8) -> u8 {
        self.lengths[symbol as usize]
    }

    /// Present symbols in ascending order with their lengths.
    pub fn present(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.lengths
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l > 0)
            .map(|(s, &l)| (s as u8, l))
    }

    pub fn symbol_count(&self) -> usize {
        self.lengths.iter().filter(|&&l| l > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_count() == 0
    }

    /// Longest present length (0 for an empty table).
    pub fn max_length(&self) -> u8 {
        self.lengths.iter().copied().max().unwrap_or(0)
    }

    /// Number of codes of each length, indexed by length (index 0 unused).
    pub fn histogram(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.max_length() as usize + 1];
        for (_, length) in self.present() {
            counts[length as usize] += 1;
        }
        counts
    }

    /// Kraft sum scaled by `2^MAX_CODE_LENGTH`, computed exactly.
    pub fn kraft_units(&self) -> u128 {
        self.present()
            .map(|(_, l)| 1u128 << (MAX_CODE_LENGTH - l.min(MAX_CODE_LENGTH)))
            .sum()
    }

    /// True when `sum(2^-length) <= 1` over present symbols.
    pub fn satisfies_kraft(&self) -> bool {
        self.kraft_units() <= 1u128 << MAX_CODE_LENGTH
    }
}

impl Default for LengthTable {
    fn default() -> Self {
        Self::empty()
    }
}
