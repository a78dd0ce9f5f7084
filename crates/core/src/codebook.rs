//! Canonical Huffman code assignment.
//!
//! Codes are derived from a `LengthTable` alone, Deflate style: shortest
//! codes first, and within one length in ascending symbol order. Each
//! length's first code is `(previous length's last code + 1) << 1`.
//! Because the assignment is deterministic only lengths are ever persisted.

use std::fmt::Write as _;
use std::io::Write;

use crate::bitio::BitWriter;
use crate::error::{HuffmanError, Result};
use crate::frequency::{display_symbol, ALPHABET_SIZE};
use crate::lengths::{LengthTable, MAX_CODE_LENGTH};

/// One codeword: the low `length` bits of `bits`, sent MSB-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Code {
    pub bits: u64,
    pub length: u8,
}

impl Code {
    /// Bit at `index`, counting from the most significant (first sent) bit.
    pub fn bit(&self, index: u8) -> bool {
        (self.bits >> (self.length - 1 - index)) & 1 == 1
    }

    /// True if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.length <= other.length && other.bits >> (other.length - self.length) == self.bits
    }
}

/// Canonical codes for every present symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    lengths: LengthTable,
    codes: [Option<Code>; ALPHABET_SIZE],
}

impl Codebook {
    /// Assign canonical codes to a valid length table.
    pub fn from_lengths(lengths: LengthTable) -> Self {
        let max_len = lengths.max_length() as usize;
        let histogram = lengths.histogram();

        // u128 keeps the running value exact when a 64-bit length class is
        // the last one reached.
        let mut next_code = vec![0u128; max_len + 1];
        let mut code = 0u128;
        for len in 1..=max_len {
            code = (code + histogram[len - 1] as u128) << 1;
            next_code[len] = code;
        }

        let mut codes = [None; ALPHABET_SIZE];
        for (symbol, length) in lengths.present() {
            let slot = &mut next_code[length as usize];
            codes[symbol as usize] = Some(Code {
                bits: *slot as u64,
                length,
            });
            *slot += 1;
        }

        Self { lengths, codes }
    }

    pub fn lengths(&self) -> &LengthTable {
        &self.lengths
    }

    pub fn code(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    /// Present symbols with their codes, ascending by symbol.
    pub fn entries(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.map(|c| (s as u8, c)))
    }

    pub fn symbol_count(&self) -> usize {
        self.lengths.symbol_count()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Append the code for `symbol` to the bitstream.
    ///
    /// # Errors
    /// `HuffmanError::SymbolNotInCodebook` if the symbol has no code.
    pub fn encode_symbol<W: Write>(&self, symbol: u8, writer: &mut BitWriter<W>) -> Result<()> {
        let code = self
            .code(symbol)
            .ok_or(HuffmanError::SymbolNotInCodebook(symbol))?;
        writer.write_bits(code.bits, code.length as usize)
    }

    /// Encode a whole buffer.
    pub fn encode<W: Write>(&self, data: &[u8], writer: &mut BitWriter<W>) -> Result<()> {
        for &byte in data {
            self.encode_symbol(byte, writer)?;
        }
        Ok(())
    }

    /// Exact payload size in bits for the given per-symbol counts.
    pub fn encoded_bits(&self, counts: &[u64; ALPHABET_SIZE]) -> u64 {
        self.entries()
            .map(|(s, code)| counts[s as usize] * code.length as u64)
            .sum()
    }

    /// Human-readable table of every present symbol's code.
    pub fn render_table(&self) -> String {
        let width = (self.lengths.max_length() as usize).max("Code (Binary)".len());
        let rule = "-".repeat(width + 36);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "| {:<6} | {:>3} | {:<width$} | {:>20} |",
            "Sym", "Len", "Code (Binary)", "Code (Dec)"
        );
        let _ = writeln!(out, "{}", rule);
        for (symbol, code) in self.entries() {
            let binary = format!("{:0len$b}", code.bits, len = code.length as usize);
            let _ = writeln!(
                out,
                "| {:<6} | {:>3} | {:<width$} | {:>20} |",
                display_symbol(symbol),
                code.length,
                binary,
                code.bits
            );
        }
        let _ = writeln!(out, "{}", rule);
        out
    }
}

impl Default for Codebook {
    fn default() -> Self {
        Self::from_lengths(LengthTable::empty())
    }
}

// Compile-time guard: codes are stored in a u64.
const _: () = assert!(MAX_CODE_LENGTH as u32 <= u64::BITS);
