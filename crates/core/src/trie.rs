//! Bit-at-a-time decode trie.
//!
//! Built fresh for every decompression from the canonical codebook. Each
//! code is a root-to-leaf path, MSB first, matching the order `BitWriter`
//! emits bits.

use std::io::{Read, Write};

use crate::bitio::BitReader;
use crate::codebook::Codebook;
use crate::error::{BitstreamError, HuffmanError, Result};

const ROOT: usize = 0;
const OUTPUT_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: [Option<u32>; 2],
    symbol: Option<u8>,
}

/// Binary trie mapping code paths to symbols.
#[derive(Debug, Clone)]
pub struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

impl DecodeTrie {
    /// Insert every code of `codebook`.
    ///
    /// # Errors
    /// `HuffmanError::ConflictingCode` if one code is a prefix of another.
    pub fn from_codebook(codebook: &Codebook) -> Result<Self> {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
        };
        for (symbol, code) in codebook.entries() {
            let mut node = ROOT;
            for i in 0..code.length {
                if trie.nodes[node].symbol.is_some() {
                    return Err(HuffmanError::ConflictingCode { symbol }.into());
                }
                let bit = code.bit(i) as usize;
                node = match trie.nodes[node].children[bit] {
                    Some(child) => child as usize,
                    None => {
                        let child = trie.nodes.len();
                        trie.nodes.push(TrieNode::default());
                        trie.nodes[node].children[bit] = Some(child as u32);
                        child
                    }
                };
            }

            let leaf = &mut trie.nodes[node];
            if leaf.symbol.is_some() || leaf.children.iter().any(Option::is_some) {
                return Err(HuffmanError::ConflictingCode { symbol }.into());
            }
            leaf.symbol = Some(symbol);
        }
        Ok(trie)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.iter().all(Option::is_none)
    }

    /// Decode exactly one symbol.
    ///
    /// Returns `Ok(None)` if the reader is exhausted at a symbol boundary;
    /// running dry in the middle of a code is reported the same way, since
    /// both mean the stream ended before the expected symbol count.
    ///
    /// # Errors
    /// `BitstreamError::InvalidCode` when the bit read has no matching child.
    pub fn decode_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> Result<Option<u8>> {
        let mut node = ROOT;
        loop {
            let Some(bit) = reader.read_bit()? else {
                return Ok(None);
            };
            let child = self.nodes[node].children[bit as usize].ok_or(
                BitstreamError::InvalidCode {
                    bit_position: reader.position() - 1,
                },
            )?;
            node = child as usize;
            if let Some(symbol) = self.nodes[node].symbol {
                return Ok(Some(symbol));
            }
        }
    }

    /// Decode `count` symbols into `sink`.
    ///
    /// # Errors
    /// - `BitstreamError::Truncated` if the reader runs out first
    /// - `BitstreamError::InvalidCode` on a bit sequence with no code
    pub fn decode<R: Read, W: Write>(
        &self,
        reader: &mut BitReader<R>,
        sink: &mut W,
        count: u64,
    ) -> Result<()> {
        let mut out = Vec::with_capacity(OUTPUT_CHUNK.min(count as usize));
        for decoded in 0..count {
            match self.decode_symbol(reader)? {
                Some(symbol) => out.push(symbol),
                None => {
                    return Err(BitstreamError::Truncated {
                        decoded,
                        expected: count,
                    }
                    .into())
                }
            }
            if out.len() == OUTPUT_CHUNK {
                sink.write_all(&out)?;
                out.clear();
            }
        }
        sink.write_all(&out)?;
        Ok(())
    }
}
