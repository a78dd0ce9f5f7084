//! Huffman tree construction and code length extraction.
//!
//! The tree lives in an arena (`Vec<Node>`) addressed by `NodeId`; internal
//! nodes own their children by index, so dropping the tree frees everything
//! at once.
//!
//! # Tie-breaking
//!
//! Nodes are merged lowest weight first. Equal weights are ordered by a sort
//! key: internal nodes use -1, leaves use their symbol value and the padding
//! leaf sorts last. Remaining ties (between internal nodes) fall back to
//! creation order. The resulting tree is fully reproducible for a given
//! frequency table.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Write as _;

use tracing::debug;

use crate::error::{HuffmanError, Result};
use crate::frequency::{display_symbol, FrequencyTable, ALPHABET_SIZE};
use crate::lengths::{LengthTable, MAX_CODE_LENGTH};

/// Index of a node in the tree arena.
pub type NodeId = usize;

const INTERNAL_KEY: i16 = -1;
const PADDING_KEY: i16 = ALPHABET_SIZE as i16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    /// Zero-weight sibling giving a lone symbol a 1-bit code. Never decodable.
    Padding,
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match *self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => weight,
            Node::Padding => 0,
        }
    }

    fn sort_key(&self) -> i16 {
        match *self {
            Node::Leaf { symbol, .. } => symbol as i16,
            Node::Padding => PADDING_KEY,
            Node::Internal { .. } => INTERNAL_KEY,
        }
    }
}

/// A binary Huffman tree built from a frequency table.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// Build the tree, or `None` when no symbol is present.
    pub fn build(freqs: &FrequencyTable) -> Option<Self> {
        let mut nodes: Vec<Node> = freqs
            .present()
            .map(|(symbol, weight)| Node::Leaf { symbol, weight })
            .collect();

        match nodes.len() {
            0 => return None,
            1 => nodes.push(Node::Padding),
            _ => {}
        }

        let mut heap: BinaryHeap<Reverse<(u64, i16, NodeId)>> = nodes
            .iter()
            .enumerate()
            .map(|(id, node)| Reverse((node.weight(), node.sort_key(), id)))
            .collect();

        while heap.len() > 1 {
            let (Some(Reverse((lw, _, left))), Some(Reverse((rw, _, right)))) =
                (heap.pop(), heap.pop())
            else {
                break;
            };

            let parent = Node::Internal {
                weight: lw + rw,
                left,
                right,
            };
            let id = nodes.len();
            heap.push(Reverse((parent.weight(), parent.sort_key(), id)));
            nodes.push(parent);
        }

        let root = heap.pop().map(|Reverse((_, _, id))| id)?;
        debug!(nodes = nodes.len(), "built huffman tree");
        Some(Self { nodes, root })
    }

    /// Total weight at the root (the number of input bytes).
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    /// Unconstrained code lengths: each leaf's depth, root at depth 0.
    ///
    /// Padding leaves are dropped. A real leaf never gets less than 1 bit.
    pub fn code_lengths(&self) -> Result<LengthTable> {
        let mut lengths = [0u8; ALPHABET_SIZE];
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            match self.nodes[id] {
                Node::Leaf { symbol, .. } => {
                    let depth = depth.max(1);
                    if depth > MAX_CODE_LENGTH as usize {
                        return Err(HuffmanError::CodeLengthTooLong {
                            length: depth,
                            max: MAX_CODE_LENGTH as usize,
                        }
                        .into());
                    }
                    lengths[symbol as usize] = depth as u8;
                }
                Node::Padding => {}
                Node::Internal { left, right, .. } => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }

        Ok(LengthTable::from_lengths_unchecked(lengths))
    }

    /// Sideways text rendering: right subtree above, four spaces per level.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, level: usize, out: &mut String) {
        let node = self.nodes[id];
        if let Node::Internal { right, .. } = node {
            self.render_node(right, level + 1, out);
        }

        let indent = "    ".repeat(level);
        let _ = match node {
            Node::Leaf { symbol, weight } => {
                writeln!(out, "{}{} ({})", indent, display_symbol(symbol), weight)
            }
            Node::Padding => writeln!(out, "{}- (0)", indent),
            Node::Internal { weight, .. } => writeln!(out, "{}* ({})", indent, weight),
        };

        if let Node::Internal { left, .. } = node {
            self.render_node(left, level + 1, out);
        }
    }
}
