// Huffman Coder
// Frequency-driven prefix codes over bytes. The tree is built greedily
// from a min-heap of subtree weights; codes read '0' for a left edge and
// '1' for a right edge; encoding packs the bit stream most-significant
// bit first, and decoding walks the tree bit by bit.

use anyhow::{bail, ensure, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// Number of distinct byte symbols.
pub const SYMBOL_COUNT: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
enum HuffmanNode {
    Leaf {
        symbol: u8,
        frequency: u64,
    },
    Internal {
        frequency: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

/// Min-heap entry: ordered by subtree weight, with an insertion counter
/// breaking ties so construction is deterministic.
#[derive(Debug, PartialEq, Eq)]
struct HeapEntry {
    frequency: u64,
    tie: u64,
    node: Box<HuffmanNode>,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lightest subtree first.
        (other.frequency, other.tie).cmp(&(self.frequency, self.tie))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A bit stream produced by `HuffmanCodec::encode`. `bit_len` counts the
/// meaningful bits; the final byte is zero-padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedData {
    pub bytes: Vec<u8>,
    pub bit_len: usize,
}

/// Codec handle: the code tree plus the per-symbol bit strings derived
/// from it.
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    root: HuffmanNode,
    codes: Vec<Option<Vec<bool>>>,
}

/// Count how often each byte value occurs in `data`.
pub fn symbol_frequencies(data: &[u8]) -> [u64; SYMBOL_COUNT] {
    let mut frequencies = [0u64; SYMBOL_COUNT];
    for &byte in data {
        frequencies[byte as usize] += 1;
    }
    frequencies
}

impl HuffmanCodec {
    /// Build a codec from a frequency table. At least one symbol must
    /// have a nonzero frequency.
    pub fn from_frequencies(frequencies: &[u64; SYMBOL_COUNT]) -> Result<Self> {
        // Seed the heap with one leaf per occurring symbol.
        let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::new();
        let mut tie = 0u64;
        for (symbol, &frequency) in frequencies.iter().enumerate() {
            if frequency > 0 {
                heap.push(HeapEntry {
                    frequency,
                    tie,
                    node: Box::new(HuffmanNode::Leaf {
                        symbol: symbol as u8,
                        frequency,
                    }),
                });
                tie += 1;
            }
        }

        // Repeatedly join the two lightest subtrees until one remains.
        let root = loop {
            let Some(first) = heap.pop() else {
                bail!("cannot build a Huffman tree with no symbols");
            };
            let Some(second) = heap.pop() else {
                break *first.node;
            };
            let frequency = first.frequency + second.frequency;
            heap.push(HeapEntry {
                frequency,
                tie,
                node: Box::new(HuffmanNode::Internal {
                    frequency,
                    left: first.node,
                    right: second.node,
                }),
            });
            tie += 1;
        };

        let mut codes = vec![None; SYMBOL_COUNT];
        match &root {
            HuffmanNode::Leaf { symbol, .. } => {
                // Degenerate single-symbol tree: one bit per occurrence.
                codes[*symbol as usize] = Some(vec![false]);
            }
            HuffmanNode::Internal { .. } => {
                derive_codes(&root, &mut Vec::new(), &mut codes);
            }
        }

        debug!(
            symbols = codes.iter().filter(|c| c.is_some()).count(),
            "huffman codec built"
        );
        Ok(Self { root, codes })
    }

    /// Build a codec directly from sample data.
    pub fn from_data(data: &[u8]) -> Result<Self> {
        ensure!(!data.is_empty(), "cannot build a Huffman code for empty input");
        Self::from_frequencies(&symbol_frequencies(data))
    }

    /// The code length in bits for `symbol`, if the symbol is covered.
    pub fn code_len(&self, symbol: u8) -> Option<usize> {
        self.codes[symbol as usize].as_ref().map(|c| c.len())
    }

    /// Encode `data` into a packed bit stream.
    pub fn encode(&self, data: &[u8]) -> Result<EncodedData> {
        let mut bytes = Vec::new();
        let mut bit_len = 0usize;
        let mut current = 0u8;
        let mut filled = 0u8;

        for &symbol in data {
            let code = match &self.codes[symbol as usize] {
                Some(code) => code,
                None => bail!("symbol {symbol:#04x} has no code in this tree"),
            };
            for &bit in code {
                current <<= 1;
                if bit {
                    current |= 1;
                }
                filled += 1;
                bit_len += 1;
                if filled == 8 {
                    bytes.push(current);
                    current = 0;
                    filled = 0;
                }
            }
        }
        if filled > 0 {
            bytes.push(current << (8 - filled));
        }

        debug!(
            input_bytes = data.len(),
            output_bits = bit_len,
            "huffman encode"
        );
        Ok(EncodedData { bytes, bit_len })
    }

    /// Decode a packed bit stream back into bytes.
    pub fn decode(&self, encoded: &EncodedData) -> Result<Vec<u8>> {
        ensure!(
            encoded.bit_len <= encoded.bytes.len() * 8,
            "bit length {} exceeds buffer of {} bytes",
            encoded.bit_len,
            encoded.bytes.len()
        );

        let mut output = Vec::new();
        let mut node = &self.root;
        for bit_index in 0..encoded.bit_len {
            let byte = encoded.bytes[bit_index / 8];
            let bit = (byte >> (7 - (bit_index % 8))) & 1 == 1;

            if let HuffmanNode::Internal { left, right, .. } = node {
                node = if bit { right } else { left };
            }

            match node {
                HuffmanNode::Leaf { symbol, .. } => {
                    output.push(*symbol);
                    node = &self.root;
                }
                HuffmanNode::Internal { .. } => {}
            }
        }

        if !matches!(&self.root, HuffmanNode::Leaf { .. }) {
            ensure!(
                std::ptr::eq(node, &self.root),
                "encoded stream ends mid-code"
            );
        }

        debug!(
            input_bits = encoded.bit_len,
            output_bytes = output.len(),
            "huffman decode"
        );
        Ok(output)
    }
}

fn derive_codes(node: &HuffmanNode, prefix: &mut Vec<bool>, codes: &mut [Option<Vec<bool>>]) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            codes[*symbol as usize] = Some(prefix.clone());
        }
        HuffmanNode::Internal { left, right, .. } => {
            prefix.push(false);
            derive_codes(left, prefix, codes);
            prefix.pop();
            prefix.push(true);
            derive_codes(right, prefix, codes);
            prefix.pop();
        }
    }
}
