//! Huffman coding of the container payload.
//!
//! The tree is serialized depth-first ahead of the coded data: bit `0`
//! followed by both children for an internal node, bit `1` followed by the
//! byte for a leaf. Codes follow the tree, `0` for left and `1` for right.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bitstream::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};

/// Deepest a tree over 256 symbols can be.
const MAX_DEPTH: usize = 255;

/// First ordering key handed to merged nodes; leaves use their byte value.
const MERGED_ORDER_BASE: u32 = 256;

/// A Huffman code tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanTree {
    Leaf(u8),
    Node(Box<HuffmanTree>, Box<HuffmanTree>),
}

impl HuffmanTree {
    /// Builds a tree from the byte frequencies of `data`.
    ///
    /// The two lightest nodes are merged first, ties going to the lower
    /// `(frequency, order)` key, where a leaf's order is its byte value and
    /// a merged node's order is 256 plus its merge index. The result is
    /// stable but not a canonical-length code.
    ///
    /// Input with fewer than two distinct bytes yields a single leaf
    /// (`Leaf(0)` for empty input).
    #[must_use]
    pub fn build(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in data {
            counts[usize::from(byte)] += 1;
        }

        let mut slots: Vec<Option<Self>> = Vec::new();
        let mut heap = BinaryHeap::new();
        for (byte, &count) in (0u8..=255).zip(counts.iter()) {
            if count != 0 {
                heap.push(Reverse((count, u32::from(byte), slots.len())));
                slots.push(Some(Self::Leaf(byte)));
            }
        }

        let mut merged = 0u32;
        loop {
            let Some(Reverse((count, _, slot))) = heap.pop() else {
                return Self::Leaf(0);
            };
            let Some(Reverse((other_count, _, other_slot))) = heap.pop() else {
                return slots[slot].take().unwrap_or(Self::Leaf(0));
            };
            let (Some(left), Some(right)) = (slots[slot].take(), slots[other_slot].take()) else {
                return Self::Leaf(0);
            };
            heap.push(Reverse((
                count + other_count,
                MERGED_ORDER_BASE + merged,
                slots.len(),
            )));
            slots.push(Some(Self::Node(Box::new(left), Box::new(right))));
            merged += 1;
        }
    }

    /// Serializes the tree depth-first.
    pub fn write(&self, writer: &mut BitWriter) {
        match self {
            Self::Leaf(byte) => {
                writer.write_bit(true);
                writer.write_byte(*byte);
            }
            Self::Node(left, right) => {
                writer.write_bit(false);
                left.write(writer);
                right.write(writer);
            }
        }
    }

    /// Deserializes a tree written by [`write`](Self::write).
    pub fn read(reader: &mut BitReader<'_>) -> CodecResult<Self> {
        Self::read_at(reader, 0)
    }

    fn read_at(reader: &mut BitReader<'_>, depth: usize) -> CodecResult<Self> {
        if depth > MAX_DEPTH {
            return Err(CodecError::InvalidTree { depth: MAX_DEPTH });
        }
        if reader.read_bit()? {
            return Ok(Self::Leaf(reader.read_byte()?));
        }
        let left = Self::read_at(reader, depth + 1)?;
        let right = Self::read_at(reader, depth + 1)?;
        Ok(Self::Node(Box::new(left), Box::new(right)))
    }

    /// Code of every byte value, `None` for bytes absent from the tree.
    #[must_use]
    pub fn code_table(&self) -> Vec<Option<Vec<bool>>> {
        let mut table = vec![None; 256];
        let mut path = Vec::new();
        self.collect_codes(&mut path, &mut table);
        table
    }

    fn collect_codes(&self, path: &mut Vec<bool>, table: &mut [Option<Vec<bool>>]) {
        match self {
            Self::Leaf(byte) => table[usize::from(*byte)] = Some(path.clone()),
            Self::Node(left, right) => {
                path.push(false);
                left.collect_codes(path, table);
                path.pop();
                path.push(true);
                right.collect_codes(path, table);
                path.pop();
            }
        }
    }

    /// Writes the code of every byte of `data`.
    ///
    /// A single-leaf tree has empty codes, so nothing is written.
    pub fn encode(&self, data: &[u8], writer: &mut BitWriter) -> CodecResult<()> {
        let table = self.code_table();
        for &byte in data {
            let code = table[usize::from(byte)]
                .as_ref()
                .ok_or(CodecError::UnknownSymbol { byte })?;
            for &bit in code {
                writer.write_bit(bit);
            }
        }
        Ok(())
    }

    /// Decodes exactly `len` bytes.
    ///
    /// A single-leaf tree repeats its byte `len` times without reading.
    pub fn decode(&self, reader: &mut BitReader<'_>, len: usize) -> CodecResult<Vec<u8>> {
        if let Self::Leaf(byte) = self {
            return Ok(vec![*byte; len]);
        }
        let mut out = Vec::with_capacity(len.min(reader.remaining_bits()));
        while out.len() < len {
            let mut node = self;
            loop {
                match node {
                    Self::Leaf(byte) => {
                        out.push(*byte);
                        break;
                    }
                    Self::Node(left, right) => {
                        node = if reader.read_bit()? { right } else { left };
                    }
                }
            }
        }
        Ok(out)
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Node(left, right) => left.leaf_count() + right.leaf_count(),
        }
    }
}
