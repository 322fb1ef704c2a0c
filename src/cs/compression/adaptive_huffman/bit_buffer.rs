//! Bit accumulation buffer between the tree and the byte-oriented sink.
//!
//! Bits are packed most-significant-bit first: the first bit pushed lands in bit 7
//! of the first byte. Completed bytes can be drained while the trailing partial
//! byte stays buffered.

use bitvec::prelude::*;

/// Growable, MSB-first bit buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BitBuffer {
    bits: BitVec<u8, Msb0>,
}

impl BitBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            bits: BitVec::new(),
        }
    }

    /// Appends a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Appends the 8 bits of `byte`, most significant first.
    pub fn push_byte(&mut self, byte: u8) {
        self.bits.extend_from_bitslice(byte.view_bits::<Msb0>());
    }

    /// Appends every bit of `bits` in order.
    pub fn extend_from_bits(&mut self, bits: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(bits);
    }

    /// Appends another buffer's bits.
    pub fn extend(&mut self, other: &BitBuffer) {
        self.extend_from_bits(&other.bits);
    }

    /// Length in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of bits past the last complete byte.
    pub fn residual_bits(&self) -> usize {
        self.bits.len() % 8
    }

    /// Removes and returns every complete byte, keeping the residual bits.
    pub fn drain_full_bytes(&mut self) -> Vec<u8> {
        let full = self.bits.len() / 8;
        if full == 0 {
            return Vec::new();
        }
        let residual = self.bits.split_off(full * 8);
        let drained = std::mem::replace(&mut self.bits, residual);
        drained.into_vec()
    }

    /// Drops all buffered bits.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Read-only view of the buffered bits.
    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }
}
