//! Adaptive probability models and bit-tree decoders.

use std::io::Read;

use super::range_coder::{RangeDecoder, NUM_BIT_MODEL_TOTAL_BITS};
use super::Result;

const BIT_MODEL_TOTAL: u16 = 1 << NUM_BIT_MODEL_TOTAL_BITS;

/// Adaptation speed.
const NUM_MOVE_BITS: u32 = 5;

/// A single adaptive probability that the next bit is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitModel(u16);

impl BitModel {
    /// Fresh model: both outcomes equally likely.
    pub const fn new() -> Self {
        Self(BIT_MODEL_TOTAL >> 1)
    }

    /// Current probability, in `[0, 2048)`.
    pub const fn probability(self) -> u16 {
        self.0
    }

    /// Decode one bit and adapt toward the observed outcome.
    #[inline]
    pub fn decode<R: Read>(&mut self, rc: &mut RangeDecoder<R>) -> Result<u32> {
        let bit = rc.decode_bit(self.0)?;
        if bit == 0 {
            self.0 += (BIT_MODEL_TOTAL - self.0) >> NUM_MOVE_BITS;
        } else {
            self.0 -= self.0 >> NUM_MOVE_BITS;
        }
        Ok(bit)
    }
}

impl Default for BitModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Binary trie of `N` models decoding a symbol of `log2(N)` bits.
///
/// Index 0 is never used; node `m` has children `2m` and `2m + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitTree<const N: usize> {
    models: [BitModel; N],
}

impl<const N: usize> BitTree<N> {
    const NUM_BITS: u32 = N.trailing_zeros();

    pub const fn new() -> Self {
        Self {
            models: [BitModel::new(); N],
        }
    }

    /// Decode a symbol most significant bit first.
    #[inline]
    pub fn decode<R: Read>(&mut self, rc: &mut RangeDecoder<R>) -> Result<u32> {
        let mut m = 1usize;
        for _ in 0..Self::NUM_BITS {
            m = (m << 1) | self.models[m].decode(rc)? as usize;
        }
        Ok((m - N) as u32)
    }

    /// Decode a symbol least significant bit first.
    #[inline]
    pub fn reverse_decode<R: Read>(&mut self, rc: &mut RangeDecoder<R>) -> Result<u32> {
        reverse_decode(&mut self.models, 0, rc, Self::NUM_BITS)
    }
}

impl<const N: usize> Default for BitTree<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Least-significant-bit-first decode over a shared model array.
///
/// The tree for this symbol lives at `models[offset + 1..]`, which lets
/// several short trees share one array.
#[inline]
pub fn reverse_decode<R: Read>(
    models: &mut [BitModel],
    offset: usize,
    rc: &mut RangeDecoder<R>,
    num_bits: u32,
) -> Result<u32> {
    let mut m = 1usize;
    let mut symbol = 0u32;
    for i in 0..num_bits {
        let bit = models[offset + m].decode(rc)?;
        m = (m << 1) | bit as usize;
        symbol |= bit << i;
    }
    Ok(symbol)
}
