//! Literal byte decoder.
//!
//! Each context owns `0x300` models: a 256-node byte trie at `0x001..0x100`,
//! plus two "matched" tries at `0x100` and `0x200` used while the decoded
//! bits still agree with the byte at distance `rep0`.

use std::io::Read;

use super::bit_model::BitModel;
use super::range_coder::RangeDecoder;
use super::Result;

const CONTEXT_SIZE: usize = 0x300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralDecoder {
    lc: u32,
    pos_mask: u64,
    models: Vec<BitModel>,
}

impl LiteralDecoder {
    /// Create a decoder with `lc` previous-byte bits and `lp` position bits.
    pub fn new(lc: u32, lp: u32) -> Self {
        let num_contexts = 1usize << (lc + lp);
        Self {
            lc,
            pos_mask: (1u64 << lp) - 1,
            models: vec![BitModel::new(); num_contexts * CONTEXT_SIZE],
        }
    }

    /// Models for the context selected by output position and previous byte.
    #[inline]
    fn context(&mut self, pos: u64, prev_byte: u8) -> &mut [BitModel] {
        // lc may be 0, so shift in u32 to keep an 8-bit shift well defined.
        let index = (((pos & self.pos_mask) as usize) << self.lc)
            + (u32::from(prev_byte) >> (8 - self.lc)) as usize;
        let start = index * CONTEXT_SIZE;
        &mut self.models[start..start + CONTEXT_SIZE]
    }

    /// Decode a literal with the plain byte trie.
    #[inline]
    pub fn decode_normal<R: Read>(
        &mut self,
        rc: &mut RangeDecoder<R>,
        pos: u64,
        prev_byte: u8,
    ) -> Result<u8> {
        let probs = self.context(pos, prev_byte);
        let mut symbol = 1usize;
        while symbol < 0x100 {
            symbol = (symbol << 1) | probs[symbol].decode(rc)? as usize;
        }
        Ok(symbol as u8)
    }

    /// Decode a literal right after a match, guided by the byte at `rep0`.
    ///
    /// While decoded bits agree with `match_byte` the matched tries are used;
    /// after the first disagreement the remaining bits use the plain trie.
    #[inline]
    pub fn decode_with_match_byte<R: Read>(
        &mut self,
        rc: &mut RangeDecoder<R>,
        pos: u64,
        prev_byte: u8,
        match_byte: u8,
    ) -> Result<u8> {
        let probs = self.context(pos, prev_byte);
        let mut match_byte = u32::from(match_byte);
        let mut symbol = 1usize;
        while symbol < 0x100 {
            let match_bit = ((match_byte >> 7) & 1) as usize;
            match_byte <<= 1;
            let bit = probs[((1 + match_bit) << 8) + symbol].decode(rc)? as usize;
            symbol = (symbol << 1) | bit;
            if match_bit != bit {
                while symbol < 0x100 {
                    symbol = (symbol << 1) | probs[symbol].decode(rc)? as usize;
                }
                break;
            }
        }
        Ok(symbol as u8)
    }
}
