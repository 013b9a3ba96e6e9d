//! Match length decoder.
//!
//! Lengths are coded as a choice prefix selecting one of three bit trees:
//!
//! | Prefix | Tree | Offset range |
//! |--------|------|--------------|
//! | `0` | low (3 bits, per position state) | 0-7 |
//! | `10` | mid (3 bits, per position state) | 8-15 |
//! | `11` | high (8 bits, shared) | 16-271 |

use std::io::Read;

use super::bit_model::{BitModel, BitTree};
use super::range_coder::RangeDecoder;
use super::Result;

/// Shortest match the format can express.
pub const MATCH_MIN_LEN: u32 = 2;

const NUM_LOW_SYMBOLS: u32 = 8;
const NUM_MID_SYMBOLS: u32 = 8;

/// Length decoder; one instance for matches and one for rep matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LenDecoder {
    choice: BitModel,
    choice2: BitModel,
    low: Vec<BitTree<8>>,
    mid: Vec<BitTree<8>>,
    high: BitTree<256>,
}

impl LenDecoder {
    pub fn new(num_pos_states: usize) -> Self {
        Self {
            choice: BitModel::new(),
            choice2: BitModel::new(),
            low: vec![BitTree::new(); num_pos_states],
            mid: vec![BitTree::new(); num_pos_states],
            high: BitTree::new(),
        }
    }

    /// Decode a length offset in `0..272`; add [`MATCH_MIN_LEN`] for the match length.
    #[inline]
    pub fn decode<R: Read>(&mut self, rc: &mut RangeDecoder<R>, pos_state: usize) -> Result<u32> {
        if self.choice.decode(rc)? == 0 {
            return self.low[pos_state].decode(rc);
        }
        if self.choice2.decode(rc)? == 0 {
            return Ok(NUM_LOW_SYMBOLS + self.mid[pos_state].decode(rc)?);
        }
        Ok(NUM_LOW_SYMBOLS + NUM_MID_SYMBOLS + self.high.decode(rc)?)
    }
}
