//! Range encoder for crafting exact LZMA streams in tests.
//!
//! [`StreamBuilder`] emits symbols chosen by the test (literals, matches,
//! reps, end markers, and deliberately invalid distances) with the same
//! context selection the decoder uses, tracking its own probabilities.

use std::collections::HashMap;

use super::state::State;
use crate::parsing::{LzmaProperties, UNKNOWN_SIZE};

const TOP: u32 = 1 << 24;

pub struct RangeEncoder {
    low: u64,
    range: u32,
    cache: u8,
    cache_size: u64,
    out: Vec<u8>,
}

impl RangeEncoder {
    pub fn new() -> Self {
        Self {
            low: 0,
            range: 0xFFFF_FFFF,
            cache: 0,
            cache_size: 1,
            out: Vec::new(),
        }
    }

    fn shift_low(&mut self) {
        if (self.low as u32) < 0xFF00_0000 || (self.low >> 32) != 0 {
            let carry = (self.low >> 32) as u8;
            let mut temp = self.cache;
            loop {
                self.out.push(temp.wrapping_add(carry));
                temp = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }
            self.cache = (self.low >> 24) as u8;
        }
        self.cache_size += 1;
        self.low = (self.low & 0x00FF_FFFF) << 8;
    }

    fn normalize(&mut self) {
        while self.range < TOP {
            self.range <<= 8;
            self.shift_low();
        }
    }

    pub fn encode_bit(&mut self, prob: &mut u16, bit: u32) {
        let bound = (self.range >> 11) * u32::from(*prob);
        if bit == 0 {
            self.range = bound;
            *prob += (2048 - *prob) >> 5;
        } else {
            self.low += u64::from(bound);
            self.range -= bound;
            *prob -= *prob >> 5;
        }
        self.normalize();
    }

    pub fn encode_direct_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.range >>= 1;
            if (value >> i) & 1 == 1 {
                self.low += u64::from(self.range);
            }
            self.normalize();
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        for _ in 0..5 {
            self.shift_low();
        }
        self.out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Ctx {
    IsMatch,
    IsRep,
    IsRepG0,
    IsRepG1,
    IsRepG2,
    IsRep0Long,
    Literal,
    PosSlot,
    PosSpecial,
    Align,
    LenChoice(bool),
    LenChoice2(bool),
    LenLow(bool),
    LenMid(bool),
    LenHigh(bool),
}

/// Symbol-level stream builder.
///
/// Distances are in the format's convention: 0 repeats the previous byte.
pub struct StreamBuilder {
    rc: RangeEncoder,
    probs: HashMap<(Ctx, usize), u16>,
    props: LzmaProperties,
    dict_size: u32,
    state: State,
    reps: [u32; 4],
    output: Vec<u8>,
}

impl StreamBuilder {
    pub fn new(props: LzmaProperties, dict_size: u32) -> Self {
        Self {
            rc: RangeEncoder::new(),
            probs: HashMap::new(),
            props,
            dict_size,
            state: State::new(),
            reps: [0; 4],
            output: Vec::new(),
        }
    }

    /// Bytes a correct decoder produces for the symbols so far.
    pub fn expected(&self) -> &[u8] {
        &self.output
    }

    /// Header plus range coder output. `None` writes the unknown-size sentinel.
    pub fn finish(self, size: Option<u64>) -> Vec<u8> {
        let mut stream = vec![self.props.to_byte()];
        stream.extend_from_slice(&self.dict_size.to_le_bytes());
        stream.extend_from_slice(&size.unwrap_or(UNKNOWN_SIZE).to_le_bytes());
        stream.extend_from_slice(&self.rc.finish());
        stream
    }

    fn bit(&mut self, ctx: Ctx, index: usize, bit: u32) {
        let prob = self.probs.entry((ctx, index)).or_insert(1024);
        self.rc.encode_bit(prob, bit);
    }

    fn tree(&mut self, ctx: Ctx, base: usize, num_bits: u32, value: u32) {
        let mut m = 1usize;
        for i in (0..num_bits).rev() {
            let bit = (value >> i) & 1;
            self.bit(ctx, base + m, bit);
            m = (m << 1) | bit as usize;
        }
    }

    fn reverse_tree(&mut self, ctx: Ctx, base: usize, num_bits: u32, value: u32) {
        let mut m = 1usize;
        for i in 0..num_bits {
            let bit = (value >> i) & 1;
            self.bit(ctx, base + m, bit);
            m = (m << 1) | bit as usize;
        }
    }

    fn pos_state(&self) -> usize {
        self.output.len() & ((1 << self.props.pb) - 1)
    }

    fn state_pos_index(&self) -> usize {
        (self.state.index() << 4) + self.pos_state()
    }

    pub fn literal(&mut self, byte: u8) -> &mut Self {
        let index = self.state_pos_index();
        self.bit(Ctx::IsMatch, index, 0);

        let pos = self.output.len();
        let prev = u32::from(self.output.last().copied().unwrap_or(0));
        let lc = self.props.lc;
        let context = ((pos & ((1 << self.props.lp) - 1)) << lc) + (prev >> (8 - lc)) as usize;
        let base = context * 0x300;
        let byte32 = u32::from(byte);

        if self.state.is_char_state() {
            self.tree(Ctx::Literal, base, 8, byte32);
        } else {
            let match_byte = u32::from(self.output[pos - self.reps[0] as usize - 1]);
            let mut m = 1usize;
            let mut diverged = false;
            for i in (0..8).rev() {
                let bit = (byte32 >> i) & 1;
                if diverged {
                    self.bit(Ctx::Literal, base + m, bit);
                } else {
                    let match_bit = (match_byte >> i) & 1;
                    self.bit(Ctx::Literal, base + (((1 + match_bit) as usize) << 8) + m, bit);
                    diverged = match_bit != bit;
                }
                m = (m << 1) | bit as usize;
            }
        }

        self.output.push(byte);
        self.state.update_char();
        self
    }

    fn length(&mut self, rep: bool, len: u32) {
        let value = len - 2;
        let base = self.pos_state() * 8;
        if value < 8 {
            self.bit(Ctx::LenChoice(rep), 0, 0);
            self.tree(Ctx::LenLow(rep), base, 3, value);
        } else if value < 16 {
            self.bit(Ctx::LenChoice(rep), 0, 1);
            self.bit(Ctx::LenChoice2(rep), 0, 0);
            self.tree(Ctx::LenMid(rep), base, 3, value - 8);
        } else {
            self.bit(Ctx::LenChoice(rep), 0, 1);
            self.bit(Ctx::LenChoice2(rep), 0, 1);
            self.tree(Ctx::LenHigh(rep), 0, 8, value - 16);
        }
    }

    fn pos_slot(distance: u32) -> u32 {
        if distance < 4 {
            return distance;
        }
        let n = 31 - distance.leading_zeros();
        (n << 1) | ((distance >> (n - 1)) & 1)
    }

    fn distance(&mut self, distance: u32, len: u32) {
        let len_state = ((len - 2) as usize).min(3);
        let slot = Self::pos_slot(distance);
        self.tree(Ctx::PosSlot, len_state * 64, 6, slot);
        if slot < 4 {
            return;
        }
        let num_direct_bits = (slot >> 1) - 1;
        let base = (2 | (slot & 1)) << num_direct_bits;
        let extra = distance - base;
        if slot < 14 {
            self.reverse_tree(Ctx::PosSpecial, (base - slot) as usize, num_direct_bits, extra);
        } else {
            self.rc.encode_direct_bits(extra >> 4, num_direct_bits - 4);
            self.reverse_tree(Ctx::Align, 0, 4, extra & 0xF);
        }
    }

    /// Copy `len` bytes from `distance` into the expected output, if valid.
    fn copy(&mut self, distance: u32, len: u32) {
        let distance = distance as usize;
        if distance >= self.output.len() {
            return;
        }
        for _ in 0..len {
            let byte = self.output[self.output.len() - distance - 1];
            self.output.push(byte);
        }
    }

    /// Match with a new distance. An out-of-range distance is encoded as-is.
    pub fn match_(&mut self, distance: u32, len: u32) -> &mut Self {
        let index = self.state_pos_index();
        let state = self.state.index();
        self.bit(Ctx::IsMatch, index, 1);
        self.bit(Ctx::IsRep, state, 0);
        self.length(false, len);
        self.distance(distance, len);
        self.reps = [distance, self.reps[0], self.reps[1], self.reps[2]];
        self.state.update_match();
        self.copy(distance, len);
        self
    }

    /// Rep match at `reps[index]`.
    pub fn rep(&mut self, index: usize, len: u32) -> &mut Self {
        let pos_index = self.state_pos_index();
        let state = self.state.index();
        self.bit(Ctx::IsMatch, pos_index, 1);
        self.bit(Ctx::IsRep, state, 1);
        if index == 0 {
            self.bit(Ctx::IsRepG0, state, 0);
            self.bit(Ctx::IsRep0Long, pos_index, 1);
        } else {
            self.bit(Ctx::IsRepG0, state, 1);
            if index == 1 {
                self.bit(Ctx::IsRepG1, state, 0);
            } else {
                self.bit(Ctx::IsRepG1, state, 1);
                self.bit(Ctx::IsRepG2, state, u32::from(index == 3));
            }
        }
        let distance = self.reps[index];
        self.reps.copy_within(0..index, 1);
        self.reps[0] = distance;
        self.length(true, len);
        self.state.update_rep();
        self.copy(distance, len);
        self
    }

    /// One byte at `rep0`.
    pub fn short_rep(&mut self) -> &mut Self {
        let pos_index = self.state_pos_index();
        let state = self.state.index();
        self.bit(Ctx::IsMatch, pos_index, 1);
        self.bit(Ctx::IsRep, state, 1);
        self.bit(Ctx::IsRepG0, state, 0);
        self.bit(Ctx::IsRep0Long, pos_index, 0);
        self.state.update_short_rep();
        self.copy(self.reps[0], 1);
        self
    }

    pub fn end_marker(&mut self) -> &mut Self {
        let index = self.state_pos_index();
        let state = self.state.index();
        self.bit(Ctx::IsMatch, index, 1);
        self.bit(Ctx::IsRep, state, 0);
        self.length(false, 2);
        self.distance(0xFFFF_FFFF, 2);
        self.state.update_match();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_slot() {
        assert_eq!(StreamBuilder::pos_slot(0), 0);
        assert_eq!(StreamBuilder::pos_slot(3), 3);
        assert_eq!(StreamBuilder::pos_slot(4), 4);
        assert_eq!(StreamBuilder::pos_slot(6), 5);
        assert_eq!(StreamBuilder::pos_slot(8), 6);
        assert_eq!(StreamBuilder::pos_slot(127), 13);
        assert_eq!(StreamBuilder::pos_slot(128), 14);
        assert_eq!(StreamBuilder::pos_slot(0xFFFF_FFFF), 63);
    }

    #[test]
    fn test_empty_encoder_preamble() {
        assert_eq!(RangeEncoder::new().finish(), vec![0, 0, 0, 0, 0]);
    }
}
