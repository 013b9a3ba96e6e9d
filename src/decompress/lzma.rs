//! LZMA decoding engine.
//!
//! Every output position starts with a short prefix of binary decisions
//! that selects the kind of the next symbol:
//!
//! | Prefix | Symbol |
//! |--------|--------|
//! | `0` | literal |
//! | `1 0` | match with a new distance |
//! | `1 1 0 0` | short rep: one byte at `rep0` |
//! | `1 1 0 1` | rep match at `rep0` |
//! | `1 1 1 0` | rep match at `rep1` |
//! | `1 1 1 1 0` | rep match at `rep2` |
//! | `1 1 1 1 1` | rep match at `rep3` |
//!
//! A match whose decoded distance is `0xFFFF_FFFF` is the end marker.

use std::io::Read;

use tracing::{debug, warn};

use super::bit_model::{reverse_decode, BitModel, BitTree};
use super::length::{LenDecoder, MATCH_MIN_LEN};
use super::literal::LiteralDecoder;
use super::range_coder::RangeDecoder;
use super::state::{State, NUM_STATES};
use super::window::OutWindow;
use super::{DecompressError, Result};
use crate::parsing::{LzmaHeader, LzmaHeaderParser};

const NUM_POS_BITS_MAX: usize = 4;

const NUM_LEN_TO_POS_STATES: usize = 4;

const NUM_ALIGN_BITS: u32 = 4;

const START_POS_MODEL_INDEX: u32 = 4;
const END_POS_MODEL_INDEX: u32 = 14;

const NUM_FULL_DISTANCES: usize = 1 << (END_POS_MODEL_INDEX / 2);

/// Distance value that marks the end of the stream.
const END_MARKER: u32 = 0xFFFF_FFFF;

/// Decoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    dict_size_limit: Option<u32>,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject streams whose header asks for a larger dictionary.
    pub fn dict_size_limit(mut self, limit: u32) -> Self {
        self.dict_size_limit = Some(limit);
        self
    }
}

/// One binary decision of the symbol prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    IsMatch,
    IsRep,
    IsRepG0,
    IsRep0Long,
    IsRepG1,
    IsRepG2,
}

/// Kind of the next symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Literal,
    /// Match with a freshly coded distance.
    Match,
    /// One byte at `rep0`, no length.
    ShortRep,
    /// Match reusing the rep distance at this index (0-3).
    Rep(usize),
}

impl SymbolKind {
    /// Walk the prefix grammar, asking `decide` for each decision in turn.
    pub fn classify<F>(mut decide: F) -> Result<Self>
    where
        F: FnMut(Decision) -> Result<u32>,
    {
        if decide(Decision::IsMatch)? == 0 {
            return Ok(Self::Literal);
        }
        if decide(Decision::IsRep)? == 0 {
            return Ok(Self::Match);
        }
        if decide(Decision::IsRepG0)? == 0 {
            return Ok(if decide(Decision::IsRep0Long)? == 0 {
                Self::ShortRep
            } else {
                Self::Rep(0)
            });
        }
        if decide(Decision::IsRepG1)? == 0 {
            return Ok(Self::Rep(1));
        }
        Ok(if decide(Decision::IsRepG2)? == 0 {
            Self::Rep(2)
        } else {
            Self::Rep(3)
        })
    }
}

/// All adaptive state of one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Models {
    is_match: [BitModel; NUM_STATES << NUM_POS_BITS_MAX],
    is_rep: [BitModel; NUM_STATES],
    is_rep_g0: [BitModel; NUM_STATES],
    is_rep_g1: [BitModel; NUM_STATES],
    is_rep_g2: [BitModel; NUM_STATES],
    is_rep0_long: [BitModel; NUM_STATES << NUM_POS_BITS_MAX],
    pos_slot: [BitTree<64>; NUM_LEN_TO_POS_STATES],
    /// Reverse trees for slots 4-13, addressed at `base - slot + m`; index 0 is unused.
    pos_special: [BitModel; 1 + NUM_FULL_DISTANCES - END_POS_MODEL_INDEX as usize],
    align: BitTree<16>,
    len: LenDecoder,
    rep_len: LenDecoder,
    literal: LiteralDecoder,
}

impl Models {
    fn new(header: &LzmaHeader) -> Self {
        let props = header.properties;
        Self {
            is_match: [BitModel::new(); NUM_STATES << NUM_POS_BITS_MAX],
            is_rep: [BitModel::new(); NUM_STATES],
            is_rep_g0: [BitModel::new(); NUM_STATES],
            is_rep_g1: [BitModel::new(); NUM_STATES],
            is_rep_g2: [BitModel::new(); NUM_STATES],
            is_rep0_long: [BitModel::new(); NUM_STATES << NUM_POS_BITS_MAX],
            pos_slot: [const { BitTree::new() }; NUM_LEN_TO_POS_STATES],
            pos_special: [BitModel::new(); 1 + NUM_FULL_DISTANCES - END_POS_MODEL_INDEX as usize],
            align: BitTree::new(),
            len: LenDecoder::new(props.num_pos_states()),
            rep_len: LenDecoder::new(props.num_pos_states()),
            literal: LiteralDecoder::new(props.lc, props.lp),
        }
    }

    #[inline]
    fn decide<R: Read>(
        &mut self,
        rc: &mut RangeDecoder<R>,
        decision: Decision,
        state: State,
        pos_state: usize,
    ) -> Result<u32> {
        let s = state.index();
        let model = match decision {
            Decision::IsMatch => &mut self.is_match[(s << NUM_POS_BITS_MAX) + pos_state],
            Decision::IsRep => &mut self.is_rep[s],
            Decision::IsRepG0 => &mut self.is_rep_g0[s],
            Decision::IsRep0Long => &mut self.is_rep0_long[(s << NUM_POS_BITS_MAX) + pos_state],
            Decision::IsRepG1 => &mut self.is_rep_g1[s],
            Decision::IsRepG2 => &mut self.is_rep_g2[s],
        };
        model.decode(rc)
    }

    /// Decode the distance of a new match of length `len`.
    fn decode_distance<R: Read>(&mut self, rc: &mut RangeDecoder<R>, len: u32) -> Result<u32> {
        let len_state = ((len - MATCH_MIN_LEN) as usize).min(NUM_LEN_TO_POS_STATES - 1);
        let slot = self.pos_slot[len_state].decode(rc)?;
        if slot < START_POS_MODEL_INDEX {
            return Ok(slot);
        }

        let num_direct_bits = (slot >> 1) - 1;
        let mut distance = (2 | (slot & 1)) << num_direct_bits;
        if slot < END_POS_MODEL_INDEX {
            let offset = (distance - slot) as usize;
            distance += reverse_decode(&mut self.pos_special, offset, rc, num_direct_bits)?;
        } else {
            distance += rc.decode_direct_bits(num_direct_bits - NUM_ALIGN_BITS)? << NUM_ALIGN_BITS;
            distance += self.align.reverse_decode(rc)?;
        }
        Ok(distance)
    }
}

/// A back-reference copy not yet fully delivered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCopy {
    distance: u32,
    remaining: u32,
}

/// Result of decoding one symbol.
enum Step {
    Byte(u8),
    Copy(PendingCopy),
    End,
}

/// Streaming LZMA decoder.
///
/// Pulls compressed bytes from `R` one at a time, only as far as the
/// requested output needs them.
pub struct LzmaDecoder<R> {
    rc: RangeDecoder<R>,
    models: Models,
    window: OutWindow,
    state: State,
    reps: [u32; 4],
    pending: Option<PendingCopy>,
    header: LzmaHeader,
    pos_mask: u64,
    finished: bool,
    /// Set by the first decode error; every later call reports it again.
    failure: Option<DecompressError>,
}

impl<R: Read> LzmaDecoder<R> {
    /// Read the header and range coder preamble from `inner`.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_options(inner, DecoderOptions::default())
    }

    pub fn with_options(mut inner: R, options: DecoderOptions) -> Result<Self> {
        let header = LzmaHeaderParser::read_from(&mut inner)?;
        if let Some(limit) = options.dict_size_limit {
            if header.dict_size > limit {
                return Err(DecompressError::DictionaryTooLarge {
                    size: header.dict_size,
                    limit,
                });
            }
        }
        let rc = RangeDecoder::new(inner)?;

        // No valid distance reaches past the declared output, so a small
        // stream does not need its full dictionary.
        let dict_size = u64::from(header.dict_size_check());
        let capacity = header
            .uncompressed_size
            .map_or(dict_size, |size| size.min(dict_size)) as usize;
        let window = OutWindow::new(capacity);

        debug!(
            lc = header.properties.lc,
            lp = header.properties.lp,
            pb = header.properties.pb,
            dict_size = header.dict_size,
            uncompressed_size = ?header.uncompressed_size,
            window = window.capacity(),
            "parsed LZMA header"
        );

        Ok(Self {
            rc,
            models: Models::new(&header),
            window,
            state: State::new(),
            reps: [0; 4],
            pending: None,
            pos_mask: (1u64 << header.properties.pb) - 1,
            header,
            finished: false,
            failure: None,
        })
    }

    pub fn header(&self) -> &LzmaHeader {
        &self.header
    }

    /// Total bytes produced so far.
    pub fn bytes_written(&self) -> u64 {
        self.window.total_written()
    }

    /// Whether the stream has ended (declared size reached or end marker seen).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the decoder and return the byte source, positioned after the
    /// last compressed byte read.
    pub fn into_inner(self) -> R {
        self.rc.into_inner()
    }

    /// Decode into `buf`, returning the number of bytes written.
    ///
    /// Returns 0 only once the stream is exhausted (or `buf` is empty).
    /// A copy interrupted by a full buffer resumes on the next call.
    ///
    /// Errors are final. Bytes decoded before an error in the same call are
    /// returned first and the error is reported on the next call; from then
    /// on every call fails.
    pub fn decode(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Some(failure) = self.failure.take() {
            self.failure = Some(failure.duplicate());
            return Err(failure);
        }

        let mut written = 0;
        if let Some(copy) = self.pending.take() {
            written = self.copy_match(copy, buf);
        }

        while written < buf.len() {
            if self.finished {
                break;
            }
            if self.reached_declared_size() {
                self.finish("declared size reached");
                break;
            }

            let step = match self.decode_symbol() {
                Ok(step) => step,
                Err(e) => {
                    self.pending = None;
                    if written == 0 {
                        self.failure = Some(e.duplicate());
                        return Err(e);
                    }
                    self.failure = Some(e);
                    return Ok(written);
                }
            };
            match step {
                Step::Byte(byte) => {
                    buf[written] = byte;
                    written += 1;
                }
                Step::Copy(copy) => {
                    written += self.copy_match(copy, &mut buf[written..]);
                }
                Step::End => self.finish("end marker"),
            }
        }

        Ok(written)
    }

    fn reached_declared_size(&self) -> bool {
        self.header
            .uncompressed_size
            .is_some_and(|size| self.window.total_written() >= size)
    }

    fn finish(&mut self, reason: &str) {
        self.finished = true;
        self.pending = None;
        debug!(total = self.window.total_written(), reason, "LZMA stream finished");
    }

    /// Decode one symbol, updating the window, rep distances and state.
    fn decode_symbol(&mut self) -> Result<Step> {
        let pos = self.window.total_written();
        let pos_state = (pos & self.pos_mask) as usize;
        let state = self.state;

        let kind = {
            let models = &mut self.models;
            let rc = &mut self.rc;
            SymbolKind::classify(|decision| models.decide(rc, decision, state, pos_state))?
        };

        match kind {
            SymbolKind::Literal => {
                let prev_byte = self.window.get_byte(0);
                let byte = if state.is_char_state() {
                    self.models
                        .literal
                        .decode_normal(&mut self.rc, pos, prev_byte)?
                } else {
                    let match_byte = self.window.get_byte(self.reps[0]);
                    self.models.literal.decode_with_match_byte(
                        &mut self.rc,
                        pos,
                        prev_byte,
                        match_byte,
                    )?
                };
                self.window.put_byte(byte);
                self.state.update_char();
                Ok(Step::Byte(byte))
            }
            SymbolKind::ShortRep => {
                self.check_distance(self.reps[0])?;
                self.state.update_short_rep();
                Ok(Step::Byte(self.window.copy_byte(self.reps[0])))
            }
            SymbolKind::Rep(index) => {
                let distance = self.reps[index];
                self.reps.copy_within(0..index, 1);
                self.reps[0] = distance;

                let len = self.models.rep_len.decode(&mut self.rc, pos_state)? + MATCH_MIN_LEN;
                self.state.update_rep();
                self.check_distance(distance)?;
                Ok(Step::Copy(PendingCopy {
                    distance,
                    remaining: len,
                }))
            }
            SymbolKind::Match => {
                self.reps.copy_within(0..3, 1);

                let len = self.models.len.decode(&mut self.rc, pos_state)? + MATCH_MIN_LEN;
                self.state.update_match();
                let distance = self.models.decode_distance(&mut self.rc, len)?;
                self.reps[0] = distance;

                if distance == END_MARKER {
                    return Ok(Step::End);
                }
                self.check_distance(distance)?;
                Ok(Step::Copy(PendingCopy {
                    distance,
                    remaining: len,
                }))
            }
        }
    }

    /// A distance must point into bytes already produced and inside the dictionary.
    fn check_distance(&self, distance: u32) -> Result<()> {
        if distance >= self.header.dict_size_check() || !self.window.has_distance(distance) {
            let position = self.window.total_written();
            warn!(distance, position, "rejecting out-of-range LZMA distance");
            return Err(DecompressError::InvalidBackReference { distance, position });
        }
        Ok(())
    }

    /// Copy as much of `copy` as fits in `out`, keeping the rest pending.
    fn copy_match(&mut self, copy: PendingCopy, out: &mut [u8]) -> usize {
        let mut len = u64::from(copy.remaining);
        if let Some(size) = self.header.uncompressed_size {
            len = len.min(size.saturating_sub(self.window.total_written()));
        }
        let n = out.len().min(len as usize);

        for slot in &mut out[..n] {
            *slot = self.window.copy_byte(copy.distance);
        }

        let remaining = (len - n as u64) as u32;
        if remaining > 0 {
            self.pending = Some(PendingCopy {
                distance: copy.distance,
                remaining,
            });
        }
        n
    }
}
