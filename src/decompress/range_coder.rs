//! Binary range decoder for LZMA.
//!
//! Works on a 32-bit `(range, code)` pair and pulls compressed bytes from
//! the source one at a time, only when normalization asks for them.

use std::io::{self, Read};

use super::{DecompressError, Result};

/// Normalization threshold: `range` is kept at or above 2^24.
const TOP: u32 = 1 << 24;

/// Probabilities are 11-bit fixed point.
pub const NUM_BIT_MODEL_TOTAL_BITS: u32 = 11;

/// Range decoder state.
#[derive(Debug)]
pub struct RangeDecoder<R> {
    inner: R,
    range: u32,
    code: u32,
}

impl<R: Read> RangeDecoder<R> {
    /// Initialize the range decoder from the byte source.
    ///
    /// Reads the zero marker byte followed by the big-endian initial code.
    /// These five bytes belong to the stream header, so running out of input
    /// here is reported as a truncated header.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut preamble = [0u8; 5];
        inner.read_exact(&mut preamble).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => DecompressError::TruncatedHeader,
            _ => DecompressError::Io(e),
        })?;

        if preamble[0] != 0 {
            return Err(DecompressError::InvalidRangeCoderMarker(preamble[0]));
        }

        let code = u32::from_be_bytes([preamble[1], preamble[2], preamble[3], preamble[4]]);
        let range = 0xFFFF_FFFF;
        if code == range {
            return Err(DecompressError::InvalidInitialCode);
        }

        Ok(Self { inner, range, code })
    }

    /// Pull the next compressed byte.
    #[inline]
    fn next_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        match self.inner.read_exact(&mut byte) {
            Ok(()) => Ok(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(DecompressError::UnexpectedEof)
            }
            Err(e) => Err(DecompressError::Io(e)),
        }
    }

    #[inline]
    fn normalize(&mut self) -> Result<()> {
        while self.range < TOP {
            self.code = (self.code << 8) | u32::from(self.next_byte()?);
            self.range <<= 8;
        }
        Ok(())
    }

    /// Decode one binary decision against an 11-bit probability of zero.
    #[inline]
    pub fn decode_bit(&mut self, prob: u16) -> Result<u32> {
        let bound = (self.range >> NUM_BIT_MODEL_TOTAL_BITS) * u32::from(prob);
        let bit = if self.code < bound {
            self.range = bound;
            0
        } else {
            self.range -= bound;
            self.code -= bound;
            1
        };
        self.normalize()?;
        Ok(bit)
    }

    /// Decode `count` raw bits, most significant first, without a probability model.
    #[inline]
    pub fn decode_direct_bits(&mut self, count: u32) -> Result<u32> {
        let mut result = 0u32;
        for _ in 0..count {
            self.range >>= 1;
            if self.code >= self.range {
                self.code -= self.range;
                result = (result << 1) | 1;
            } else {
                result <<= 1;
            }
            self.normalize()?;
        }
        Ok(result)
    }

    /// Consume the decoder and return the byte source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Debug method to get internal state
    #[cfg(test)]
    pub fn debug_state(&self) -> (u32, u32) {
        (self.range, self.code)
    }
}
