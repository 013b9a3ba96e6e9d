//! LZMA decompression engine.
//!
//! This module implements the decoding side of the LZMA algorithm: a binary
//! range decoder driving adaptive probability models, interpreted by a small
//! state machine as literals and back-references into a sliding window.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`RangeDecoder`] | 32-bit range/code arithmetic over the input bytes |
//! | [`BitModel`], [`BitTree`] | adaptive probabilities and bit-tree symbols |
//! | [`LenDecoder`] | match lengths (low / mid / high trees) |
//! | [`LiteralDecoder`] | literal bytes, optionally guided by the match byte |
//! | [`State`] | twelve-state history of recent symbol kinds |
//! | [`LzmaDecoder`] | the engine that ties them together |
//!
//! ## Example
//!
//! ```rust,no_run
//! use lzma_stream::decompress::LzmaDecoder;
//!
//! let compressed = std::fs::read("archive.lzma")?;
//! let mut decoder = LzmaDecoder::new(compressed.as_slice())?;
//!
//! let mut buf = [0u8; 4096];
//! loop {
//!     let n = decoder.decode(&mut buf)?;
//!     if n == 0 {
//!         break;
//!     }
//!     // consume &buf[..n]
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Compressed bytes
//!       ↓
//! ┌──────────────┐
//! │ RangeDecoder │ ← binary decisions, one input byte at a time
//! └──────────────┘
//!       ↓
//! ┌──────────────┐
//! │ Bit models   │ ← literal / length / distance contexts
//! └──────────────┘
//!       ↓
//! ┌──────────────┐
//! │ LzmaDecoder  │ ← state machine, rep distances, pending copy
//! └──────────────┘
//!       ↓
//! ┌──────────────┐
//! │ OutWindow    │ ← circular history, also copied to the caller
//! └──────────────┘
//!       ↓
//! Decompressed bytes
//! ```

mod bit_model;
mod length;
mod literal;
mod lzma;
mod range_coder;
mod state;
mod window;

#[cfg(test)]
pub(crate) mod test_encoder;

pub use bit_model::{BitModel, BitTree};
pub use length::LenDecoder;
pub use literal::LiteralDecoder;
pub use lzma::{Decision, DecoderOptions, LzmaDecoder, SymbolKind};
pub use range_coder::RangeDecoder;
pub use state::State;
pub use window::OutWindow;

use std::fmt;
use std::io;

/// Largest buffer reserved up front by [`decompress`].
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Decompression errors.
///
/// | Class | Variants |
/// |-------|----------|
/// | Malformed header | `InvalidProperties`, `TruncatedHeader`, `InvalidRangeCoderMarker`, `InvalidInitialCode` |
/// | Corrupt stream | `InvalidBackReference` |
/// | Unexpected end | `UnexpectedEof` |
#[derive(Debug)]
pub enum DecompressError {
    /// The properties byte does not decode to valid `lc`/`lp`/`pb`.
    InvalidProperties(u8),
    /// The input ended inside the 13-byte header or the range coder preamble.
    TruncatedHeader,
    /// The first range coder byte must be zero.
    InvalidRangeCoderMarker(u8),
    /// The initial code equals the full range.
    InvalidInitialCode,
    /// A match distance points before the start of output or outside the dictionary.
    InvalidBackReference { distance: u32, position: u64 },
    /// The input ended before the declared size and without an end marker.
    UnexpectedEof,
    /// The dictionary exceeds the configured limit.
    DictionaryTooLarge { size: u32, limit: u32 },
    Io(io::Error),
}

impl DecompressError {
    pub fn is_malformed_header(&self) -> bool {
        matches!(
            self,
            Self::InvalidProperties(_)
                | Self::TruncatedHeader
                | Self::InvalidRangeCoderMarker(_)
                | Self::InvalidInitialCode
        )
    }

    pub fn is_corrupt_stream(&self) -> bool {
        matches!(self, Self::InvalidBackReference { .. })
    }

    pub fn is_unexpected_end(&self) -> bool {
        matches!(self, Self::UnexpectedEof)
    }

    /// Same error again, for reporting a failure more than once.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::InvalidProperties(b) => Self::InvalidProperties(*b),
            Self::TruncatedHeader => Self::TruncatedHeader,
            Self::InvalidRangeCoderMarker(b) => Self::InvalidRangeCoderMarker(*b),
            Self::InvalidInitialCode => Self::InvalidInitialCode,
            Self::InvalidBackReference { distance, position } => Self::InvalidBackReference {
                distance: *distance,
                position: *position,
            },
            Self::UnexpectedEof => Self::UnexpectedEof,
            Self::DictionaryTooLarge { size, limit } => Self::DictionaryTooLarge {
                size: *size,
                limit: *limit,
            },
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProperties(b) => write!(f, "Invalid LZMA properties byte: 0x{:02x}", b),
            Self::TruncatedHeader => write!(f, "Truncated LZMA header"),
            Self::InvalidRangeCoderMarker(b) => {
                write!(f, "Invalid range coder marker: 0x{:02x} (expected 0)", b)
            }
            Self::InvalidInitialCode => write!(f, "Invalid range coder initial code"),
            Self::InvalidBackReference { distance, position } => {
                write!(
                    f,
                    "Invalid back reference: distance {} at output position {}",
                    distance, position
                )
            }
            Self::UnexpectedEof => write!(f, "Unexpected end of compressed data"),
            Self::DictionaryTooLarge { size, limit } => {
                write!(f, "Dictionary size {} exceeds limit {}", size, limit)
            }
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for DecompressError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DecompressError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, DecompressError>;

/// Decompress a complete `.lzma` stream held in memory.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = LzmaDecoder::new(data)?;
    let capacity = decoder
        .header()
        .uncompressed_size
        .map_or(0, |size| size.min(MAX_PREALLOC)) as usize;
    let mut output = vec![0u8; capacity.max(4096)];
    let mut filled = 0;
    loop {
        if filled == output.len() {
            output.resize(output.len() * 2, 0);
        }
        let n = decoder.decode(&mut output[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    output.truncate(filled);
    Ok(output)
}
