//! `std::io::Read` adapter over the decoding engine.

use std::io::{self, Read};

use crate::decompress::{DecoderOptions, LzmaDecoder};
use crate::error::{LzmaError, Result};
use crate::parsing::LzmaHeader;

/// Direction of an LZMA stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    #[default]
    Decompress,
    /// Not supported; requesting it fails immediately.
    Compress,
}

enum Inner<R> {
    /// Header not read yet.
    Pending(R, DecoderOptions),
    Active(LzmaDecoder<R>),
    /// Construction failed; the source is gone.
    Failed,
}

/// Decompressing reader for `.lzma` streams.
///
/// The header is read on the first call to [`Read::read`], so building the
/// reader never touches the source. The reader cannot seek and has no
/// known length.
///
/// ```rust,no_run
/// use std::io::Read;
/// use lzma_stream::LzmaReader;
///
/// let file = std::io::BufReader::new(std::fs::File::open("data.lzma")?);
/// let mut reader = LzmaReader::new(file);
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct LzmaReader<R> {
    inner: Inner<R>,
}

impl<R: Read> LzmaReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_options(source, DecoderOptions::default())
    }

    pub fn with_options(source: R, options: DecoderOptions) -> Self {
        Self {
            inner: Inner::Pending(source, options),
        }
    }

    /// Create a reader for the given mode; only decompression is supported.
    pub fn with_mode(source: R, mode: CompressionMode) -> Result<Self> {
        match mode {
            CompressionMode::Decompress => Ok(Self::new(source)),
            CompressionMode::Compress => Err(LzmaError::CompressionNotSupported),
        }
    }

    /// The stream header, once the first read has parsed it.
    pub fn header(&self) -> Option<&LzmaHeader> {
        match &self.inner {
            Inner::Active(decoder) => Some(decoder.header()),
            _ => None,
        }
    }

    /// Return the underlying source, if the header was readable.
    pub fn into_inner(self) -> Option<R> {
        match self.inner {
            Inner::Pending(source, _) => Some(source),
            Inner::Active(decoder) => Some(decoder.into_inner()),
            Inner::Failed => None,
        }
    }

    fn decoder(&mut self) -> Result<&mut LzmaDecoder<R>> {
        if matches!(self.inner, Inner::Pending(..)) {
            if let Inner::Pending(source, options) =
                std::mem::replace(&mut self.inner, Inner::Failed)
            {
                self.inner = Inner::Active(LzmaDecoder::with_options(source, options)?);
            }
        }
        match &mut self.inner {
            Inner::Active(decoder) => Ok(decoder),
            _ => Err(LzmaError::Io(io::Error::other(
                "LZMA stream failed to initialize",
            ))),
        }
    }
}

impl<R: Read> Read for LzmaReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let decoder = self.decoder()?;
        decoder.decode(buf).map_err(|e| LzmaError::from(e).into())
    }
}
