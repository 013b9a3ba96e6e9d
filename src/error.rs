//! Error types for `.lzma` decoding.
//!
//! This module provides the [`LzmaError`] type returned by the crate's
//! high-level entry points (readers, files, batch decoding).
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Format | [`Decompress`] | Malformed header, corrupt or truncated stream |
//! | Mode | [`CompressionNotSupported`] | A compressing stream was requested |
//! | I/O | [`Io`] | Read/write errors |
//!
//! ## Example
//!
//! ```rust,no_run
//! use lzma_stream::{LocalFileMedia, LzmaError};
//!
//! let file = LocalFileMedia::new("data.lzma")?;
//! match file.decompress_sync() {
//!     Ok(data) => println!("{} bytes", data.len()),
//!     Err(LzmaError::Decompress(e)) if e.is_malformed_header() => eprintln!("Not an LZMA file"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! [`Decompress`]: LzmaError::Decompress
//! [`CompressionNotSupported`]: LzmaError::CompressionNotSupported
//! [`Io`]: LzmaError::Io

use std::fmt;
use std::io;

use crate::decompress::DecompressError;

/// Error type for LZMA operations.
#[derive(Debug)]
pub enum LzmaError {
    /// The compressed stream could not be decoded.
    ///
    /// Use [`DecompressError::is_malformed_header`],
    /// [`DecompressError::is_corrupt_stream`] and
    /// [`DecompressError::is_unexpected_end`] to tell the cases apart.
    Decompress(DecompressError),

    /// Compression was requested; this crate only decodes.
    CompressionNotSupported,

    /// An I/O error occurred.
    ///
    /// Wraps [`std::io::Error`] for file system operations.
    Io(io::Error),
}

impl fmt::Display for LzmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decompress(e) => write!(f, "Decompression failed: {}", e),
            Self::CompressionNotSupported => write!(f, "Compression is not supported"),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for LzmaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decompress(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::CompressionNotSupported => None,
        }
    }
}

impl From<io::Error> for LzmaError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DecompressError> for LzmaError {
    fn from(e: DecompressError) -> Self {
        match e {
            DecompressError::Io(io) => Self::Io(io),
            other => Self::Decompress(other),
        }
    }
}

impl From<LzmaError> for io::Error {
    fn from(e: LzmaError) -> Self {
        match e {
            LzmaError::Io(io) => io,
            LzmaError::Decompress(DecompressError::UnexpectedEof) => {
                io::Error::new(io::ErrorKind::UnexpectedEof, DecompressError::UnexpectedEof)
            }
            LzmaError::Decompress(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            LzmaError::CompressionNotSupported => {
                io::Error::new(io::ErrorKind::Unsupported, LzmaError::CompressionNotSupported)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LzmaError>;
