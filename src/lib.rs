//! Streaming decoder for the `.lzma` (LZMA-alone) format.
//!
//! Decodes the 13-byte header and the range-coded LZMA payload that
//! follows it, producing output incrementally into caller buffers.
//!
//! ## Features
//! - Core library depends only on `tracing`
//! - `async` - Async file reading with tokio
//! - `parallel` - Batch decoding of independent streams with rayon
//! - `wasm` - Browser WASM bindings
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::io::Read;
//! use lzma_stream::LzmaReader;
//!
//! let compressed = std::fs::read("data.lzma")?;
//! let mut out = Vec::new();
//! LzmaReader::new(compressed.as_slice()).read_to_end(&mut out)?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod decompress;
pub mod error;
mod file_media;
pub mod parsing;
mod reader;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(feature = "wasm")]
mod wasm_bindings;

pub use error::LzmaError;
pub use file_media::LocalFileMedia;
pub use reader::{CompressionMode, LzmaReader};

pub use decompress::{decompress, DecoderOptions, DecompressError, LzmaDecoder};
pub use parsing::{LzmaHeader, LzmaProperties};

#[cfg(feature = "wasm")]
pub use wasm_bindings::*;
