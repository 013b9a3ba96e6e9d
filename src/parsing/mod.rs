//! `.lzma` header parsing.

pub mod header;

pub use header::{LzmaHeader, LzmaHeaderParser, LzmaProperties, UNKNOWN_SIZE};
