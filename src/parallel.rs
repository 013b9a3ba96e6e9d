//! Batch decoding of independent streams across the rayon thread pool.

use rayon::prelude::*;
use tracing::debug;

use crate::decompress::{decompress, Result};

/// Decode each stream independently. Results keep the input order.
pub fn decompress_all(streams: &[&[u8]]) -> Vec<Result<Vec<u8>>> {
    debug!(count = streams.len(), "decoding streams in parallel");
    streams.par_iter().map(|data| decompress(data)).collect()
}
