//! Local `.lzma` files.

use crate::decompress::LzmaDecoder;
use crate::error::Result;
use std::io::BufReader;

const CHUNK_SIZE: usize = 64 * 1024;

/// Local file implementation.
#[derive(Debug, Clone)]
pub struct LocalFileMedia {
    path: String,
    name: String,
    length: u64,
}

impl LocalFileMedia {
    pub fn new(path: &str) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            path: path.to_string(),
            name,
            length: metadata.len(),
        })
    }

    /// Compressed size in bytes.
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sync decompress, streaming from disk.
    pub fn decompress_sync(&self) -> Result<Vec<u8>> {
        let file = std::fs::File::open(&self.path)?;
        let mut decoder = LzmaDecoder::new(BufReader::new(file))?;
        let mut out = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let n = decoder.decode(&mut chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    /// Async decompress: the file is read with tokio, then decoded in memory.
    #[cfg(feature = "async")]
    #[cfg_attr(docsrs, doc(cfg(feature = "async")))]
    pub async fn decompress(&self) -> Result<Vec<u8>> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(crate::decompress::decompress(&data)?)
    }
}
