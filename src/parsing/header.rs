//! `.lzma` stream header parser.
//!
//! The header is 13 bytes, all little-endian:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | properties: `(pb * 5 + lp) * 9 + lc` |
//! | 1 | 4 | dictionary size |
//! | 5 | 8 | uncompressed size, `u64::MAX` if unknown |
//!
//! The range coder preamble that follows is handled by the range decoder.

use std::io::{self, Read};

use crate::decompress::{DecompressError, Result};

/// Uncompressed size value meaning "terminated by an end marker".
pub const UNKNOWN_SIZE: u64 = u64::MAX;

/// Literal/position context parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LzmaProperties {
    /// Literal context bits (0-8).
    pub lc: u32,
    /// Literal position bits (0-4).
    pub lp: u32,
    /// Position state bits (0-4).
    pub pb: u32,
}

impl LzmaProperties {
    pub const MAX_LC: u32 = 8;
    pub const MAX_LP: u32 = 4;
    pub const MAX_PB: u32 = 4;

    /// Decode a properties byte.
    pub fn from_byte(byte: u8) -> Result<Self> {
        let value = u32::from(byte);
        let props = Self {
            lc: value % 9,
            lp: (value / 9) % 5,
            pb: value / 45,
        };
        if props.lc > Self::MAX_LC || props.lp > Self::MAX_LP || props.pb > Self::MAX_PB {
            return Err(DecompressError::InvalidProperties(byte));
        }
        Ok(props)
    }

    pub fn to_byte(self) -> u8 {
        ((self.pb * 5 + self.lp) * 9 + self.lc) as u8
    }

    pub fn num_pos_states(self) -> usize {
        1 << self.pb
    }
}

impl Default for LzmaProperties {
    /// The encoder default, `0x5D`.
    fn default() -> Self {
        Self { lc: 3, lp: 0, pb: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaHeader {
    pub properties: LzmaProperties,
    /// Dictionary size as stored in the header.
    pub dict_size: u32,
    /// Declared output size; `None` when the stream ends with an end marker.
    pub uncompressed_size: Option<u64>,
}

impl LzmaHeader {
    /// Dictionary size used for distance validation (a stored 0 means 1).
    pub fn dict_size_check(&self) -> u32 {
        self.dict_size.max(1)
    }
}

pub struct LzmaHeaderParser;

impl LzmaHeaderParser {
    pub const HEADER_SIZE: usize = 13;

    /// Parse a header from the start of `buffer`.
    pub fn parse(buffer: &[u8]) -> Result<LzmaHeader> {
        let mut reader = buffer;
        Self::read_from(&mut reader)
    }

    /// Read exactly the 13 header bytes from `reader`.
    ///
    /// The properties byte is validated before the remaining fields are read.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<LzmaHeader> {
        let mut props = [0u8; 1];
        read_header_bytes(reader, &mut props)?;
        let properties = LzmaProperties::from_byte(props[0])?;

        let mut fields = [0u8; Self::HEADER_SIZE - 1];
        read_header_bytes(reader, &mut fields)?;

        let dict_size = u32::from_le_bytes([fields[0], fields[1], fields[2], fields[3]]);
        let size = u64::from_le_bytes([
            fields[4], fields[5], fields[6], fields[7], fields[8], fields[9], fields[10],
            fields[11],
        ]);

        Ok(LzmaHeader {
            properties,
            dict_size,
            uncompressed_size: (size != UNKNOWN_SIZE).then_some(size),
        })
    }
}

fn read_header_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => DecompressError::TruncatedHeader,
        _ => DecompressError::Io(e),
    })
}
