//! WASM bindings for lzma-stream.
//!
//! Provides browser-compatible API for `.lzma` header inspection and decompression.

use wasm_bindgen::prelude::*;

use crate::decompress::{self, LzmaDecoder};
use crate::parsing::{LzmaHeaderParser, LzmaProperties};

/// Check if a buffer starts with a plausible `.lzma` header.
///
/// Only the properties byte and the range coder marker can be checked;
/// the rest of the header has no fixed values.
#[wasm_bindgen]
pub fn is_lzma_header(data: &[u8]) -> bool {
    data.len() > LzmaHeaderParser::HEADER_SIZE
        && LzmaProperties::from_byte(data[0]).is_ok()
        && data[LzmaHeaderParser::HEADER_SIZE] == 0
}

/// Parse the 13-byte `.lzma` header.
#[wasm_bindgen]
pub fn parse_lzma_header(data: &[u8]) -> Result<JsValue, JsError> {
    let header = LzmaHeaderParser::parse(data)
        .map_err(|e| JsError::new(&format!("Invalid header: {}", e)))?;

    let obj = js_sys::Object::new();
    let props = header.properties;
    let _ = js_sys::Reflect::set(&obj, &"lc".into(), &JsValue::from(props.lc));
    let _ = js_sys::Reflect::set(&obj, &"lp".into(), &JsValue::from(props.lp));
    let _ = js_sys::Reflect::set(&obj, &"pb".into(), &JsValue::from(props.pb));
    let _ = js_sys::Reflect::set(&obj, &"dictSize".into(), &JsValue::from(header.dict_size));
    let size = match header.uncompressed_size {
        Some(size) => JsValue::from_f64(size as f64),
        None => JsValue::NULL,
    };
    let _ = js_sys::Reflect::set(&obj, &"uncompressedSize".into(), &size);

    Ok(obj.into())
}

/// Decompress a complete `.lzma` buffer.
#[wasm_bindgen]
pub fn decompress_lzma(data: &[u8]) -> Result<Vec<u8>, JsError> {
    decompress::decompress(data).map_err(|e| JsError::new(&e.to_string()))
}

/// Incremental decoder over an owned compressed buffer.
#[wasm_bindgen]
pub struct WasmLzmaDecoder {
    decoder: LzmaDecoder<std::io::Cursor<Vec<u8>>>,
}

#[wasm_bindgen]
impl WasmLzmaDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new(data: Vec<u8>) -> Result<WasmLzmaDecoder, JsError> {
        let decoder = LzmaDecoder::new(std::io::Cursor::new(data))
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self { decoder })
    }

    /// Decode up to `max_len` bytes; an empty result means the stream ended.
    #[wasm_bindgen]
    pub fn next_chunk(&mut self, max_len: usize) -> Result<Vec<u8>, JsError> {
        let mut buf = vec![0u8; max_len];
        let n = self
            .decoder
            .decode(&mut buf)
            .map_err(|e| JsError::new(&e.to_string()))?;
        buf.truncate(n);
        Ok(buf)
    }

    #[wasm_bindgen]
    pub fn bytes_written(&self) -> u64 {
        self.decoder.bytes_written()
    }

    #[wasm_bindgen]
    pub fn is_complete(&self) -> bool {
        self.decoder.is_finished()
    }
}
