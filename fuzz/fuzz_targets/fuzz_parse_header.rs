#![no_main]
use libfuzzer_sys::fuzz_target;
use lzma_stream::parsing::LzmaHeaderParser;

fuzz_target!(|data: &[u8]| {
    let _ = LzmaHeaderParser::parse(data);

    let mut cursor = data;
    let _ = LzmaHeaderParser::read_from(&mut cursor);
});
