#![no_main]
use libfuzzer_sys::fuzz_target;
use lzma_stream::{DecoderOptions, LzmaDecoder};

fuzz_target!(|data: &[u8]| {
    // Cap the dictionary to avoid OOM on hostile headers
    let options = DecoderOptions::new().dict_size_limit(16 * 1024 * 1024);
    let Ok(mut decoder) = LzmaDecoder::with_options(data, options) else {
        return;
    };

    // Odd chunk size exercises resumable copies; output is capped at 64MB
    let mut buf = [0u8; 4093];
    let mut total = 0usize;
    while let Ok(n) = decoder.decode(&mut buf) {
        total += n;
        if n == 0 || total > 64 * 1024 * 1024 {
            break;
        }
    }
});
