#![no_main]

use libfuzzer_sys::fuzz_target;
use ndstream_decoder::LineDecoder;
use serde_json::Value;

// Fuzz target: one-shot decoder entry point.
//
// Calls `LineDecoder::decode_slice(data)` on arbitrary input bytes.
// Malformed input must only ever produce diagnostics, never an error or
// a panic, and every diagnostic index must fall within the line count.
fuzz_target!(|data: &[u8]| {
    let decoded = LineDecoder::<Value>::decode_slice(data).unwrap();
    let lines = data.iter().filter(|&&b| b == b'\n').count() as u64 + 1;
    for diag in &decoded.diagnostics {
        assert!(diag.index >= 1 && diag.index <= lines);
    }
});
