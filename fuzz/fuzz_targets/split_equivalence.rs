#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ndstream_decoder::{Decoded, LineDecoder};
use serde_json::Value;

#[derive(Debug, Arbitrary)]
struct Input {
    payload: Vec<u8>,
    cuts: Vec<u16>,
}

// Fuzz target: chunk boundary independence.
//
// Decodes the payload whole, then again cut at arbitrary offsets, and
// asserts both runs produce identical values and diagnostics.
fuzz_target!(|input: Input| {
    let whole = LineDecoder::<Value>::decode_slice(&input.payload).unwrap();

    let mut cuts: Vec<usize> = input
        .cuts
        .iter()
        .map(|&c| usize::from(c) % (input.payload.len() + 1))
        .collect();
    cuts.sort_unstable();

    let mut decoder = LineDecoder::<Value>::new();
    let mut split = Decoded::default();
    let mut start = 0;
    for cut in cuts {
        split.merge(decoder.ingest(&input.payload[start..cut]).unwrap());
        start = cut;
    }
    split.merge(decoder.ingest(&input.payload[start..]).unwrap());
    split.merge(decoder.finalize().unwrap());

    assert_eq!(whole, split);
});
