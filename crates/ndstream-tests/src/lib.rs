//! Shared fixtures for the ndstream integration tests and benchmarks.

use ndstream_decoder::{Decoded, LineDecoder};
use serde_json::Value;

/// Decodes `payload` after cutting it into pieces at each offset in
/// `cuts` (offsets must be ascending and within bounds).
pub fn decode_split(payload: &[u8], cuts: &[usize]) -> Decoded<Value> {
    let mut decoder = LineDecoder::<Value>::new();
    let mut decoded = Decoded::default();
    let mut start = 0;
    for &cut in cuts {
        decoded.merge(decoder.ingest(&payload[start..cut]).expect("ingest"));
        start = cut;
    }
    decoded.merge(decoder.ingest(&payload[start..]).expect("ingest"));
    decoded.merge(decoder.finalize().expect("finalize"));
    decoded
}

/// Decodes `payload` in fixed-size chunks.
pub fn decode_chunked(payload: &[u8], chunk_size: usize) -> Decoded<Value> {
    let mut decoder = LineDecoder::<Value>::new();
    let mut decoded = Decoded::default();
    for chunk in payload.chunks(chunk_size) {
        decoded.merge(decoder.ingest(chunk).expect("ingest"));
    }
    decoded.merge(decoder.finalize().expect("finalize"));
    decoded
}

/// A synthetic event feed of `records` lines, with a blank line every
/// 10th record and a malformed one every 25th.
pub fn event_feed(records: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..records {
        if i % 25 == 24 {
            out.extend_from_slice(b"{\"id\": truncated\n");
        } else {
            let line = format!(
                "{{\"id\":{i},\"kind\":\"event\",\"tags\":[\"a\",\"b\"],\"payload\":{{\"n\":{}}}}}\n",
                i * 7
            );
            out.extend_from_slice(line.as_bytes());
        }
        if i % 10 == 9 {
            out.push(b'\n');
        }
    }
    out
}
