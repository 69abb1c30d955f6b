//! Chunk boundary tests: decoding must not depend on where the input is cut.
//!
//! The decoder carries the unterminated tail of each chunk into the next,
//! so any split, including one inside a multi-byte UTF-8 character or
//! exactly on a newline, must produce the same values and the same
//! diagnostics (indices and messages) as decoding the payload whole.

use ndstream_decoder::{DecoderConfig, Decoded, DiagnosticKind, LineDecoder};
use ndstream_tests::{decode_chunked, decode_split, event_feed};
use serde_json::Value;

const MIXED: &[u8] = "{\"id\":1}\n\n  \nbad\n{\"name\":\"café ☕\"}\r\n[1,2,3]\n{\"id\":\n\"tail\""
    .as_bytes();

fn whole(payload: &[u8]) -> Decoded<Value> {
    decode_split(payload, &[])
}

// ── Single split point ────────────────────────────────────────────────────────

#[test]
fn every_single_split_matches_whole() {
    let expected = whole(MIXED);
    assert_eq!(expected.records.len(), 4);
    assert_eq!(expected.diagnostics.len(), 2);

    for cut in 0..=MIXED.len() {
        assert_eq!(
            decode_split(MIXED, &[cut]),
            expected,
            "split at byte {cut} changed the output"
        );
    }
}

// ── Two split points ──────────────────────────────────────────────────────────

#[test]
fn every_pair_of_splits_matches_whole() {
    let expected = whole(MIXED);

    for first in 0..=MIXED.len() {
        for second in first..=MIXED.len() {
            assert_eq!(
                decode_split(MIXED, &[first, second]),
                expected,
                "splits at {first} and {second} changed the output"
            );
        }
    }
}

// ── Byte-at-a-time and fixed chunk sizes ──────────────────────────────────────

#[test]
fn one_byte_chunks_match_whole() {
    assert_eq!(decode_chunked(MIXED, 1), whole(MIXED));
}

#[test]
fn large_feed_in_various_chunk_sizes() {
    let feed = event_feed(500);
    let expected = whole(&feed);

    assert_eq!(expected.records.len(), 480);
    assert_eq!(expected.diagnostics.len(), 20);

    for size in [1, 2, 3, 7, 64, 100, 4096, feed.len()] {
        assert_eq!(decode_chunked(&feed, size), expected, "chunk size {size}");
    }
}

// ── Diagnostic indices ────────────────────────────────────────────────────────

#[test]
fn diagnostic_indices_count_every_line() {
    let decoded = whole(MIXED);
    let indices: Vec<_> = decoded.diagnostics.iter().map(|d| d.index).collect();

    // Lines: 1 record, 2 blank, 3 blank, 4 bad, 5 record, 6 record,
    // 7 `{"id":` (malformed), 8 tail record.
    assert_eq!(indices, vec![4, 7]);
}

#[test]
fn malformed_line_does_not_shift_neighbours() {
    let clean = whole(b"{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n");
    let with_bad = whole(b"{\"a\":1}\n{\"b\":\n{\"c\":3}\n");

    assert_eq!(with_bad.records[0], clean.records[0]);
    assert_eq!(with_bad.records[1], clean.records[2]);
    assert_eq!(with_bad.diagnostics[0].index, 2);
}

#[test]
fn indices_strictly_increase_in_large_feed() {
    let decoded = decode_chunked(&event_feed(300), 33);
    let indices: Vec<_> = decoded.diagnostics.iter().map(|d| d.index).collect();
    assert!(indices.windows(2).all(|w| w[0] < w[1]));
}

// ── Oversized lines ───────────────────────────────────────────────────────────

#[test]
fn oversized_detection_independent_of_chunking() {
    let payload = b"{\"id\":1}\n{\"blob\":\"aaaaaaaaaaaaaaaaaaaaaaaa\"}\n{\"id\":3}\n{\"blob\":\"bbbbbbbbbbbbbbbbbbbb\"}";
    let config = DecoderConfig::default().with_max_record_bytes(20);

    let decode_with = |chunk_size: usize| {
        let mut decoder = LineDecoder::<Value>::with_config(&config);
        let mut decoded = Decoded::default();
        for chunk in payload.chunks(chunk_size) {
            decoded.merge(decoder.ingest(chunk).unwrap());
        }
        decoded.merge(decoder.finalize().unwrap());
        decoded
    };

    let expected = decode_with(payload.len());
    assert_eq!(expected.records.len(), 2);
    assert_eq!(expected.diagnostics.len(), 2);
    assert!(expected
        .diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::Oversized));

    for size in 1..=payload.len() {
        assert_eq!(decode_with(size), expected, "chunk size {size}");
    }
}

#[test]
fn long_whitespace_lines_skipped_at_any_chunking() {
    let payload = b"{\"id\":1}\n          \n\t\t\t\t\t\t\r\n{\"id\":2}\n   x      \n        ";
    let config = DecoderConfig::default().with_max_record_bytes(8);

    let decode_with = |chunk_size: usize| {
        let mut decoder = LineDecoder::<Value>::with_config(&config);
        let mut decoded = Decoded::default();
        for chunk in payload.chunks(chunk_size) {
            decoded.merge(decoder.ingest(chunk).unwrap());
        }
        decoded.merge(decoder.finalize().unwrap());
        (decoded, decoder.stats().lines)
    };

    let (expected, lines) = decode_with(payload.len());
    assert_eq!(expected.records.len(), 2);
    let indices: Vec<_> = expected.diagnostics.iter().map(|d| d.index).collect();
    assert_eq!(indices, vec![5]);
    assert_eq!(expected.diagnostics[0].kind, DiagnosticKind::Oversized);
    assert_eq!(lines, 5);

    for size in 1..=payload.len() {
        assert_eq!(decode_with(size), (expected.clone(), lines), "chunk size {size}");
    }
}
