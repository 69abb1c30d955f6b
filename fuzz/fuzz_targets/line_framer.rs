#![no_main]

use libfuzzer_sys::fuzz_target;
use ndstream_wire::{Frame, LineFramer};

// Fuzz target: LineFramer reassembly.
//
// Input format:
//   byte 0: chunk size (0 treated as 1)
//   bytes 1..: payload
//
// Frames the payload chunk by chunk and checks that joining the framed
// lines with newlines reproduces the payload, minus a blank tail.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let size = usize::from(data[0].max(1));
    let payload = &data[1..];

    let mut framer = LineFramer::new();
    let mut frames = Vec::new();
    for chunk in payload.chunks(size) {
        framer.push(chunk, &mut frames).unwrap();
    }
    let tail = framer.finish().unwrap();
    let has_tail = tail.is_some();
    frames.extend(tail);

    let mut rebuilt = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index(), i as u64 + 1);
        if let Frame::Line { bytes, .. } = frame {
            rebuilt.extend_from_slice(bytes);
        }
        if i + 1 < frames.len() || !has_tail {
            rebuilt.push(b'\n');
        }
    }

    assert!(payload.starts_with(&rebuilt));
    assert!(ndstream_wire::is_blank(&payload[rebuilt.len()..]));
});
