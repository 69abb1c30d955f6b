use std::collections::VecDeque;
use std::marker::PhantomData;

use ndstream_wire::{Frame, LineFramer, is_blank};
use serde::de::DeserializeOwned;

use crate::config::DecoderConfig;
use crate::diagnostic::ParseDiagnostic;
use crate::error::DecodeError;

/// One decoded item, in input order.
///
/// The adapters queue these so that a diagnostic is surfaced exactly
/// between the records that surround it in the input.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry<T> {
    Record(T),
    Diagnostic(ParseDiagnostic),
}

/// The output of a single [`ingest`](LineDecoder::ingest) or
/// [`finalize`](LineDecoder::finalize) call.
///
/// ```text
/// ┌────────────────────────────────────────────────────────┐
/// │ Decoded<T>                                             │
/// │   records:     Vec<T>               ← parsed, in order │
/// │   diagnostics: Vec<ParseDiagnostic> ← skipped lines    │
/// └────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> Decoded<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.diagnostics.is_empty()
    }

    /// Append another call's output after this one.
    pub fn merge(&mut self, other: Decoded<T>) {
        self.records.extend(other.records);
        self.diagnostics.extend(other.diagnostics);
    }
}

impl<T> FromIterator<Entry<T>> for Decoded<T> {
    fn from_iter<I: IntoIterator<Item = Entry<T>>>(iter: I) -> Self {
        let mut decoded = Self::default();
        for entry in iter {
            match entry {
                Entry::Record(value) => decoded.records.push(value),
                Entry::Diagnostic(diag) => decoded.diagnostics.push(diag),
            }
        }
        decoded
    }
}

/// Running counters for a decode session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Lines observed, blank ones included.
    pub lines: u64,
    /// Values successfully parsed.
    pub records: u64,
    /// Lines reported as diagnostics.
    pub diagnostics: u64,
}

/// Synchronous line-buffering NDJSON decoder.
///
/// Pure computation: chunks go in, parsed values and diagnostics come
/// out. There are no suspension points and no I/O, which makes it the
/// piece to unit test. The async adapters
/// ([`NdjsonStream`](crate::NdjsonStream),
/// [`StreamingDecoder`](crate::StreamingDecoder)) drive it.
///
/// Per line, in order:
///
///   1. **Blank**: empty or whitespace-only lines are skipped silently.
///      They still advance the line index.
///   2. **Oversized**: with `max_record_bytes` set, a longer line yields
///      a [`DiagnosticKind::Oversized`](crate::DiagnosticKind::Oversized) diagnostic.
///   3. **Parse**: `serde_json::from_slice::<T>`. Success yields a record,
///      failure a [`DiagnosticKind::Syntax`](crate::DiagnosticKind::Syntax) diagnostic. Decoding always
///      continues with the next line.
///
/// The unterminated tail is held until [`finalize`](Self::finalize),
/// which parses it as one last line. A decoder is single-use: calls after
/// `finalize` return [`DecodeError::Finalized`].
///
/// # Example
///
/// ```rust
/// use ndstream_decoder::LineDecoder;
/// use serde_json::{Value, json};
///
/// let mut decoder = LineDecoder::<Value>::new();
/// let first = decoder.ingest(b"{\"id\":1}\n{\"i").unwrap();
/// assert_eq!(first.records, vec![json!({"id": 1})]);
///
/// let second = decoder.ingest(b"d\":2}\nbad\n").unwrap();
/// assert_eq!(second.records, vec![json!({"id": 2})]);
/// assert_eq!(second.diagnostics[0].index, 3);
///
/// assert!(decoder.finalize().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct LineDecoder<T = serde_json::Value> {
    framer: LineFramer,
    max_record_bytes: Option<usize>,
    stats: DecodeStats,
    finalized: bool,
    /// Reused across calls to avoid allocating a frame list per chunk.
    frames: Vec<Frame>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Default for LineDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> LineDecoder<T> {
    /// Create a decoder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&DecoderConfig::default())
    }

    /// Create a decoder honoring `config.max_record_bytes`.
    #[must_use]
    pub fn with_config(config: &DecoderConfig) -> Self {
        let framer = match config.max_record_bytes {
            Some(max) => LineFramer::with_max_length(max),
            None => LineFramer::new(),
        };
        Self {
            framer,
            max_record_bytes: config.max_record_bytes,
            stats: DecodeStats::default(),
            finalized: false,
            frames: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Decode a complete in-memory payload in one call.
    ///
    /// # Errors
    ///
    /// Never fails for a fresh decoder; the `Result` mirrors
    /// [`ingest`](Self::ingest).
    pub fn decode_slice(payload: &[u8]) -> Result<Decoded<T>, DecodeError> {
        let mut decoder = Self::new();
        let mut decoded = decoder.ingest(payload)?;
        decoded.merge(decoder.finalize()?);
        Ok(decoded)
    }

    /// Feed one chunk and return the records and diagnostics for every
    /// line it completes.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Finalized`] if [`finalize`](Self::finalize) was
    /// already called. Malformed lines are never errors.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<Decoded<T>, DecodeError> {
        let mut entries = VecDeque::new();
        self.ingest_entries(chunk, &mut entries)?;
        Ok(entries.into_iter().collect())
    }

    /// End the session and parse the unterminated tail, if any.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Finalized`] on a second call.
    pub fn finalize(&mut self) -> Result<Decoded<T>, DecodeError> {
        let mut entries = VecDeque::new();
        self.finalize_entries(&mut entries)?;
        Ok(entries.into_iter().collect())
    }

    /// Like [`ingest`](Self::ingest), but appends to `out` with records
    /// and diagnostics interleaved in input order.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Finalized`] if the decoder is spent.
    pub fn ingest_entries(
        &mut self,
        chunk: &[u8],
        out: &mut VecDeque<Entry<T>>,
    ) -> Result<(), DecodeError> {
        if self.finalized {
            return Err(DecodeError::Finalized {
                operation: "ingest",
            });
        }

        let mut frames = std::mem::take(&mut self.frames);
        self.framer.push(chunk, &mut frames)?;
        for frame in frames.drain(..) {
            self.decode_frame(frame, out);
        }
        self.frames = frames;

        Ok(())
    }

    /// Like [`finalize`](Self::finalize), but appends to `out`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Finalized`] on a second call.
    pub fn finalize_entries(&mut self, out: &mut VecDeque<Entry<T>>) -> Result<(), DecodeError> {
        if self.finalized {
            return Err(DecodeError::Finalized {
                operation: "finalize",
            });
        }
        self.finalized = true;

        if let Some(frame) = self.framer.finish()? {
            self.decode_frame(frame, out);
        }

        Ok(())
    }

    /// Number of lines observed so far, including blank and malformed
    /// ones. This is the index the next diagnostic would be relative to.
    #[must_use]
    pub fn record_index(&self) -> u64 {
        self.framer.line_index()
    }

    #[must_use]
    pub fn stats(&self) -> DecodeStats {
        DecodeStats {
            lines: self.framer.line_index(),
            ..self.stats
        }
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Bytes currently buffered for an unterminated line.
    #[must_use]
    pub fn carry_len(&self) -> usize {
        self.framer.carry_len()
    }

    fn decode_frame(&mut self, frame: Frame, out: &mut VecDeque<Entry<T>>) {
        let diagnostic = match frame {
            Frame::Line { bytes, .. } if is_blank(&bytes) => return,
            Frame::Line { index, bytes } => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    self.stats.records += 1;
                    out.push_back(Entry::Record(value));
                    return;
                }
                Err(err) => ParseDiagnostic::syntax(index, &err),
            },
            Frame::Oversized { index, length } => {
                // The framer only emits Oversized when a limit is set.
                let limit = self.max_record_bytes.unwrap_or_default();
                ParseDiagnostic::oversized(index, length, limit)
            }
        };

        self.stats.diagnostics += 1;
        out.push_back(Entry::Diagnostic(diagnostic));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;
    use serde::Deserialize;
    use serde_json::{Value, json};

    // Helper: decode chunks in sequence, merging all output
    fn decode_chunks(chunks: &[&[u8]]) -> Decoded<Value> {
        let mut decoder = LineDecoder::<Value>::new();
        let mut decoded = Decoded::default();
        for chunk in chunks {
            decoded.merge(decoder.ingest(chunk).unwrap());
        }
        decoded.merge(decoder.finalize().unwrap());
        decoded
    }

    fn indices(decoded: &Decoded<Value>) -> Vec<u64> {
        decoded.diagnostics.iter().map(|d| d.index).collect()
    }

    #[test]
    fn two_terminated_records() {
        let decoded = decode_chunks(&[b"{\"id\":1}\n{\"id\":2}\n"]);
        assert_eq!(decoded.records, vec![json!({"id": 1}), json!({"id": 2})]);
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn record_split_across_chunks() {
        let decoded = decode_chunks(&[b"{\"id\":1}\n{\"i", b"d\":2}\n"]);
        assert_eq!(decoded.records, vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[test]
    fn blank_lines_skipped_silently() {
        let decoded = decode_chunks(&[b"\n\n{\"id\":1}\n\n\n"]);
        assert_eq!(decoded.records, vec![json!({"id": 1})]);
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn malformed_lines_reported_with_line_index() {
        let decoded = decode_chunks(&[b"bad\n{\"id\":1}\nbad2\n"]);
        assert_eq!(decoded.records, vec![json!({"id": 1})]);
        assert_eq!(indices(&decoded), vec![1, 3]);
        assert!(decoded
            .diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::Syntax));
    }

    #[test]
    fn blank_lines_count_toward_diagnostic_index() {
        let decoded = decode_chunks(&[b"\n  \n{oops\n"]);
        assert_eq!(indices(&decoded), vec![3]);
    }

    #[test]
    fn trailing_record_only_at_finalize() {
        let mut decoder = LineDecoder::<Value>::new();
        let ingested = decoder.ingest(b"{\"id\":1}").unwrap();
        assert!(ingested.is_empty());

        let finalized = decoder.finalize().unwrap();
        assert_eq!(finalized.records, vec![json!({"id": 1})]);
        assert_eq!(decoder.record_index(), 1);
    }

    #[test]
    fn malformed_trailing_record_reported_at_finalize() {
        let mut decoder = LineDecoder::<Value>::new();
        decoder.ingest(b"{\"id\":1}\n{\"id\":").unwrap();
        let finalized = decoder.finalize().unwrap();
        assert!(finalized.records.is_empty());
        assert_eq!(finalized.diagnostics.len(), 1);
        assert_eq!(finalized.diagnostics[0].index, 2);
    }

    #[test]
    fn empty_input() {
        let decoded = decode_chunks(&[]);
        assert!(decoded.is_empty());

        let decoded = decode_chunks(&[b""]);
        assert!(decoded.is_empty());
    }

    #[test]
    fn crlf_line_endings_decode() {
        let decoded = decode_chunks(&[b"{\"id\":1}\r\n\r\n{\"id\":2}\r\n"]);
        assert_eq!(decoded.records, vec![json!({"id": 1}), json!({"id": 2})]);
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn scalar_values_are_records() {
        let decoded = decode_chunks(&[b"1\n\"two\"\nnull\n[3]\n"]);
        assert_eq!(
            decoded.records,
            vec![json!(1), json!("two"), Value::Null, json!([3])]
        );
    }

    #[test]
    fn invalid_utf8_is_a_diagnostic() {
        let decoded = decode_chunks(&[b"\"\xFF\"\n{\"id\":1}\n"]);
        assert_eq!(decoded.records, vec![json!({"id": 1})]);
        assert_eq!(indices(&decoded), vec![1]);
    }

    #[test]
    fn typed_records() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Event {
            id: u32,
        }

        let mut decoder = LineDecoder::<Event>::new();
        let decoded = decoder
            .ingest(b"{\"id\":7}\n{\"id\":\"x\"}\n{\"id\":8}\n")
            .unwrap();
        assert_eq!(decoded.records, vec![Event { id: 7 }, Event { id: 8 }]);
        assert_eq!(decoded.diagnostics[0].index, 2);
    }

    #[test]
    fn oversized_record_reported() {
        let config = DecoderConfig::default().with_max_record_bytes(10);
        let mut decoder = LineDecoder::<Value>::with_config(&config);
        let decoded = decoder
            .ingest(b"{\"id\":1}\n{\"payload\":\"xxxxxxxx\"}\n{\"id\":3}\n")
            .unwrap();

        assert_eq!(decoded.records, vec![json!({"id": 1}), json!({"id": 3})]);
        assert_eq!(decoded.diagnostics.len(), 1);
        let diag = &decoded.diagnostics[0];
        assert_eq!(diag.index, 2);
        assert_eq!(diag.kind, DiagnosticKind::Oversized);
        assert_eq!(diag.message, "record of 22 bytes exceeds limit of 10 bytes");
    }

    #[test]
    fn long_whitespace_lines_stay_blank_under_limit() {
        let config = DecoderConfig::default().with_max_record_bytes(4);
        let mut decoder = LineDecoder::<Value>::with_config(&config);
        let mut decoded = decoder.ingest(b"1\n          \n2\n        ").unwrap();
        decoded.merge(decoder.finalize().unwrap());

        assert_eq!(decoded.records, vec![json!(1), json!(2)]);
        assert!(decoded.diagnostics.is_empty());
        assert_eq!(decoder.stats().lines, 3);
    }

    #[test]
    fn entries_preserve_interleaving() {
        let mut decoder = LineDecoder::<Value>::new();
        let mut entries = VecDeque::new();
        decoder
            .ingest_entries(b"1\nx\n2\n", &mut entries)
            .unwrap();

        let kinds: Vec<_> = entries
            .iter()
            .map(|e| matches!(e, Entry::Record(_)))
            .collect();
        assert_eq!(kinds, vec![true, false, true]);
    }

    #[test]
    fn stats_track_every_line() {
        let mut decoder = LineDecoder::<Value>::new();
        decoder.ingest(b"1\n\nbad\n2").unwrap();
        decoder.finalize().unwrap();
        assert_eq!(
            decoder.stats(),
            DecodeStats {
                lines: 4,
                records: 2,
                diagnostics: 1
            }
        );
    }

    #[test]
    fn ingest_after_finalize_is_misuse() {
        let mut decoder = LineDecoder::<Value>::new();
        decoder.finalize().unwrap();

        let err = decoder.ingest(b"1\n").unwrap_err();
        assert!(matches!(err, DecodeError::Finalized { operation: "ingest" }));
        assert!(err.is_misuse());
    }

    #[test]
    fn double_finalize_is_misuse() {
        let mut decoder = LineDecoder::<Value>::new();
        decoder.ingest(b"1").unwrap();
        decoder.finalize().unwrap();
        assert!(matches!(
            decoder.finalize(),
            Err(DecodeError::Finalized {
                operation: "finalize"
            })
        ));
    }

    #[test]
    fn decode_slice_matches_chunked() {
        let payload = b"{\"a\":1}\nnope\n\n{\"b\":2}";
        let whole = LineDecoder::<Value>::decode_slice(payload).unwrap();
        let chunked = decode_chunks(&[&payload[..5], &payload[5..13], &payload[13..]]);
        assert_eq!(whole, chunked);
    }
}
