use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use futures::stream::FusedStream;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::decoder::{DecodeStats, Entry, LineDecoder};
use crate::diagnostic::{DiagnosticSink, LogSink};
use crate::error::{DecodeError, SourceError};

/// Decode a stream of byte chunks into a lazy stream of values.
///
/// Diagnostics go to a [`LogSink`]; use [`NdjsonStream::with_sink`] to
/// collect or observe them instead.
///
/// # Example
///
/// ```rust
/// use futures::{StreamExt, stream};
/// use ndstream_decoder::{DecoderConfig, decode};
/// use serde_json::Value;
///
/// # futures::executor::block_on(async {
/// let chunks = stream::iter([
///     Ok::<_, std::io::Error>(&b"{\"id\":1}\n{\"i"[..]),
///     Ok(&b"d\":2}\n"[..]),
/// ]);
/// let values: Vec<Value> = decode(chunks, &DecoderConfig::default())
///     .map(Result::unwrap)
///     .collect()
///     .await;
/// assert_eq!(values.len(), 2);
/// # });
/// ```
#[must_use]
pub fn decode<T, S>(source: S, config: &DecoderConfig) -> NdjsonStream<S, T, LogSink>
where
    T: DeserializeOwned,
{
    NdjsonStream::with_sink(source, config, LogSink)
}

/// Pull-based adapter from a chunk [`Stream`] to a stream of decoded
/// values.
///
/// The adapter holds a small ready-queue of entries produced by the last
/// chunk. A poll drains that queue first; only when it is empty does the
/// adapter poll `source` for the next chunk. Memory is therefore bounded
/// by one chunk's worth of values plus the decoder's carry, however long
/// the input is.
///
/// ```text
///   poll_next ──► ready-queue empty? ──no──► pop entry
///                        │                      ├─ Record     → yield
///                        yes                    └─ Diagnostic → sink, continue
///                        │
///                        ▼
///                 source.poll_next ─► Some(Ok(chunk)) → ingest, loop
///                                  ─► Some(Err(e))    → yield Source error, fuse
///                                  ─► None            → finalize, loop, then end
/// ```
///
/// Dropping the adapter drops `source`; [`into_inner`](Self::into_inner)
/// hands it back instead. Either way no further chunks are requested and
/// the sink is not called again.
pub struct NdjsonStream<S, T = serde_json::Value, D = LogSink> {
    /// `None` once the source ended, failed, or was released.
    source: Option<S>,
    decoder: LineDecoder<T>,
    ready: VecDeque<Entry<T>>,
    sink: D,
}

impl<S, T, D> NdjsonStream<S, T, D>
where
    T: DeserializeOwned,
{
    /// Create an adapter that reports diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(source: S, config: &DecoderConfig, sink: D) -> Self {
        Self {
            source: Some(source),
            decoder: LineDecoder::with_config(config),
            ready: VecDeque::new(),
            sink,
        }
    }

    #[must_use]
    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// Counters for the lines decoded so far.
    #[must_use]
    pub fn stats(&self) -> DecodeStats {
        self.decoder.stats()
    }

    /// Stop decoding and give the source back.
    ///
    /// Returns `None` if the source already ended or failed. Queued
    /// values and the unterminated carry are discarded.
    #[must_use]
    pub fn into_inner(self) -> Option<S> {
        self.source
    }

    /// Stop decoding and return both the source and the sink.
    #[must_use]
    pub fn into_parts(self) -> (Option<S>, D) {
        (self.source, self.sink)
    }
}

impl<S, B, E, T, D> Stream for NdjsonStream<S, T, D>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<SourceError>,
    T: DeserializeOwned + Unpin,
    D: DiagnosticSink + Unpin,
{
    type Item = Result<T, DecodeError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            while let Some(entry) = this.ready.pop_front() {
                match entry {
                    Entry::Record(value) => return Poll::Ready(Some(Ok(value))),
                    Entry::Diagnostic(diagnostic) => this.sink.report(diagnostic),
                }
            }

            let Some(source) = this.source.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(Pin::new(source).poll_next(cx)) {
                Some(Ok(chunk)) => {
                    let chunk = chunk.as_ref();
                    trace!(len = chunk.len(), "ingesting chunk");
                    if let Err(err) = this.decoder.ingest_entries(chunk, &mut this.ready) {
                        this.source = None;
                        return Poll::Ready(Some(Err(err)));
                    }
                }
                Some(Err(err)) => {
                    this.source = None;
                    debug!(
                        carry = this.decoder.carry_len(),
                        "input source failed, abandoning decode"
                    );
                    return Poll::Ready(Some(Err(DecodeError::Source(err.into()))));
                }
                None => {
                    this.source = None;
                    if let Err(err) = this.decoder.finalize_entries(&mut this.ready) {
                        return Poll::Ready(Some(Err(err)));
                    }
                    let stats = this.decoder.stats();
                    debug!(
                        lines = stats.lines,
                        records = stats.records,
                        diagnostics = stats.diagnostics,
                        "input source ended"
                    );
                }
            }
        }
    }
}

impl<S, B, E, T, D> FusedStream for NdjsonStream<S, T, D>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<SourceError>,
    T: DeserializeOwned + Unpin,
    D: DiagnosticSink + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.source.is_none() && self.ready.is_empty()
    }
}
