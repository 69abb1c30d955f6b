use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::decoder::{DecodeStats, Entry, LineDecoder};
use crate::diagnostic::{DiagnosticSink, LogSink};
use crate::error::DecodeError;

/// Asynchronous streaming decoder over any `AsyncRead`: yields values one
/// at a time without buffering the entire payload.
///
/// This is the entry point for files, sockets, pipes and HTTP bodies
/// exposed as readers. Backpressure is handled naturally: the reader is
/// only read when the caller awaits the next value and nothing decoded is
/// left over from the previous read.
///
/// For sources that already produce chunks as a `Stream`, use
/// [`NdjsonStream`](crate::NdjsonStream).
///
/// # Example
///
/// ```rust,no_run
/// use ndstream_decoder::{DecoderConfig, StreamingDecoder};
/// use tokio::io::AsyncRead;
///
/// async fn count_values(reader: impl AsyncRead + Unpin) -> usize {
///     let mut decoder: StreamingDecoder<_> =
///         StreamingDecoder::new(reader, &DecoderConfig::default());
///     let mut count = 0;
///     while let Some(_value) = decoder.next().await.transpose().unwrap() {
///         count += 1;
///     }
///     count
/// }
/// ```
pub struct StreamingDecoder<R, T = serde_json::Value, D = LogSink> {
    reader: R,
    state: StreamState,
    decoder: LineDecoder<T>,
    ready: VecDeque<Entry<T>>,
    /// Read buffer, reused across reads.
    buf: Vec<u8>,
    sink: D,
}

/// Internal state machine for the streaming decoder.
///
/// ```text
///   Reading → Done
/// ```
///
/// `Done` is entered on end of input (after the final tail is decoded)
/// or on the first I/O error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
    Reading,
    Done,
}

impl<R, T> StreamingDecoder<R, T, LogSink>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    /// Create a streaming decoder that logs diagnostics.
    #[must_use]
    pub fn new(reader: R, config: &DecoderConfig) -> Self {
        Self::with_sink(reader, config, LogSink)
    }
}

impl<R, T, D> StreamingDecoder<R, T, D>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
    D: DiagnosticSink,
{
    /// Create a streaming decoder that reports diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(reader: R, config: &DecoderConfig, sink: D) -> Self {
        Self {
            reader,
            state: StreamState::Reading,
            decoder: LineDecoder::with_config(config),
            ready: VecDeque::new(),
            buf: vec![0u8; config.read_buffer_size.max(1)],
            sink,
        }
    }

    /// Read the next value from the stream.
    ///
    /// Returns `Some(Ok(value))` for each decoded value, `None` once the
    /// reader is exhausted and the final tail has been decoded, or
    /// `Some(Err)` if the reader fails. After an error every call returns
    /// `None`.
    pub async fn next(&mut self) -> Option<Result<T, DecodeError>> {
        loop {
            while let Some(entry) = self.ready.pop_front() {
                match entry {
                    Entry::Record(value) => return Some(Ok(value)),
                    Entry::Diagnostic(diagnostic) => self.sink.report(diagnostic),
                }
            }

            if self.state == StreamState::Done {
                return None;
            }

            let n = match self.reader.read(&mut self.buf).await {
                Ok(n) => n,
                Err(e) => {
                    self.state = StreamState::Done;
                    return Some(Err(DecodeError::Io(e)));
                }
            };

            if n == 0 {
                self.state = StreamState::Done;
                if let Err(e) = self.decoder.finalize_entries(&mut self.ready) {
                    return Some(Err(e));
                }
                let stats = self.decoder.stats();
                debug!(
                    lines = stats.lines,
                    records = stats.records,
                    diagnostics = stats.diagnostics,
                    "reader reached end of input"
                );
                continue;
            }

            trace!(len = n, "ingesting read");
            if let Err(e) = self.decoder.ingest_entries(&self.buf[..n], &mut self.ready) {
                self.state = StreamState::Done;
                return Some(Err(e));
            }
        }
    }

    /// Counters for the lines decoded so far.
    #[must_use]
    pub fn stats(&self) -> DecodeStats {
        self.decoder.stats()
    }

    #[must_use]
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Stop decoding and give the reader back. Queued values and the
    /// unterminated carry are discarded.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Stop decoding and return both the reader and the sink.
    #[must_use]
    pub fn into_parts(self) -> (R, D) {
        (self.reader, self.sink)
    }
}
