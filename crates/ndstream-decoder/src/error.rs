use ndstream_wire::WireError;

/// Boxed error produced by an upstream chunk source.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that end or reject a decode session.
///
/// Malformed lines are deliberately absent from this enum: a line that
/// fails to parse is reported as a
/// [`ParseDiagnostic`](crate::ParseDiagnostic) and decoding continues.
/// Everything here is either a caller bug or a failure of the input
/// source itself.
///
/// ```text
///   DecodeError
///   ├── Finalized        ← ingest/finalize called on a spent decoder
///   ├── Source           ← chunk stream yielded an error (terminal)
///   ├── Io               ← AsyncRead failed (terminal)
///   └── Wire(WireError)  ← from ndstream-wire framing
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The decoder was already finalized.
    ///
    /// Signals incorrect use of the decoder, not bad input. `operation`
    /// names the call that was rejected.
    #[error("decoder already finalized; cannot {operation}")]
    Finalized { operation: &'static str },

    /// The chunk source failed while a pull was pending.
    ///
    /// No partial record recovery is attempted; the sequence ends after
    /// this error.
    #[error("input source failed: {0}")]
    Source(#[source] SourceError),

    /// An I/O error from the underlying reader (streaming decoder).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A framing error from `ndstream-wire`.
    #[error(transparent)]
    Wire(#[from] WireError),
}

impl DecodeError {
    /// Whether this error reports a programming mistake rather than a
    /// failing source.
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Finalized { .. } | Self::Wire(WireError::Finished { .. }))
    }
}
