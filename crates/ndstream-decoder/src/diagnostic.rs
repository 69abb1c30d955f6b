use std::fmt;

/// What went wrong with a skipped line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The line is not valid JSON (or not valid for the requested type).
    Syntax,
    /// The line exceeded `max_record_bytes` and was discarded unread.
    Oversized,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("syntax"),
            Self::Oversized => f.write_str("oversized"),
        }
    }
}

/// A non-fatal report about one line that produced no value.
///
/// `index` is the 1-based position of the line in the input, counting
/// every line seen so far: blank, malformed and valid alike.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub index: u64,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl ParseDiagnostic {
    pub(crate) fn syntax(index: u64, err: &serde_json::Error) -> Self {
        Self {
            index,
            kind: DiagnosticKind::Syntax,
            message: err.to_string(),
        }
    }

    pub(crate) fn oversized(index: u64, length: usize, limit: usize) -> Self {
        Self {
            index,
            kind: DiagnosticKind::Oversized,
            message: format!("record of {length} bytes exceeds limit of {limit} bytes"),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.index, self.message)
    }
}

/// Receiver for diagnostics, separate from the value sequence.
///
/// The adapters call [`report`](Self::report) synchronously, once per
/// diagnostic, in input order, at the moment iteration reaches the
/// offending line. Nothing is reported after the adapter is dropped.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: ParseDiagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(ParseDiagnostic),
{
    fn report(&mut self, diagnostic: ParseDiagnostic) {
        self(diagnostic);
    }
}

/// Default sink: one `tracing` warning per diagnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: ParseDiagnostic) {
        tracing::warn!(
            line = diagnostic.index,
            kind = %diagnostic.kind,
            "skipping malformed record: {}",
            diagnostic.message
        );
    }
}

/// Sink that keeps every diagnostic for inspection after decoding.
#[derive(Clone, Debug, Default)]
pub struct Collect(pub Vec<ParseDiagnostic>);

impl Collect {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<ParseDiagnostic> {
        self.0
    }
}

impl DiagnosticSink for Collect {
    fn report(&mut self, diagnostic: ParseDiagnostic) {
        self.0.push(diagnostic);
    }
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ignore;

impl DiagnosticSink for Ignore {
    fn report(&mut self, _diagnostic: ParseDiagnostic) {}
}
