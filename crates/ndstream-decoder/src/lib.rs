#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod diagnostic;
pub mod error;
pub mod stream;
pub mod streaming;

pub use config::{DEFAULT_BATCH_SIZE, DecoderConfig};
pub use decoder::{DecodeStats, Decoded, Entry, LineDecoder};
pub use diagnostic::{Collect, DiagnosticKind, DiagnosticSink, Ignore, LogSink, ParseDiagnostic};
pub use error::DecodeError;
pub use stream::{NdjsonStream, decode};
pub use streaming::StreamingDecoder;
