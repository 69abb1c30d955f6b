/// Errors raised by the newline framer.
///
/// Framing itself cannot fail on input data: every byte sequence splits
/// into lines. The only failure is using a framer after it has been
/// finished, which is a caller bug rather than bad input.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// `push` or `finish` was called after `finish`.
    #[error("line framer already finished; cannot {operation}")]
    Finished { operation: &'static str },
}
