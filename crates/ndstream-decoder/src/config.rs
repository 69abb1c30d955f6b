/// Batch-size hint handed to consumers that group decoded values.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Default number of bytes requested per read by
/// [`StreamingDecoder`](crate::StreamingDecoder).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Configuration for a decode session.
///
/// Passed explicitly to every decoder and adapter constructor; there is
/// no process-wide default object.
///
/// ```text
/// ┌──────────────────┬──────────┬──────────────────────────────────────────┐
/// │ Field            │ Default  │ Read by                                  │
/// ├──────────────────┼──────────┼──────────────────────────────────────────┤
/// │ max_record_bytes │ None     │ LineDecoder (caps the carry buffer)      │
/// │ read_buffer_size │ 8192     │ StreamingDecoder (bytes per read call)   │
/// │ batch_size       │ 25       │ nothing in this crate; consumer metadata │
/// └──────────────────┴──────────┴──────────────────────────────────────────┘
/// ```
///
/// `batch_size` is carried so that callers have one place to thread it
/// through; the decoder never groups values itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum length of a single line in bytes, excluding the newline.
    ///
    /// Longer lines are discarded while being read and reported as an
    /// oversized diagnostic. `None` means unbounded.
    pub max_record_bytes: Option<usize>,

    /// Bytes requested from an `AsyncRead` source per read.
    pub read_buffer_size: usize,

    /// Consumer-side grouping hint.
    pub batch_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_record_bytes: None,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_max_record_bytes(mut self, max: usize) -> Self {
        self.max_record_bytes = Some(max);
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.read_buffer_size, 8192);
        assert!(config.max_record_bytes.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = DecoderConfig::default()
            .with_max_record_bytes(1024)
            .with_batch_size(100)
            .with_read_buffer_size(64);
        assert_eq!(config.max_record_bytes, Some(1024));
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.read_buffer_size, 64);
    }
}
