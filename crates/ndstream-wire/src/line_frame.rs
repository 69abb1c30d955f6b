use bytes::{Bytes, BytesMut};

use crate::error::WireError;

/// The record delimiter. A single `\n` byte; a preceding `\r` stays in
/// the line and is treated as whitespace by the JSON parser.
pub const NEWLINE: u8 = b'\n';

/// One logical line produced by the [`LineFramer`].
///
/// Every line the framer observes gets an index, starting at 1, in input
/// order. Blank lines are framed too: deciding to skip them is left to
/// the layer that interprets the bytes.
///
/// ```text
///   input:   {"a":1}\n\n{"b":2}\n{"c"
///   frames:  Line(1, {"a":1})  Line(2, "")  Line(3, {"b":2})
///   carry:   {"c"
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete line, without its terminating newline.
    Line { index: u64, bytes: Bytes },

    /// A line that grew past the configured maximum length. Its bytes
    /// were discarded while it was being read; only the total length is
    /// kept. Never emitted for a line of pure ASCII whitespace.
    Oversized { index: u64, length: usize },
}

impl Frame {
    /// The 1-based line position of this frame.
    #[must_use]
    pub fn index(&self) -> u64 {
        match self {
            Frame::Line { index, .. } | Frame::Oversized { index, .. } => *index,
        }
    }
}

/// Incremental newline splitter with a carry buffer.
///
/// Bytes are pushed in arbitrarily sized chunks. Each push emits every
/// line terminated inside the chunk and keeps the unterminated suffix in
/// `carry` until a later chunk (or [`finish`](Self::finish)) completes it.
///
/// Splitting happens on raw bytes. `\n` never occurs inside a multi-byte
/// UTF-8 sequence, so a character cut in half by a chunk boundary is
/// simply reassembled in `carry` before anyone decodes it.
///
/// ```text
///   push(b"{\"id\":1}\n{\"i")   → [Line(1, {"id":1})]      carry = {"i
///   push(b"d\":2}\n")          → [Line(2, {"id":2})]      carry = (empty)
///   finish()                   → None
/// ```
///
/// State invariants:
///
/// - `carry` never contains a newline; it holds exactly the bytes after
///   the last newline seen (or, for an oversized line, nothing).
/// - `line_index` only grows, by one per emitted frame.
#[derive(Debug, Default)]
pub struct LineFramer {
    carry: BytesMut,
    line_index: u64,
    max_length: Option<usize>,
    /// Set once the current line exceeded `max_length`.
    overflow: Option<Overflow>,
    finished: bool,
}

/// Bookkeeping for a line whose bytes are being discarded.
#[derive(Clone, Copy, Debug)]
struct Overflow {
    length: usize,
    /// Every discarded byte so far was ASCII whitespace. Non-ASCII
    /// whitespace is not tracked and makes the line count as content.
    blank: bool,
}

impl LineFramer {
    /// Create a framer with no line length limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a framer that refuses to buffer lines longer than
    /// `max_length` bytes (not counting the newline).
    ///
    /// Lines over the limit are emitted as [`Frame::Oversized`] once
    /// their end is seen, unless they hold nothing but ASCII whitespace:
    /// those come out as an empty [`Frame::Line`] so they are skipped like
    /// any other blank line. Memory held for the carry never exceeds
    /// `max_length` bytes.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
            ..Self::default()
        }
    }

    /// Feed a chunk of bytes, appending every completed line to `out`.
    ///
    /// # Errors
    ///
    /// [`WireError::Finished`] if [`finish`](Self::finish) was already
    /// called.
    pub fn push(&mut self, chunk: &[u8], out: &mut Vec<Frame>) -> Result<(), WireError> {
        if self.finished {
            return Err(WireError::Finished { operation: "push" });
        }

        let mut rest = chunk;
        while let Some(pos) = memchr::memchr(NEWLINE, rest) {
            self.extend_line(&rest[..pos]);
            out.push(self.take_line());
            rest = &rest[pos + 1..];
        }
        self.extend_line(rest);

        Ok(())
    }

    /// Signal end of input and emit the unterminated tail, if any.
    ///
    /// A tail that is empty or whitespace-only yields `None` and does not
    /// advance the line index. After this call the framer is spent.
    ///
    /// # Errors
    ///
    /// [`WireError::Finished`] on a second call.
    pub fn finish(&mut self) -> Result<Option<Frame>, WireError> {
        if self.finished {
            return Err(WireError::Finished {
                operation: "finish",
            });
        }
        self.finished = true;

        let blank = match self.overflow {
            Some(overflow) => overflow.blank,
            None => is_blank(&self.carry),
        };
        if blank {
            self.carry.clear();
            self.overflow = None;
            return Ok(None);
        }

        Ok(Some(self.take_line()))
    }

    /// Number of lines emitted so far, blank and oversized ones included.
    #[must_use]
    pub fn line_index(&self) -> u64 {
        self.line_index
    }

    /// Bytes currently held for the unterminated line.
    #[must_use]
    pub fn carry_len(&self) -> usize {
        self.carry.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn extend_line(&mut self, bytes: &[u8]) {
        if let Some(overflow) = self.overflow.as_mut() {
            overflow.length += bytes.len();
            overflow.blank = overflow.blank && all_ascii_whitespace(bytes);
            return;
        }

        let length = self.carry.len() + bytes.len();
        match self.max_length {
            Some(max) if length > max => {
                let blank = all_ascii_whitespace(&self.carry) && all_ascii_whitespace(bytes);
                self.carry.clear();
                self.overflow = Some(Overflow { length, blank });
            }
            _ => self.carry.extend_from_slice(bytes),
        }
    }

    fn take_line(&mut self) -> Frame {
        self.line_index += 1;
        let index = self.line_index;

        match self.overflow.take() {
            Some(Overflow { blank: true, .. }) => Frame::Line {
                index,
                bytes: Bytes::new(),
            },
            Some(Overflow { length, .. }) => Frame::Oversized { index, length },
            None => Frame::Line {
                index,
                bytes: self.carry.split().freeze(),
            },
        }
    }
}

/// Whether a line carries no content: empty, or only whitespace.
///
/// Leading ASCII whitespace is skipped first. Any other ASCII byte means
/// content; from the first non-ASCII byte on, the rest must be valid UTF-8
/// made solely of Unicode whitespace to count as blank.
#[must_use]
pub fn is_blank(bytes: &[u8]) -> bool {
    match bytes.iter().position(|b| !b.is_ascii_whitespace()) {
        None => true,
        Some(pos) if bytes[pos].is_ascii() => false,
        Some(pos) => std::str::from_utf8(&bytes[pos..]).is_ok_and(|s| s.trim().is_empty()),
    }
}

fn all_ascii_whitespace(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}
