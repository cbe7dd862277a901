//! Immutable text snapshots
//!
//! A run reads one snapshot for its whole duration. Cloning is cheap (`Arc`),
//! so workers can share it across threads without copying the buffer.

use std::ops::Deref;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::span::TextSpan;

/// Escape character recognised in front of delimiters
pub const ESCAPE_CHAR: u8 = b'\\';

/// Immutable, shareable snapshot of a text buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSnapshot {
    text: Arc<str>,
}

impl TextSnapshot {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// Decode raw bytes as UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        std::str::from_utf8(bytes)
            .map(Self::new)
            .map_err(|e| Error::Encoding(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Span covering the whole buffer
    pub fn full_span(&self) -> TextSpan {
        TextSpan {
            start: 0,
            end: self.text.len(),
        }
    }

    /// Check that `span` lies inside the buffer on character boundaries
    pub fn validate_span(&self, span: TextSpan) -> Result<()> {
        let in_bounds = span.end <= self.text.len()
            && self.text.is_char_boundary(span.start)
            && self.text.is_char_boundary(span.end);

        if in_bounds {
            Ok(())
        } else {
            Err(Error::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len: self.text.len(),
            })
        }
    }

    /// True if the character at `pos` is preceded by an odd number of escapes
    ///
    /// `\"` is escaped, `\\"` is not.
    pub fn is_escaped(&self, pos: usize) -> bool {
        let bytes = self.text.as_bytes();
        let run = bytes[..pos.min(bytes.len())]
            .iter()
            .rev()
            .take_while(|&&b| b == ESCAPE_CHAR)
            .count();
        run % 2 == 1
    }

    /// Position of the next line terminator at or after `pos`, or the buffer end
    pub fn line_contents_end(&self, pos: usize) -> usize {
        let tail = &self.text[pos..];
        tail.char_indices()
            .find(|&(_, c)| is_line_terminator(c))
            .map(|(i, _)| pos + i)
            .unwrap_or(self.text.len())
    }
}

impl Deref for TextSnapshot {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl From<&str> for TextSnapshot {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextSnapshot {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}
