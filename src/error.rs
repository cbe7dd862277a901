//! Error types for highlight extraction

use std::fmt;

/// Errors surfaced by the extraction engine
///
/// Cancellation is not an error: a cancelled run still yields a partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed parse definition (empty delimiter, bad regex, ...)
    InvalidDefinition(String),
    /// Input text is not valid UTF-8
    Encoding(String),
    /// Requested span lies outside the buffer or splits a character
    SpanOutOfBounds { start: usize, end: usize, len: usize },
    /// An internal invariant was violated during a run
    Internal(String),
}

impl Error {
    pub(crate) fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    /// Prefix the message of a definition error with where it came from
    pub(crate) fn context(self, prefix: impl fmt::Display) -> Self {
        match self {
            Self::InvalidDefinition(msg) => Self::InvalidDefinition(format!("{}: {}", prefix, msg)),
            other => other,
        }
    }

    /// True for errors caused by the caller's input rather than a bug
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDefinition(msg) => write!(f, "invalid parse definition: {}", msg),
            Self::Encoding(msg) => write!(f, "encoding error: {}", msg),
            Self::SpanOutOfBounds { start, end, len } => write!(
                f,
                "span {}..{} is out of bounds for text of length {}",
                start, end, len
            ),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;
