//! parsehl - concurrent syntax-highlight extraction
//!
//! Given a language definition and a text snapshot, computes which byte
//! ranges belong to which syntax category (keywords, strings, comments, ...).
//! Extractor rules run on a worker pool, comment and quote delimiters are
//! resolved in a single sweep, and overlaps are settled by category priority.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod scheduler;
pub mod span;
pub mod syntax;
pub mod text;
pub mod tracing;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use scheduler::{HighlightMsg, HighlightScheduler};
pub use span::{SpanSet, TextSpan};
pub use syntax::{
    parse, ParseDefinition, ParseOperation, ParseOutcome, ParseResult, ParseStatus,
    ProgressHandle, SyntaxCategory,
};
pub use text::TextSnapshot;
