//! Syntax highlight extraction
//!
//! Turns a span of text into non-overlapping highlight ranges per
//! [`SyntaxCategory`]:
//! - Range extraction per category on a worker pool
//! - Comment and quoted-string pairing in one ordered sweep
//! - Priority-based sanitizing of overlapping ranges
//!
//! ## Architecture
//!
//! ```text
//! ParseDefinition + TextSnapshot + TextSpan
//!     → ParseOperation::run
//!         ├─ extract::ExtractorRule (per rule, parallel)
//!         └─ delimiter::scan → resolver::resolve
//!     → sanitize → ParseResult
//! ```

pub mod definition;
pub mod delimiter;
pub mod extract;
pub mod file;
mod highlights;
mod languages;
mod parser;
mod progress;
pub mod resolver;

pub use definition::{BlockDelimiters, ParseDefinition, ParseDefinitionBuilder};
pub use delimiter::{DelimiterOccurrence, DelimiterRole, DelimiterToken};
pub use extract::ExtractorRule;
pub use file::SyntaxFile;
pub use highlights::{HighlightRange, SyntaxCategory};
pub use languages::{
    BuiltinSyntax, Syntax, SyntaxInfo, SyntaxRegistry, SyntaxSource, BUILTIN_SYNTAXES,
};
pub use parser::{
    default_worker_count, parse, sanitize, CategorySpans, ParseOperation, ParseOutcome,
    ParseResult, ParseStatus,
};
pub use progress::{CancellationToken, ProgressHandle, ProgressSnapshot, RunState};
