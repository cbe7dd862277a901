//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use parsehl::span::TextSpan;
use parsehl::syntax::{
    ExtractorRule, ParseDefinition, ParseOperation, ParseOutcome, SyntaxCategory,
};
use parsehl::text::TextSnapshot;

pub fn span(start: usize, end: usize) -> TextSpan {
    TextSpan::new(start, end).expect("start <= end")
}

/// Definition with C-style comments, double-quoted strings and single-quoted chars
pub fn c_like() -> ParseDefinition {
    ParseDefinition::builder()
        .extractor(
            SyntaxCategory::Keywords,
            ExtractorRule::words(["if", "else", "return", "while"], false).unwrap(),
        )
        .extractor(
            SyntaxCategory::Types,
            ExtractorRule::words(["int", "char", "void"], false).unwrap(),
        )
        .extractor(
            SyntaxCategory::Numbers,
            ExtractorRule::pattern(r"\b\d+\b", false).unwrap(),
        )
        .inline_comment("//")
        .block_comment("/*", "*/")
        .quote("\"", SyntaxCategory::Strings)
        .quote("'", SyntaxCategory::Characters)
        .build()
        .unwrap()
}

/// Definition with only comment and string delimiters
pub fn delimiters_only() -> ParseDefinition {
    ParseDefinition::builder()
        .inline_comment("//")
        .block_comment("/*", "*/")
        .quote("\"", SyntaxCategory::Strings)
        .build()
        .unwrap()
}

/// Run over the whole text with the given pool size
pub fn run_full(definition: &ParseDefinition, text: &str, workers: usize) -> ParseOutcome {
    let snapshot = TextSnapshot::from(text);
    let span = snapshot.full_span();
    ParseOperation::new(definition.clone(), snapshot, span)
        .unwrap()
        .with_worker_count(workers)
        .run()
        .unwrap()
}

/// Source text covered by each span
pub fn slices<'a>(text: &'a str, spans: &[TextSpan]) -> Vec<&'a str> {
    spans.iter().map(|s| &text[s.as_range()]).collect()
}
