//! Delimiter scanning for comments and quoted strings
//!
//! Finds every literal occurrence of the definition's comment and quote
//! delimiters in a span. Pairing is left to the [resolver](super::resolver).

use super::definition::ParseDefinition;
use super::highlights::SyntaxCategory;
use crate::span::TextSpan;
use crate::text::TextSnapshot;

/// Identity of a delimiter; a begin only closes on an end with the same token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DelimiterToken {
    InlineComment,
    BlockComment,
    Quote(String),
}

/// What an occurrence can do in the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DelimiterRole {
    Begin,
    /// Opens and closes with the same literal (quotes)
    Both,
    End,
}

impl DelimiterRole {
    pub fn can_begin(self) -> bool {
        matches!(self, DelimiterRole::Begin | DelimiterRole::Both)
    }

    pub fn can_end(self) -> bool {
        matches!(self, DelimiterRole::End | DelimiterRole::Both)
    }
}

/// One delimiter found in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterOccurrence {
    pub token: DelimiterToken,
    pub role: DelimiterRole,
    pub span: TextSpan,
    pub category: SyntaxCategory,
}

/// Find all unescaped comment and quote delimiters within `span`
///
/// Inline comments produce a begin at the marker plus a synthesized empty end
/// at the next line terminator (or the span end, whichever comes first).
/// Only literal occurrences go through the escape check; a synthesized end
/// always closes its comment, even after a trailing backslash.
pub fn scan(
    definition: &ParseDefinition,
    text: &TextSnapshot,
    span: TextSpan,
) -> Vec<DelimiterOccurrence> {
    let mut occurrences = Vec::new();

    if let Some(block) = definition.block_comment() {
        occurrences.extend(find_literal(text, span, &block.begin).map(|found| {
            DelimiterOccurrence {
                token: DelimiterToken::BlockComment,
                role: DelimiterRole::Begin,
                span: found,
                category: SyntaxCategory::Comments,
            }
        }));
        occurrences.extend(find_literal(text, span, &block.end).map(|found| {
            DelimiterOccurrence {
                token: DelimiterToken::BlockComment,
                role: DelimiterRole::End,
                span: found,
                category: SyntaxCategory::Comments,
            }
        }));
    }

    if let Some(inline) = definition.inline_comment() {
        for found in find_literal(text, span, inline) {
            let line_end = text.line_contents_end(found.end).min(span.end);
            occurrences.push(DelimiterOccurrence {
                token: DelimiterToken::InlineComment,
                role: DelimiterRole::Begin,
                span: found,
                category: SyntaxCategory::Comments,
            });
            occurrences.push(DelimiterOccurrence {
                token: DelimiterToken::InlineComment,
                role: DelimiterRole::End,
                span: TextSpan::empty(line_end),
                category: SyntaxCategory::Comments,
            });
        }
    }

    for (quote, &category) in definition.quotes() {
        occurrences.extend(
            find_literal(text, span, quote).map(|found| DelimiterOccurrence {
                token: DelimiterToken::Quote(quote.clone()),
                role: DelimiterRole::Both,
                span: found,
                category,
            }),
        );
    }

    occurrences
}

/// Non-overlapping, unescaped occurrences of `literal` inside `span`
fn find_literal<'a>(
    text: &'a TextSnapshot,
    span: TextSpan,
    literal: &'a str,
) -> impl Iterator<Item = TextSpan> + 'a {
    text.as_str()[span.as_range()]
        .match_indices(literal)
        .map(move |(offset, found)| TextSpan {
            start: span.start + offset,
            end: span.start + offset + found.len(),
        })
        .filter(move |found| !text.is_escaped(found.start))
}
