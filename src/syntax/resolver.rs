//! Pairing of comment and quote delimiters
//!
//! A single sweep over position-sorted occurrences with one open slot. The
//! first delimiter to open swallows everything up to its own closing
//! delimiter, so a quote inside a block comment never opens a string and
//! different delimiter kinds never nest.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::delimiter::DelimiterOccurrence;
use super::highlights::SyntaxCategory;
use crate::error::{Error, Result};
use crate::span::TextSpan;

/// Pair begin/end occurrences into closed (or run-to-end) ranges per category
///
/// `parse_span` is the span the occurrences were scanned from; an unclosed
/// delimiter runs to its end.
pub fn resolve(
    occurrences: &[DelimiterOccurrence],
    parse_span: TextSpan,
) -> Result<BTreeMap<SyntaxCategory, Vec<TextSpan>>> {
    let mut sorted: Vec<&DelimiterOccurrence> = occurrences.iter().collect();
    sorted.sort_by(|a, b| sweep_order(a, b));

    let mut highlights: BTreeMap<SyntaxCategory, Vec<TextSpan>> = BTreeMap::new();
    let mut seek = parse_span.start;
    let mut open: Option<&DelimiterOccurrence> = None;

    for occurrence in sorted {
        let Some(item) = open else {
            if occurrence.role.can_begin() && occurrence.span.start >= seek {
                open = Some(occurrence);
            }
            continue;
        };

        if occurrence.role.can_end() && occurrence.token == item.token {
            let range = closed_range(item.span.start, occurrence.span.end)?;
            highlights.entry(item.category).or_default().push(range);
            seek = range.end;
            open = None;
        }
    }

    if let Some(item) = open {
        let range = closed_range(item.span.start, parse_span.end)?;
        highlights.entry(item.category).or_default().push(range);
    }

    Ok(highlights)
}

/// Position ascending, empty first, begin before end, longer first
fn sweep_order(a: &DelimiterOccurrence, b: &DelimiterOccurrence) -> Ordering {
    a.span
        .start
        .cmp(&b.span.start)
        .then_with(|| b.span.is_empty().cmp(&a.span.is_empty()))
        .then_with(|| a.role.cmp(&b.role))
        .then_with(|| b.span.len().cmp(&a.span.len()))
}

fn closed_range(start: usize, end: usize) -> Result<TextSpan> {
    TextSpan::new(start, end).ok_or_else(|| {
        Error::Internal(format!(
            "delimiter sweep produced inverted range {}..{}",
            start, end
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::delimiter::{DelimiterRole, DelimiterToken};

    fn occ(token: DelimiterToken, role: DelimiterRole, start: usize, end: usize) -> DelimiterOccurrence {
        let category = match token {
            DelimiterToken::Quote(_) => SyntaxCategory::Strings,
            _ => SyntaxCategory::Comments,
        };
        DelimiterOccurrence {
            token,
            role,
            span: TextSpan::new(start, end).unwrap(),
            category,
        }
    }

    fn quote(start: usize) -> DelimiterOccurrence {
        occ(
            DelimiterToken::Quote("\"".into()),
            DelimiterRole::Both,
            start,
            start + 1,
        )
    }

    #[test]
    fn test_pairs_quotes_in_order() {
        let found = resolve(&[quote(6), quote(0), quote(2), quote(4)], TextSpan::new(0, 8).unwrap())
            .unwrap();
        assert_eq!(
            found[&SyntaxCategory::Strings],
            vec![TextSpan::new(0, 3).unwrap(), TextSpan::new(4, 7).unwrap()]
        );
    }

    #[test]
    fn test_unclosed_runs_to_span_end() {
        let found = resolve(&[quote(3)], TextSpan::new(0, 20).unwrap()).unwrap();
        assert_eq!(found[&SyntaxCategory::Strings], vec![TextSpan::new(3, 20).unwrap()]);
    }

    #[test]
    fn test_block_comment_swallows_quote() {
        // /* " */ "x"
        let occurrences = [
            occ(DelimiterToken::BlockComment, DelimiterRole::Begin, 0, 2),
            quote(3),
            occ(DelimiterToken::BlockComment, DelimiterRole::End, 5, 7),
            quote(8),
            quote(10),
        ];
        let found = resolve(&occurrences, TextSpan::new(0, 11).unwrap()).unwrap();
        assert_eq!(found[&SyntaxCategory::Comments], vec![TextSpan::new(0, 7).unwrap()]);
        assert_eq!(found[&SyntaxCategory::Strings], vec![TextSpan::new(8, 11).unwrap()]);
    }

    #[test]
    fn test_end_without_begin_is_ignored() {
        let occurrences = [occ(DelimiterToken::BlockComment, DelimiterRole::End, 2, 4)];
        let found = resolve(&occurrences, TextSpan::new(0, 10).unwrap()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_empty_end_sorts_before_begin_at_same_position() {
        // Line comment ending at 5 and a quote starting at 5
        let occurrences = [
            occ(DelimiterToken::InlineComment, DelimiterRole::Begin, 0, 2),
            quote(5),
            occ(DelimiterToken::InlineComment, DelimiterRole::End, 5, 5),
            quote(7),
        ];
        let found = resolve(&occurrences, TextSpan::new(0, 10).unwrap()).unwrap();
        assert_eq!(found[&SyntaxCategory::Comments], vec![TextSpan::new(0, 5).unwrap()]);
        assert_eq!(found[&SyntaxCategory::Strings], vec![TextSpan::new(5, 8).unwrap()]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let occurrences = [quote(0), quote(2), quote(9)];
        let span = TextSpan::new(0, 12).unwrap();
        assert_eq!(resolve(&occurrences, span), resolve(&occurrences, span));
    }
}
