//! Property tests for span algebra and highlight runs

mod common;

use common::{c_like, run_full};
use parsehl::span::{SpanSet, TextSpan};
use parsehl::syntax::{delimiter, parse, resolver, sanitize, CategorySpans};
use parsehl::text::TextSnapshot;
use proptest::prelude::*;

/// ASCII source fragments heavy on delimiters and escapes
fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "a", "int", " ", "\n", "\"", "'", "\\", "//", "/*", "*/", "42", "if", "x1",
        ]),
        0..60,
    )
    .prop_map(|parts| parts.concat())
}

fn source_with_span() -> impl Strategy<Value = (String, TextSpan)> {
    source().prop_flat_map(|text| {
        let len = text.len();
        (Just(text), 0..=len, 0..=len).prop_map(|(text, a, b)| {
            let span = TextSpan::new(a.min(b), a.max(b)).unwrap();
            (text, span)
        })
    })
}

fn span_list() -> impl Strategy<Value = Vec<TextSpan>> {
    prop::collection::vec((0usize..100, 0usize..20), 0..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(start, len)| TextSpan::new(start, start + len).unwrap())
            .collect()
    })
}

fn covered(set: &SpanSet, pos: usize) -> bool {
    set.contains_position(pos)
}

proptest! {
    #[test]
    fn prop_results_stay_in_span_and_never_overlap((text, span) in source_with_span()) {
        let (outcome, _) = parse(c_like(), text.as_str(), span).unwrap();
        let ranges = outcome.result.ranges();

        for range in &ranges {
            prop_assert!(span.contains(&range.span));
            prop_assert!(!range.span.is_empty());
        }
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].span.end <= pair[1].span.start);
        }
    }

    #[test]
    fn prop_worker_count_is_irrelevant(text in source()) {
        let sequential = run_full(&c_like(), &text, 1);
        let concurrent = run_full(&c_like(), &text, 4);
        prop_assert_eq!(sequential, concurrent);
    }

    #[test]
    fn prop_sanitize_is_idempotent(text in source()) {
        let outcome = run_full(&c_like(), &text, 2);
        let again: CategorySpans = outcome
            .result
            .iter()
            .map(|(category, set)| (category, set.spans().to_vec()))
            .collect();
        prop_assert_eq!(sanitize(again), outcome.result);
    }

    #[test]
    fn prop_resolved_delimiters_stay_in_span((text, span) in source_with_span()) {
        let snapshot = TextSnapshot::from(text.as_str());
        let occurrences = delimiter::scan(&c_like(), &snapshot, span);
        let resolved = resolver::resolve(&occurrences, span).unwrap();

        for spans in resolved.values() {
            for s in spans {
                prop_assert!(span.contains(s));
            }
        }
    }

    #[test]
    fn prop_span_set_algebra(a in span_list(), b in span_list()) {
        let a = SpanSet::from_spans(a);
        let b = SpanSet::from_spans(b);
        let diff = a.subtract(&b);
        let union = a.union(&b);

        for pos in 0..130 {
            prop_assert_eq!(covered(&diff, pos), covered(&a, pos) && !covered(&b, pos));
            prop_assert_eq!(covered(&union, pos), covered(&a, pos) || covered(&b, pos));
        }
        for pair in union.spans().windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
    }
}
