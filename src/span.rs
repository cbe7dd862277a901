//! Text spans and ordered span sets
//!
//! Positions are UTF-8 byte offsets into a [`TextSnapshot`](crate::text::TextSnapshot).
//! Spans are half-open: `[start, end)`.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open range of byte positions `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    /// Create a span, or `None` if `start > end`
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Empty span at `pos`
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely within this span
    pub fn contains(&self, other: &TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the two spans share at least one position
    pub fn intersects(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextSpan {
    /// Inverted ranges collapse to an empty span at `range.start`
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// An ordered set of non-overlapping, non-adjacent, non-empty spans
///
/// Every mutation keeps the spans sorted by position and merged into maximal
/// contiguous runs, so two sets covering the same positions compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpanSet {
    spans: Vec<TextSpan>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary (possibly overlapping, unsorted) spans
    pub fn from_spans<I>(spans: I) -> Self
    where
        I: IntoIterator<Item = TextSpan>,
    {
        let mut sorted: Vec<TextSpan> = spans.into_iter().filter(|s| !s.is_empty()).collect();
        sorted.sort_unstable();

        let mut merged: Vec<TextSpan> = Vec::with_capacity(sorted.len());
        for span in sorted {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }

        Self { spans: merged }
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextSpan> {
        self.spans.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of maximal spans in the set
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Total number of positions covered
    pub fn covered_len(&self) -> usize {
        self.spans.iter().map(TextSpan::len).sum()
    }

    /// True if `pos` is covered by the set
    pub fn contains_position(&self, pos: usize) -> bool {
        let idx = self.spans.partition_point(|s| s.end <= pos);
        self.spans.get(idx).is_some_and(|s| s.start <= pos)
    }

    /// Positions in `self` that are not in `other`
    pub fn subtract(&self, other: &SpanSet) -> SpanSet {
        let mut result = Vec::with_capacity(self.spans.len());
        let mut holes = other.spans.iter().peekable();

        for span in &self.spans {
            let mut cursor = span.start;

            // Skip holes that end before this span starts
            while holes.peek().is_some_and(|h| h.end <= cursor) {
                holes.next();
            }

            let mut pending = holes.clone();
            while let Some(hole) = pending.peek() {
                if hole.start >= span.end {
                    break;
                }
                if hole.start > cursor {
                    result.push(TextSpan {
                        start: cursor,
                        end: hole.start,
                    });
                }
                cursor = cursor.max(hole.end);
                if hole.end >= span.end {
                    break;
                }
                pending.next();
            }

            if cursor < span.end {
                result.push(TextSpan {
                    start: cursor,
                    end: span.end,
                });
            }
        }

        SpanSet { spans: result }
    }

    /// Positions covered by either set
    pub fn union(&self, other: &SpanSet) -> SpanSet {
        SpanSet::from_spans(self.spans.iter().chain(other.spans.iter()).copied())
    }
}

impl<'a> IntoIterator for &'a SpanSet {
    type Item = &'a TextSpan;
    type IntoIter = std::slice::Iter<'a, TextSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
