//! Range extractor rules
//!
//! Each rule finds every sub-range of a span matching one lexical rule.
//! Rules are compiled once when a [`ParseDefinition`](super::ParseDefinition)
//! is built and are then shared read-only between worker threads.

use regex::{Regex, RegexBuilder};

use super::progress::CancellationToken;
use crate::error::{Error, Result};
use crate::span::TextSpan;

/// A compiled extraction rule
#[derive(Debug, Clone)]
pub enum ExtractorRule {
    /// Fixed words matched on word boundaries
    Words(WordsRule),
    /// Every non-empty match of a regular expression
    Pattern(PatternRule),
    /// A begin marker paired with the next end marker
    BeginEnd(BeginEndRule),
}

impl ExtractorRule {
    pub fn words<I, S>(words: I, ignore_case: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WordsRule::new(words, ignore_case).map(Self::Words)
    }

    pub fn pattern(pattern: &str, ignore_case: bool) -> Result<Self> {
        PatternRule::new(pattern, ignore_case).map(Self::Pattern)
    }

    /// Begin/end pair; `regex` selects whether the markers are patterns or literals
    pub fn begin_end(begin: &str, end: &str, regex: bool, ignore_case: bool) -> Result<Self> {
        BeginEndRule::new(begin, end, regex, ignore_case).map(Self::BeginEnd)
    }

    /// Extract all ranges of `text` within `span` matching this rule
    ///
    /// Polls `cancel` once per match and returns what it has found so far
    /// when cancellation is requested.
    pub fn extract(&self, text: &str, span: TextSpan, cancel: &CancellationToken) -> Vec<TextSpan> {
        match self {
            ExtractorRule::Words(rule) => collect_matches(&rule.regex, text, span, cancel),
            ExtractorRule::Pattern(rule) => collect_matches(&rule.regex, text, span, cancel),
            ExtractorRule::BeginEnd(rule) => rule.extract(text, span, cancel),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractorRule::Words(_) => "words",
            ExtractorRule::Pattern(_) => "pattern",
            ExtractorRule::BeginEnd(_) => "begin-end",
        }
    }
}

/// Fixed word list, compiled to one alternation
#[derive(Debug, Clone)]
pub struct WordsRule {
    words: Vec<String>,
    regex: Regex,
}

impl WordsRule {
    pub fn new<I, S>(words: I, ignore_case: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(Error::invalid_definition("word list is empty"));
        }
        if words.iter().any(|w| w.is_empty()) {
            return Err(Error::invalid_definition("word list contains an empty word"));
        }

        // Longest first so the alternation prefers `foobar` over `foo`
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();

        let alternation = words
            .iter()
            .map(|w| word_pattern(w))
            .collect::<Vec<_>>()
            .join("|");
        let regex = build_regex(&format!("(?:{})", alternation), ignore_case)?;

        Ok(Self { words, regex })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Regular expression rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
}

impl PatternRule {
    pub fn new(pattern: &str, ignore_case: bool) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::invalid_definition("pattern is empty"));
        }
        Ok(Self {
            regex: build_regex(pattern, ignore_case)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Begin/end marker rule
#[derive(Debug, Clone)]
pub struct BeginEndRule {
    begin: Regex,
    end: Regex,
}

impl BeginEndRule {
    pub fn new(begin: &str, end: &str, regex: bool, ignore_case: bool) -> Result<Self> {
        if begin.is_empty() || end.is_empty() {
            return Err(Error::invalid_definition("begin/end marker is empty"));
        }
        let compile = |marker: &str| {
            if regex {
                build_regex(marker, ignore_case)
            } else {
                build_regex(&regex::escape(marker), ignore_case)
            }
        };
        Ok(Self {
            begin: compile(begin)?,
            end: compile(end)?,
        })
    }

    fn extract(&self, text: &str, span: TextSpan, cancel: &CancellationToken) -> Vec<TextSpan> {
        let haystack = &text[..span.end];
        let mut ranges = Vec::new();
        let mut pos = span.start;

        while pos <= span.end {
            if cancel.is_cancelled() {
                break;
            }
            let Some(begin) = find_non_empty(&self.begin, haystack, pos) else {
                break;
            };
            // An unclosed begin ends the rule; nothing after it can pair up
            let Some(end) = find_non_empty(&self.end, haystack, begin.end) else {
                break;
            };
            ranges.push(TextSpan {
                start: begin.start,
                end: end.end,
            });
            pos = end.end;
        }

        ranges
    }
}

/// Escaped word with `\b` on each edge that is a word character
///
/// `fn` becomes `\bfn\b`, `#include` becomes `#include\b`.
fn word_pattern(word: &str) -> String {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    let leading = word.chars().next().is_some_and(is_word_char);
    let trailing = word.chars().next_back().is_some_and(is_word_char);
    format!(
        "{}{}{}",
        if leading { r"\b" } else { "" },
        regex::escape(word),
        if trailing { r"\b" } else { "" }
    )
}

fn build_regex(pattern: &str, ignore_case: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .multi_line(true)
        .build()
        .map_err(|e| Error::invalid_definition(format!("bad pattern {:?}: {}", pattern, e)))
}

/// First non-empty match of `regex` in `haystack` at or after `pos`
fn find_non_empty(regex: &Regex, haystack: &str, mut pos: usize) -> Option<TextSpan> {
    while pos <= haystack.len() {
        let m = regex.find_at(haystack, pos)?;
        if !m.is_empty() {
            return Some(TextSpan {
                start: m.start(),
                end: m.end(),
            });
        }
        pos = next_char_boundary(haystack, m.end());
    }
    None
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(pos + 1, |c| pos + c.len_utf8())
}

/// Collect every non-empty match inside `span`
///
/// The haystack is cut at `span.end` but searching starts at `span.start` on
/// the full prefix, so assertions like `\b` see the text before the span.
fn collect_matches(
    regex: &Regex,
    text: &str,
    span: TextSpan,
    cancel: &CancellationToken,
) -> Vec<TextSpan> {
    let haystack = &text[..span.end];
    let mut ranges = Vec::new();
    let mut pos = span.start;

    while let Some(found) = find_non_empty(regex, haystack, pos) {
        if cancel.is_cancelled() {
            break;
        }
        ranges.push(found);
        pos = found.end;
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_all(rule: &ExtractorRule, text: &str) -> Vec<(usize, usize)> {
        let span = TextSpan::new(0, text.len()).unwrap();
        rule.extract(text, span, &CancellationToken::new())
            .into_iter()
            .map(|s| (s.start, s.end))
            .collect()
    }

    #[test]
    fn test_words_match_on_boundaries() {
        let rule = ExtractorRule::words(["let", "fn"], false).unwrap();
        let text = "let letter = fn_x; fn";
        assert_eq!(extract_all(&rule, text), vec![(0, 3), (19, 21)]);
    }

    #[test]
    fn test_words_with_symbol_edges() {
        let rule = ExtractorRule::words(["@media", "#include", "end;"], false).unwrap();
        let text = "#include <x>\n@media screen\nend; ending;";
        assert_eq!(extract_all(&rule, text), vec![(0, 8), (13, 19), (27, 31)]);
    }

    #[test]
    fn test_words_prefer_longest() {
        let rule = ExtractorRule::words(["in", "int"], false).unwrap();
        assert_eq!(extract_all(&rule, "int in"), vec![(0, 3), (4, 6)]);
    }

    #[test]
    fn test_words_ignore_case() {
        let rule = ExtractorRule::words(["select"], true).unwrap();
        assert_eq!(extract_all(&rule, "SELECT Select"), vec![(0, 6), (7, 13)]);
    }

    #[test]
    fn test_empty_words_rejected() {
        assert!(matches!(
            ExtractorRule::words(Vec::<String>::new(), false),
            Err(Error::InvalidDefinition(_))
        ));
        assert!(ExtractorRule::words([""], false).is_err());
    }

    #[test]
    fn test_pattern_skips_empty_matches() {
        let rule = ExtractorRule::pattern(r"\d*", false).unwrap();
        assert_eq!(extract_all(&rule, "a12b3"), vec![(1, 3), (4, 5)]);
    }

    #[test]
    fn test_bad_pattern_rejected() {
        assert!(matches!(
            ExtractorRule::pattern("(unclosed", false),
            Err(Error::InvalidDefinition(_))
        ));
        assert!(ExtractorRule::pattern("", false).is_err());
    }

    #[test]
    fn test_pattern_respects_span_and_context() {
        let rule = ExtractorRule::words(["foo"], false).unwrap();
        let text = "xfoo foo foo";
        // Span starts inside "xfoo": the \b before "foo" must see the 'x'
        let span = TextSpan::new(1, 8).unwrap();
        let found = rule.extract(text, span, &CancellationToken::new());
        assert_eq!(found, vec![TextSpan::new(5, 8).unwrap()]);
    }

    #[test]
    fn test_begin_end_literal_pairs() {
        let rule = ExtractorRule::begin_end("<<", ">>", false, false).unwrap();
        assert_eq!(
            extract_all(&rule, "a <<b>> c <<d>> <<e"),
            vec![(2, 7), (10, 15)]
        );
    }

    #[test]
    fn test_begin_end_regex() {
        let rule = ExtractorRule::begin_end(r##"r#*""##, r##""#*"##, true, false).unwrap();
        assert_eq!(extract_all(&rule, r###"x r#"hi"# y"###), vec![(2, 9)]);
    }

    #[test]
    fn test_cancelled_extract_returns_partial() {
        let rule = ExtractorRule::pattern(r"a", false).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let span = TextSpan::new(0, 3).unwrap();
        assert!(rule.extract("aaa", span, &token).is_empty());
    }
}
