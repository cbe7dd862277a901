//! YAML syntax definition files
//!
//! ```yaml
//! name: Rust
//! extensions: [rs]
//! comment:
//!   inline: "//"
//!   block: { begin: "/*", end: "*/" }
//! quotes:
//!   "\"": strings
//! highlights:
//!   keywords:
//!     - { begin: fn }
//!     - { begin: "\\b[A-Z_]+\\b", regex: true }
//!   strings:
//!     - { begin: 'r#"', end: '"#' }
//! ```
//!
//! Plain items without `end` are collected into one word rule per
//! case-sensitivity; regex items without `end` become pattern rules; items
//! with `end` become begin/end rules.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::definition::ParseDefinition;
use super::extract::ExtractorRule;
use super::highlights::SyntaxCategory;
use crate::error::{Error, Result};

/// Raw syntax file as written on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxFile {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub comment: CommentDelimiters,
    #[serde(default)]
    pub quotes: BTreeMap<String, SyntaxCategory>,
    #[serde(default)]
    pub highlights: BTreeMap<SyntaxCategory, Vec<HighlightItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentDelimiters {
    #[serde(default)]
    pub inline: Option<String>,
    #[serde(default)]
    pub block: Option<BlockItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockItem {
    pub begin: String,
    pub end: String,
}

/// One highlight entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightItem {
    pub begin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub ignore_case: bool,
}

impl SyntaxFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::invalid_definition(format!("YAML parse error: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_definition(format!(
                "Failed to read syntax file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// True if `ext` (without dot) is one of this syntax's extensions
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Compile into a validated [`ParseDefinition`]
    pub fn to_definition(&self) -> Result<ParseDefinition> {
        let mut builder = ParseDefinition::builder();

        for (&category, items) in &self.highlights {
            builder = builder.extractors(category, compile_items(category, items)?);
        }

        for (quote, &category) in &self.quotes {
            builder = builder.quote(quote.clone(), category);
        }

        if let Some(inline) = &self.comment.inline {
            builder = builder.inline_comment(inline.clone());
        }
        if let Some(block) = &self.comment.block {
            builder = builder.block_comment(block.begin.clone(), block.end.clone());
        }

        builder.build().map_err(|e| e.context(&self.name))
    }
}

fn compile_items(category: SyntaxCategory, items: &[HighlightItem]) -> Result<Vec<ExtractorRule>> {
    let mut rules = Vec::new();
    let mut words: Vec<&str> = Vec::new();
    let mut words_ignoring_case: Vec<&str> = Vec::new();

    for item in items {
        let rule = match (&item.end, item.regex) {
            (Some(end), regex) => {
                ExtractorRule::begin_end(&item.begin, end, regex, item.ignore_case)
            }
            (None, true) => ExtractorRule::pattern(&item.begin, item.ignore_case),
            (None, false) => {
                if item.ignore_case {
                    words_ignoring_case.push(&item.begin);
                } else {
                    words.push(&item.begin);
                }
                continue;
            }
        };
        rules.push(rule.map_err(|e| e.context(category))?);
    }

    for (list, ignore_case) in [(words, false), (words_ignoring_case, true)] {
        if !list.is_empty() {
            rules.push(ExtractorRule::words(list, ignore_case).map_err(|e| e.context(category))?);
        }
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
name: Sample
extensions: [smp, SAMPLE]
comment:
  inline: "#"
quotes:
  '"': strings
highlights:
  keywords:
    - { begin: if }
    - { begin: else }
    - { begin: END, ignore_case: true }
  numbers:
    - { begin: '\d+', regex: true }
  strings:
    - { begin: "<<", end: ">>" }
"##;

    #[test]
    fn test_parses_sample() {
        let file = SyntaxFile::from_yaml(SAMPLE).unwrap();
        assert_eq!(file.name, "Sample");
        assert!(file.matches_extension("sample"));
        assert_eq!(file.comment.inline.as_deref(), Some("#"));
        assert_eq!(file.quotes.get("\""), Some(&SyntaxCategory::Strings));
        assert_eq!(file.highlights[&SyntaxCategory::Keywords].len(), 3);
    }

    #[test]
    fn test_words_grouped_by_case() {
        let def = SyntaxFile::from_yaml(SAMPLE).unwrap().to_definition().unwrap();
        let keyword_rules = def.extractors(SyntaxCategory::Keywords);
        assert_eq!(keyword_rules.len(), 2);
        assert!(keyword_rules.iter().all(|r| r.kind() == "words"));
        assert_eq!(def.extractors(SyntaxCategory::Numbers)[0].kind(), "pattern");
        assert_eq!(def.extractors(SyntaxCategory::Strings)[0].kind(), "begin-end");
        assert_eq!(def.inline_comment(), Some("#"));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let yaml = "name: X\nhighlights:\n  colors:\n    - { begin: red }\n";
        assert!(matches!(
            SyntaxFile::from_yaml(yaml),
            Err(Error::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_bad_regex_names_category() {
        let yaml = "name: X\nhighlights:\n  numbers:\n    - { begin: '(', regex: true }\n";
        let err = SyntaxFile::from_yaml(yaml)
            .unwrap()
            .to_definition()
            .unwrap_err();
        assert!(err.to_string().contains("numbers"));
    }

    #[test]
    fn test_empty_inline_comment_rejected() {
        let yaml = "name: X\ncomment:\n  inline: ''\n";
        let file = SyntaxFile::from_yaml(yaml).unwrap();
        assert!(matches!(
            file.to_definition(),
            Err(Error::InvalidDefinition(_))
        ));
    }
}
