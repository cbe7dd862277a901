//! Syntax categories and highlight ranges
//!
//! Categories form a closed, ordered set. Declaration order is priority order:
//! a later category wins over an earlier one when both claim a position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::span::TextSpan;

/// Lexical category used to color a range of source text
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxCategory {
    Keywords,
    Commands,
    Types,
    Attributes,
    Variables,
    Values,
    Numbers,
    Strings,
    Characters,
    Comments,
}

impl SyntaxCategory {
    /// All categories, lowest priority first
    pub const ALL: [SyntaxCategory; 10] = [
        SyntaxCategory::Keywords,
        SyntaxCategory::Commands,
        SyntaxCategory::Types,
        SyntaxCategory::Attributes,
        SyntaxCategory::Variables,
        SyntaxCategory::Values,
        SyntaxCategory::Numbers,
        SyntaxCategory::Strings,
        SyntaxCategory::Characters,
        SyntaxCategory::Comments,
    ];

    /// Conflict-resolution priority (higher wins)
    pub fn priority(self) -> u8 {
        self as u8
    }

    /// Categories ordered from highest to lowest priority
    pub fn by_descending_priority() -> impl Iterator<Item = SyntaxCategory> {
        Self::ALL.into_iter().rev()
    }

    /// Identifier used in syntax files and JSON output
    pub fn name(self) -> &'static str {
        match self {
            SyntaxCategory::Keywords => "keywords",
            SyntaxCategory::Commands => "commands",
            SyntaxCategory::Types => "types",
            SyntaxCategory::Attributes => "attributes",
            SyntaxCategory::Variables => "variables",
            SyntaxCategory::Values => "values",
            SyntaxCategory::Numbers => "numbers",
            SyntaxCategory::Strings => "strings",
            SyntaxCategory::Characters => "characters",
            SyntaxCategory::Comments => "comments",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SyntaxCategory::Keywords => "Keywords",
            SyntaxCategory::Commands => "Commands",
            SyntaxCategory::Types => "Types",
            SyntaxCategory::Attributes => "Attributes",
            SyntaxCategory::Variables => "Variables",
            SyntaxCategory::Values => "Values",
            SyntaxCategory::Numbers => "Numbers",
            SyntaxCategory::Strings => "Strings",
            SyntaxCategory::Characters => "Characters",
            SyntaxCategory::Comments => "Comments",
        }
    }
}

impl fmt::Display for SyntaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyntaxCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown syntax category: {}", s))
    }
}

/// A category paired with the span it colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HighlightRange {
    pub category: SyntaxCategory,
    pub span: TextSpan,
}

impl HighlightRange {
    pub fn new(category: SyntaxCategory, span: TextSpan) -> Self {
        Self { category, span }
    }
}
