//! Parse definitions
//!
//! A [`ParseDefinition`] says which rules extract which category, which
//! quote literals delimit strings, and which literals delimit comments.
//! It is validated once on construction and can then be reused by any
//! number of runs, concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::extract::ExtractorRule;
use super::highlights::SyntaxCategory;
use crate::error::{Error, Result};

/// Begin/end literals of a block comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDelimiters {
    pub begin: String,
    pub end: String,
}

#[derive(Debug)]
struct DefinitionData {
    extractors: BTreeMap<SyntaxCategory, Vec<ExtractorRule>>,
    quotes: BTreeMap<String, SyntaxCategory>,
    inline_comment: Option<String>,
    block_comment: Option<BlockDelimiters>,
}

/// Validated, immutable description of how to highlight one syntax
#[derive(Debug, Clone)]
pub struct ParseDefinition {
    data: Arc<DefinitionData>,
}

impl ParseDefinition {
    pub fn builder() -> ParseDefinitionBuilder {
        ParseDefinitionBuilder::default()
    }

    /// Rules configured for `category` (empty if none)
    pub fn extractors(&self, category: SyntaxCategory) -> &[ExtractorRule] {
        self.data
            .extractors
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories with at least one rule, lowest priority first
    pub fn extractor_categories(&self) -> impl Iterator<Item = SyntaxCategory> + '_ {
        self.data.extractors.keys().copied()
    }

    /// Number of categories with at least one rule
    pub fn extractor_group_count(&self) -> usize {
        self.data.extractors.len()
    }

    /// Quote literal → category it delimits
    pub fn quotes(&self) -> &BTreeMap<String, SyntaxCategory> {
        &self.data.quotes
    }

    pub fn inline_comment(&self) -> Option<&str> {
        self.data.inline_comment.as_deref()
    }

    pub fn block_comment(&self) -> Option<&BlockDelimiters> {
        self.data.block_comment.as_ref()
    }

    /// True if the definition has any comment or quote delimiter
    pub fn has_delimiters(&self) -> bool {
        !self.data.quotes.is_empty()
            || self.data.inline_comment.is_some()
            || self.data.block_comment.is_some()
    }
}

/// Builder that validates everything eagerly in [`build`](Self::build)
#[derive(Debug, Default)]
pub struct ParseDefinitionBuilder {
    extractors: BTreeMap<SyntaxCategory, Vec<ExtractorRule>>,
    quotes: Vec<(String, SyntaxCategory)>,
    inline_comment: Option<String>,
    block_comment: Option<BlockDelimiters>,
}

impl ParseDefinitionBuilder {
    pub fn extractor(mut self, category: SyntaxCategory, rule: ExtractorRule) -> Self {
        self.extractors.entry(category).or_default().push(rule);
        self
    }

    pub fn extractors<I>(mut self, category: SyntaxCategory, rules: I) -> Self
    where
        I: IntoIterator<Item = ExtractorRule>,
    {
        self.extractors.entry(category).or_default().extend(rules);
        self
    }

    pub fn quote(mut self, literal: impl Into<String>, category: SyntaxCategory) -> Self {
        self.quotes.push((literal.into(), category));
        self
    }

    pub fn inline_comment(mut self, literal: impl Into<String>) -> Self {
        self.inline_comment = Some(literal.into());
        self
    }

    pub fn block_comment(mut self, begin: impl Into<String>, end: impl Into<String>) -> Self {
        self.block_comment = Some(BlockDelimiters {
            begin: begin.into(),
            end: end.into(),
        });
        self
    }

    pub fn build(self) -> Result<ParseDefinition> {
        let mut quotes = BTreeMap::new();
        for (literal, category) in self.quotes {
            if literal.is_empty() {
                return Err(Error::invalid_definition("quote literal is empty"));
            }
            if quotes.insert(literal.clone(), category).is_some() {
                return Err(Error::invalid_definition(format!(
                    "quote {:?} is defined more than once",
                    literal
                )));
            }
        }

        if self.inline_comment.as_deref() == Some("") {
            return Err(Error::invalid_definition("inline comment delimiter is empty"));
        }

        if let Some(block) = &self.block_comment {
            if block.begin.is_empty() || block.end.is_empty() {
                return Err(Error::invalid_definition("block comment delimiter is empty"));
            }
        }

        let extractors = self
            .extractors
            .into_iter()
            .filter(|(_, rules)| !rules.is_empty())
            .collect();

        Ok(ParseDefinition {
            data: Arc::new(DefinitionData {
                extractors,
                quotes,
                inline_comment: self.inline_comment,
                block_comment: self.block_comment,
            }),
        })
    }
}
