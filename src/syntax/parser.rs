//! Parse orchestration
//!
//! A [`ParseOperation`] performs one highlight pass over one span:
//!
//! ```text
//! extractor rules ──(worker pool, mpsc)──┐
//!                                        ├─ merge ─ sanitize ─ ParseResult
//! delimiter scan ─ resolve ──────────────┘
//! ```
//!
//! Extraction runs on a bounded pool of scoped threads. Workers send their
//! spans over a channel and the invoking thread is the only writer of the
//! accumulator. The comment/quote pass runs once, alongside the pool.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde::Serialize;

use super::definition::ParseDefinition;
use super::delimiter;
use super::extract::ExtractorRule;
use super::highlights::{HighlightRange, SyntaxCategory};
use super::progress::{CancellationToken, ProgressHandle, RunState};
use super::resolver;
use crate::error::{Error, Result};
use crate::span::{SpanSet, TextSpan};
use crate::text::TextSnapshot;

/// Raw, unsanitized per-category spans
pub type CategorySpans = BTreeMap<SyntaxCategory, Vec<TextSpan>>;

/// Final highlights of one run: sorted, non-overlapping spans per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParseResult {
    highlights: BTreeMap<SyntaxCategory, SpanSet>,
}

impl ParseResult {
    pub fn get(&self, category: SyntaxCategory) -> Option<&SpanSet> {
        self.highlights.get(&category)
    }

    /// Spans for `category`, empty if it has none
    pub fn spans(&self, category: SyntaxCategory) -> &[TextSpan] {
        self.get(category).map(SpanSet::spans).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (SyntaxCategory, &SpanSet)> {
        self.highlights.iter().map(|(c, s)| (*c, s))
    }

    pub fn categories(&self) -> impl Iterator<Item = SyntaxCategory> + '_ {
        self.highlights.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    /// All ranges ordered by position
    pub fn ranges(&self) -> Vec<HighlightRange> {
        let mut ranges: Vec<HighlightRange> = self
            .iter()
            .flat_map(|(category, set)| set.iter().map(move |s| HighlightRange::new(category, *s)))
            .collect();
        ranges.sort_by_key(|r| (r.span.start, r.span.end));
        ranges
    }

    /// Category claiming `pos`, if any
    pub fn category_at(&self, pos: usize) -> Option<SyntaxCategory> {
        self.iter()
            .find(|(_, set)| set.contains_position(pos))
            .map(|(category, _)| category)
    }
}

/// Whether a run finished its work or was cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    Completed,
    /// Cancelled; the result holds whatever was extracted before that
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub result: ParseResult,
    pub status: ParseStatus,
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == ParseStatus::Completed
    }
}

/// Resolve overlaps between categories
///
/// Walks categories from highest to lowest priority; each keeps only the
/// positions no higher-priority category has claimed.
pub fn sanitize(highlights: CategorySpans) -> ParseResult {
    let mut claimed = SpanSet::new();
    let mut sanitized = BTreeMap::new();

    for category in SyntaxCategory::by_descending_priority() {
        let Some(spans) = highlights.get(&category) else {
            continue;
        };
        let own = SpanSet::from_spans(spans.iter().copied()).subtract(&claimed);
        if own.is_empty() {
            continue;
        }
        claimed = claimed.union(&own);
        sanitized.insert(category, own);
    }

    ParseResult {
        highlights: sanitized,
    }
}

/// Number of hardware threads, or 1 if unknown
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

struct Job<'a> {
    category: SyntaxCategory,
    rule: &'a ExtractorRule,
    /// Share of one progress unit this job accounts for
    weight: f64,
}

/// One highlight pass over one span of one text snapshot
///
/// `run` consumes the operation, so a pass can never be re-entered.
#[derive(Debug)]
pub struct ParseOperation {
    definition: ParseDefinition,
    text: TextSnapshot,
    span: TextSpan,
    progress: ProgressHandle,
    worker_count: usize,
}

impl ParseOperation {
    pub fn new(
        definition: ParseDefinition,
        text: impl Into<TextSnapshot>,
        span: TextSpan,
    ) -> Result<Self> {
        let text = text.into();
        text.validate_span(span)?;

        // +1 for comments and quotes, +1 for sanitizing
        let units = definition.extractor_group_count() + 2;

        Ok(Self {
            definition,
            text,
            span,
            progress: ProgressHandle::new(units, CancellationToken::new()),
            worker_count: default_worker_count(),
        })
    }

    /// Use a host-owned cancellation token instead of a private one
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        let units = self.definition.extractor_group_count() + 2;
        self.progress = ProgressHandle::new(units, token);
        self
    }

    /// Size of the extractor pool (at least 1)
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers.max(1);
        self
    }

    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    pub fn span(&self) -> TextSpan {
        self.span
    }

    /// Run on a background thread
    pub fn spawn(self) -> JoinHandle<Result<ParseOutcome>> {
        thread::spawn(move || self.run())
    }

    /// Extract, merge and sanitize highlights, blocking until done
    pub fn run(self) -> Result<ParseOutcome> {
        let progress = self.progress.clone();
        progress.set_state(RunState::Running);

        match self.run_stages() {
            Ok(outcome) => {
                progress.set_state(match outcome.status {
                    ParseStatus::Completed => RunState::Completed,
                    ParseStatus::Cancelled => RunState::Cancelled,
                });
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Parse run aborted: {}", e);
                progress.set_state(RunState::Failed);
                Err(e)
            }
        }
    }

    fn run_stages(&self) -> Result<ParseOutcome> {
        let started = Instant::now();
        let token = self.progress.token().clone();

        let mut highlights = CategorySpans::new();
        let quoted = thread::scope(|scope| {
            let delimiter_pass = self
                .definition
                .has_delimiters()
                .then(|| scope.spawn(|| self.extract_comments_with_quotes()));

            let rules = self.extract_rules(&mut highlights);

            let quoted = match delimiter_pass {
                Some(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::Internal("comment pass panicked".into()))),
                None => {
                    self.progress.advance(1.0);
                    Ok(CategorySpans::new())
                }
            };
            rules.and(quoted)
        })?;

        tracing::debug!(
            "Extracted {} categories + {} quoted categories in {:?}",
            highlights.len(),
            quoted.len(),
            started.elapsed()
        );

        for (category, spans) in quoted {
            highlights.entry(category).or_default().extend(spans);
        }

        let result = sanitize(highlights);
        self.check_bounds(&result)?;

        let status = if token.is_cancelled() {
            tracing::debug!("Parse run cancelled after {:?}", started.elapsed());
            ParseStatus::Cancelled
        } else {
            self.progress.advance(1.0);
            self.progress.set_description("Applying colors to text");
            ParseStatus::Completed
        };

        Ok(ParseOutcome { result, status })
    }

    /// Fan every (category, rule) pair out to the worker pool
    fn extract_rules(&self, highlights: &mut CategorySpans) -> Result<()> {
        let jobs: Vec<Job<'_>> = self
            .definition
            .extractor_categories()
            .flat_map(|category| {
                let rules = self.definition.extractors(category);
                let weight = 1.0 / rules.len() as f64;
                rules.iter().map(move |rule| Job {
                    category,
                    rule,
                    weight,
                })
            })
            .collect();

        if jobs.is_empty() {
            return Ok(());
        }

        let workers = self.worker_count.min(jobs.len());
        let next_job = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(SyntaxCategory, Vec<TextSpan>)>();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let tx = tx.clone();
                    let jobs = &jobs;
                    let next_job = &next_job;
                    scope.spawn(move || self.work(jobs, next_job, tx))
                })
                .collect();
            drop(tx);

            for (category, spans) in rx {
                highlights.entry(category).or_default().extend(spans);
            }

            let panicked = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(Result::is_err)
                .count();
            if panicked > 0 {
                return Err(Error::Internal(format!(
                    "{} extractor worker(s) panicked",
                    panicked
                )));
            }
            Ok(())
        })
    }

    fn work(
        &self,
        jobs: &[Job<'_>],
        next_job: &AtomicUsize,
        tx: mpsc::Sender<(SyntaxCategory, Vec<TextSpan>)>,
    ) {
        let token = self.progress.token();

        loop {
            if token.is_cancelled() {
                break;
            }
            let Some(job) = jobs.get(next_job.fetch_add(1, Ordering::Relaxed)) else {
                break;
            };

            self.progress
                .set_description(format!("Extracting {}…", job.category.display_name()));
            let spans = job.rule.extract(&self.text, self.span, token);
            tracing::trace!(
                "{} rule for {} produced {} ranges",
                job.rule.kind(),
                job.category,
                spans.len()
            );

            if tx.send((job.category, spans)).is_err() {
                break;
            }
            self.progress.advance(job.weight);
        }
    }

    fn extract_comments_with_quotes(&self) -> Result<CategorySpans> {
        if self.progress.is_cancelled() {
            return Ok(CategorySpans::new());
        }

        self.progress
            .set_description("Extracting comments and quoted texts…");
        let occurrences = delimiter::scan(&self.definition, &self.text, self.span);
        let resolved = resolver::resolve(&occurrences, self.span)?;
        self.progress.advance(1.0);

        Ok(resolved)
    }

    fn check_bounds(&self, result: &ParseResult) -> Result<()> {
        for range in result.ranges() {
            if !self.span.contains(&range.span) {
                return Err(Error::Internal(format!(
                    "{} range {} escapes parse span {}",
                    range.category, range.span, self.span
                )));
            }
        }
        Ok(())
    }
}

/// Run one pass and return its outcome together with its progress handle
pub fn parse(
    definition: ParseDefinition,
    text: impl Into<TextSnapshot>,
    span: TextSpan,
) -> Result<(ParseOutcome, ProgressHandle)> {
    let operation = ParseOperation::new(definition, text, span)?;
    let progress = operation.progress();
    let outcome = operation.run()?;
    Ok((outcome, progress))
}
