//! Host-side highlight scheduling
//!
//! Runs one parse at a time per document on a background thread. A new
//! request (after an edit) cancels the stale run, and results are tagged
//! with the document revision they were computed for so late arrivals can
//! be dropped.
//!
//! ```text
//! edit → request(rev) → (debounce) → ParseOperation::run
//!      → HighlightMsg::ParseCompleted { rev } → accept() → ParseResult
//! ```

use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::error::Error;
use crate::span::TextSpan;
use crate::syntax::{CancellationToken, ParseDefinition, ParseOperation, ParseOutcome, ParseResult};
use crate::text::TextSnapshot;

/// Debounce granularity while waiting to start a run
const DEBOUNCE_POLL: Duration = Duration::from_millis(5);

/// Messages posted back to the host
#[derive(Debug)]
pub enum HighlightMsg {
    ParseCompleted { revision: u64, outcome: ParseOutcome },
    ParseFailed { revision: u64, error: Error },
}

impl HighlightMsg {
    pub fn revision(&self) -> u64 {
        match self {
            HighlightMsg::ParseCompleted { revision, .. } => *revision,
            HighlightMsg::ParseFailed { revision, .. } => *revision,
        }
    }
}

struct InFlight {
    revision: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Schedules background parses for one document
pub struct HighlightScheduler {
    definition: ParseDefinition,
    tx: Sender<HighlightMsg>,
    debounce: Duration,
    worker_count: usize,
    latest_revision: Option<u64>,
    in_flight: Option<InFlight>,
}

impl HighlightScheduler {
    pub fn new(definition: ParseDefinition, tx: Sender<HighlightMsg>) -> Self {
        Self {
            definition,
            tx,
            debounce: Duration::ZERO,
            worker_count: crate::syntax::default_worker_count(),
            latest_revision: None,
            in_flight: None,
        }
    }

    /// Scheduler using the configured debounce delay and pool size
    pub fn from_config(
        definition: ParseDefinition,
        tx: Sender<HighlightMsg>,
        config: &EngineConfig,
    ) -> Self {
        Self::new(definition, tx)
            .with_debounce(Duration::from_millis(config.debounce_ms))
            .with_worker_count(config.effective_worker_count())
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers.max(1);
        self
    }

    /// Swap the definition (e.g. the document's syntax changed)
    ///
    /// The in-flight run is cancelled; the host should request a new parse.
    pub fn set_definition(&mut self, definition: ParseDefinition) {
        self.cancel();
        self.definition = definition;
    }

    pub fn latest_revision(&self) -> Option<u64> {
        self.latest_revision
    }

    /// True while a run has been spawned and has not finished
    pub fn is_running(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Start a parse of `span` for `revision`, cancelling any stale run
    ///
    /// Span errors are reported immediately; nothing is spawned for them.
    pub fn request(
        &mut self,
        revision: u64,
        text: impl Into<TextSnapshot>,
        span: TextSpan,
    ) -> Result<(), Error> {
        if let Some(stale) = self.in_flight.take() {
            tracing::debug!(
                "Cancelling stale parse for revision {} (new revision {})",
                stale.revision,
                revision
            );
            stale.token.cancel();
        }

        let token = CancellationToken::new();
        let operation = ParseOperation::new(self.definition.clone(), text, span)?
            .with_cancellation(token.clone())
            .with_worker_count(self.worker_count);

        self.latest_revision = Some(revision);

        let tx = self.tx.clone();
        let debounce = self.debounce;
        let run_token = token.clone();
        let handle = std::thread::spawn(move || {
            let deadline = Instant::now() + debounce;
            while Instant::now() < deadline {
                if run_token.is_cancelled() {
                    tracing::debug!("Parse for revision {} cancelled during debounce", revision);
                    return;
                }
                std::thread::sleep(DEBOUNCE_POLL.min(deadline.saturating_duration_since(Instant::now())));
            }

            let msg = match operation.run() {
                Ok(outcome) => HighlightMsg::ParseCompleted { revision, outcome },
                Err(error) => HighlightMsg::ParseFailed { revision, error },
            };
            let _ = tx.send(msg);
        });

        self.in_flight = Some(InFlight {
            revision,
            token,
            handle,
        });
        Ok(())
    }

    /// Cancel the in-flight run, if any
    pub fn cancel(&mut self) {
        if let Some(run) = self.in_flight.take() {
            run.token.cancel();
        }
    }

    /// Keep a message's result only if it is current and complete
    pub fn accept(&mut self, msg: HighlightMsg) -> Option<ParseResult> {
        if Some(msg.revision()) != self.latest_revision {
            tracing::debug!(
                "Discarding stale parse results: revision {} != latest {:?}",
                msg.revision(),
                self.latest_revision
            );
            return None;
        }

        match msg {
            HighlightMsg::ParseCompleted { outcome, .. } if outcome.is_complete() => {
                self.in_flight = None;
                Some(outcome.result)
            }
            HighlightMsg::ParseCompleted { revision, .. } => {
                tracing::debug!("Discarding cancelled parse for revision {}", revision);
                None
            }
            HighlightMsg::ParseFailed { revision, error } => {
                tracing::warn!("Parse for revision {} failed: {}", revision, error);
                self.in_flight = None;
                None
            }
        }
    }
}

impl Drop for HighlightScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
