//! Cancellation and progress reporting for parse runs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Shared cooperative cancellation flag
///
/// Clones observe the same flag. Extractors poll it; nothing is forcibly stopped.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Lifecycle of one parse operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    /// Aborted on an internal invariant violation
    Failed,
}

impl RunState {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }
}

/// Point-in-time view of a run's progress
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: f64,
    pub total: f64,
    pub state: RunState,
    pub description: String,
}

impl ProgressSnapshot {
    pub fn fraction(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.completed / self.total).clamp(0.0, 1.0)
    }
}

type Observer = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

struct ProgressInner {
    completed: f64,
    total: f64,
    state: RunState,
    description: String,
}

struct Shared {
    inner: Mutex<ProgressInner>,
    finished: Condvar,
    observers: Mutex<Vec<Observer>>,
    token: CancellationToken,
}

/// Handle for observing and cancelling a parse run
///
/// Cheap to clone; all clones refer to the same run.
#[derive(Clone)]
pub struct ProgressHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ProgressHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("ProgressHandle")
            .field("completed", &snapshot.completed)
            .field("total", &snapshot.total)
            .field("state", &snapshot.state)
            .finish()
    }
}

impl ProgressHandle {
    pub(crate) fn new(total_units: usize, token: CancellationToken) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(ProgressInner {
                    completed: 0.0,
                    total: total_units as f64,
                    state: RunState::Idle,
                    description: String::new(),
                }),
                finished: Condvar::new(),
                observers: Mutex::new(Vec::new()),
                token,
            }),
        }
    }

    /// Fraction of work done, in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        self.snapshot().fraction()
    }

    pub fn state(&self) -> RunState {
        self.lock().state
    }

    pub fn description(&self) -> String {
        self.lock().description.clone()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let inner = self.lock();
        ProgressSnapshot {
            completed: inner.completed,
            total: inner.total,
            state: inner.state,
            description: inner.description.clone(),
        }
    }

    /// Request cancellation of the run
    pub fn cancel(&self) {
        self.shared.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    /// The token shared with every extractor of this run
    pub fn token(&self) -> &CancellationToken {
        &self.shared.token
    }

    /// Register a callback invoked on every progress change
    ///
    /// Callbacks run synchronously on whichever thread reports the change,
    /// outside of any internal lock, so a callback may query the handle or
    /// register further callbacks.
    pub fn on_update<F>(&self, callback: F)
    where
        F: Fn(&ProgressSnapshot) + Send + Sync + 'static,
    {
        self.shared
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(callback));
    }

    /// Block until the run reaches `Completed` or `Cancelled`
    pub fn wait(&self) -> RunState {
        let mut inner = self.lock();
        while !inner.state.is_finished() {
            inner = self
                .shared
                .finished
                .wait(inner)
                .unwrap_or_else(|e| e.into_inner());
        }
        inner.state
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> Option<RunState> {
        let inner = self.lock();
        let (inner, _) = self
            .shared
            .finished
            .wait_timeout_while(inner, timeout, |i| !i.state.is_finished())
            .unwrap_or_else(|e| e.into_inner());
        inner.state.is_finished().then_some(inner.state)
    }

    pub(crate) fn set_state(&self, state: RunState) {
        self.update(|inner| inner.state = state);
        if state.is_finished() {
            self.shared.finished.notify_all();
        }
    }

    pub(crate) fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.update(|inner| inner.description = description);
    }

    pub(crate) fn advance(&self, units: f64) {
        self.update(|inner| inner.completed = (inner.completed + units).min(inner.total));
    }

    fn update(&self, f: impl FnOnce(&mut ProgressInner)) {
        let snapshot = {
            let mut inner = self.lock();
            f(&mut inner);
            ProgressSnapshot {
                completed: inner.completed,
                total: inner.total,
                state: inner.state,
                description: inner.description.clone(),
            }
        };

        let observers: Vec<Observer> = self
            .shared
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in &observers {
            observer(&snapshot);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressInner> {
        self.shared.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
