//! Lifecycle of a single reprojection: progress reporting, terminal
//! transitions, and abort requests.
//!
//! An [`Operation`] is owned by whoever drives the work. Any number of
//! [`AbortHandle`]s can be handed out to request cancellation from elsewhere.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{OperationError, ReprojectError};
use crate::logger;
use crate::reproject::CancelToken;

/// Operation states. Every state but `InProgress` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Completed,
    Failed,
    Aborted,
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        *self != OperationState::InProgress
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Receives progress and the final outcome of an operation.
pub trait ProgressSink: Send {
    /// Called with a fraction in [0, 1] that never decreases.
    fn update_progress(&mut self, fraction: f64);

    /// Called exactly once, when the operation reaches a terminal state.
    fn finished(&mut self, state: OperationState);
}

/// A sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update_progress(&mut self, _fraction: f64) {}

    fn finished(&mut self, _state: OperationState) {}
}

#[derive(Debug)]
struct Status {
    state: OperationState,
    progress: f64,
}

fn lock(status: &Mutex<Status>) -> MutexGuard<'_, Status> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A single in-flight (or finished) reprojection.
pub struct Operation {
    label: String,
    status: Arc<Mutex<Status>>,
    token: CancelToken,
    sink: Box<dyn ProgressSink>,
    error: Option<ReprojectError>,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("label", &self.label)
            .field("state", &self.state())
            .field("progress", &self.progress())
            .field("error", &self.error)
            .finish()
    }
}

impl Operation {
    /// Create an operation in the `InProgress` state.
    pub fn new(label: impl Into<String>, sink: Box<dyn ProgressSink>) -> Self {
        let label = label.into();
        logger::debug(&format!("Operation '{}' started", label));
        Self {
            label,
            status: Arc::new(Mutex::new(Status {
                state: OperationState::InProgress,
                progress: 0.0,
            })),
            token: CancelToken::new(),
            sink,
            error: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> OperationState {
        lock(&self.status).state
    }

    pub fn progress(&self) -> f64 {
        lock(&self.status).progress
    }

    /// The error that failed this operation, if any.
    pub fn error(&self) -> Option<&ReprojectError> {
        self.error.as_ref()
    }

    /// The cancellation flag that abort requests set.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            status: Arc::clone(&self.status),
            token: self.token.clone(),
        }
    }

    /// Report progress. Values below the current progress are ignored.
    ///
    /// # Panics
    /// Panics if the operation is not in progress.
    pub fn update_progress(&mut self, fraction: f64) {
        let fraction = {
            let mut status = lock(&self.status);
            assert_in_progress(status.state, "update progress of");
            status.progress = status.progress.max(fraction.clamp(0.0, 1.0));
            status.progress
        };
        self.sink.update_progress(fraction);
    }

    /// # Panics
    /// Panics if the operation is not in progress.
    pub fn complete(&mut self) {
        self.finish(OperationState::Completed);
    }

    /// Mark the operation failed and keep `err` for display.
    ///
    /// # Panics
    /// Panics if the operation is not in progress.
    pub fn fail(&mut self, err: ReprojectError) {
        logger::debug(&format!("Operation '{}' failed: {}", self.label, err));
        self.finish(OperationState::Failed);
        self.error = Some(err);
    }

    /// Acknowledge a requested abort once the work has stopped.
    ///
    /// # Panics
    /// Panics if the operation is not in progress.
    pub fn abort_finished(&mut self) {
        self.finish(OperationState::Aborted);
    }

    fn finish(&mut self, state: OperationState) {
        {
            let mut status = lock(&self.status);
            assert_in_progress(status.state, "finish");
            status.state = state;
        }
        logger::debug(&format!("Operation '{}' {}", self.label, state));
        self.sink.finished(state);
    }
}

fn assert_in_progress(state: OperationState, action: &str) {
    if state != OperationState::InProgress {
        panic!("cannot {action} an operation that is {state}");
    }
}

/// Requests cancellation of an operation from outside its driver.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    status: Arc<Mutex<Status>>,
    token: CancelToken,
}

impl AbortHandle {
    /// Request that the operation stop. The driver notices at its next pixel
    /// and moves the operation to `Aborted`.
    ///
    /// Fails with [`OperationError::NotInProgress`] if the operation already
    /// reached a terminal state.
    pub fn abort(&self) -> Result<(), OperationError> {
        let status = lock(&self.status);
        if status.state.is_terminal() {
            return Err(OperationError::NotInProgress(status.state.to_string()));
        }
        self.token.cancel();
        Ok(())
    }

    pub fn state(&self) -> OperationState {
        lock(&self.status).state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state() == OperationState::InProgress
    }
}
