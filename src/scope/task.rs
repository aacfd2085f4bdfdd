//! Task identity, lifecycle state, and join handles.
//!
//! # Invariants
//! - A task's status moves `Pending -> {Completed | Failed | Cancelled}` and
//!   never leaves a terminal state.
//! - `TaskId` is unique within a process.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Unique identifier for a spawned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Create a new unique task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a task.
///
/// # State Machine
/// ```text
/// Pending -> Completed
///         \-> Failed
///         \-> Cancelled
/// ```
///
/// All three right-hand states are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Spawned but not yet finished
    Pending,
    /// Ran to completion and produced a value
    Completed,
    /// The work future raised a fault
    Failed { reason: String },
    /// Stopped at a suspension point after a cancellation request
    Cancelled,
}

impl TaskStatus {
    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// Shared status slot, written once by the task wrapper and read through the
/// handle.
#[derive(Debug, Clone)]
pub(crate) struct StatusCell(Arc<Mutex<TaskStatus>>);

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Mutex::new(TaskStatus::Pending)))
    }

    pub(crate) fn snapshot(&self) -> TaskStatus {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record a terminal state. A task that is already terminal keeps its
    /// first state.
    pub(crate) fn finish(&self, next: TaskStatus) {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if !slot.is_terminal() {
            *slot = next;
        }
    }
}

/// Terminal outcome a task wrapper reports to its handle.
#[derive(Debug)]
pub(crate) enum TaskOutcome<T, E> {
    Completed(T),
    Failed(E),
    Cancelled,
}

/// Error returned when joining a task or finishing a scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError<E> {
    /// The task, or a sibling in the same scope, raised a fault.
    #[error("task failed: {0}")]
    Failed(E),

    /// The task was cancelled before producing a value.
    #[error("task was cancelled")]
    Cancelled,
}

/// Handle to a task spawned in a [`Scope`](super::Scope).
///
/// Dropping the handle abandons the result; the owning scope still waits for
/// the task to reach a terminal state.
#[derive(Debug)]
pub struct TaskHandle<T, E> {
    id: TaskId,
    cancel: CancellationToken,
    status: StatusCell,
    outcome: oneshot::Receiver<TaskOutcome<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(
        id: TaskId,
        cancel: CancellationToken,
        status: StatusCell,
        outcome: oneshot::Receiver<TaskOutcome<T, E>>,
    ) -> Self {
        Self {
            id,
            cancel,
            status,
            outcome,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Snapshot of the task's current lifecycle state.
    pub fn status(&self) -> TaskStatus {
        self.status.snapshot()
    }

    /// Request cooperative cancellation.
    ///
    /// Never blocks and never fails; the task stops at its next suspension
    /// point. Cancelling an already-terminal task has no effect.
    pub fn cancel(&self) {
        tracing::debug!(task = %self.id, "cancellation requested");
        self.cancel.cancel();
    }

    /// Wait for the task to finish and take its value.
    pub async fn join(self) -> Result<T, TaskError<E>> {
        match self.outcome.await {
            Ok(TaskOutcome::Completed(value)) => Ok(value),
            Ok(TaskOutcome::Failed(fault)) => Err(TaskError::Failed(fault)),
            Ok(TaskOutcome::Cancelled) => Err(TaskError::Cancelled),
            // The wrapper was torn down without reporting.
            Err(_) => Err(TaskError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_the_only_non_terminal_state() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed {
            reason: "bad".to_string()
        }
        .is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_cell_keeps_its_first_terminal_state() {
        let cell = StatusCell::new();
        assert_eq!(cell.snapshot(), TaskStatus::Pending);
        cell.finish(TaskStatus::Cancelled);
        cell.finish(TaskStatus::Completed);
        assert_eq!(cell.snapshot(), TaskStatus::Cancelled);
    }

    #[test]
    fn task_ids_are_unique() {
        assert_ne!(TaskId::new(), TaskId::new());
    }
}
