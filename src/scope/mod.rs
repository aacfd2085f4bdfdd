//! Scoped task spawning with structured completion.
//!
//! A [`Scope`] owns every task spawned through it and does not hand control
//! back to its caller until all of them have reached a terminal state. A
//! fault in any owned task cancels the remaining siblings and surfaces to
//! whatever awaits the scope; an explicit [`TaskHandle::cancel`] only stops
//! the one task it targets.

mod task;

pub use task::{TaskError, TaskHandle, TaskId, TaskStatus};

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use task::{StatusCell, TaskOutcome};

/// State shared between a scope and its task wrappers.
#[derive(Debug)]
struct ScopeShared<E> {
    cancel: CancellationToken,
    first_fault: Mutex<Option<E>>,
}

impl<E> ScopeShared<E> {
    /// Record the first fault raised inside the scope and stop the siblings.
    fn record_fault(&self, fault: E) {
        let mut slot = self
            .first_fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(fault);
        }
        drop(slot);
        // Siblings observe this at their next suspension point.
        self.cancel.cancel();
    }

    fn take_fault(&self) -> Option<E> {
        self.first_fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// A structured-concurrency boundary that owns the tasks spawned through it.
pub struct Scope<E> {
    shared: Arc<ScopeShared<E>>,
    children: Vec<JoinHandle<()>>,
}

impl<E> Scope<E> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ScopeShared {
                cancel: CancellationToken::new(),
                first_fault: Mutex::new(None),
            }),
            children: Vec::new(),
        }
    }

    /// Spawn a child task owned by this scope.
    ///
    /// The task runs until its work finishes, it is cancelled through its
    /// handle, or a sibling fault cancels the whole scope.
    pub fn spawn<T, F>(&mut self, work: F) -> TaskHandle<T, E>
    where
        T: Send + 'static,
        E: Clone + std::fmt::Display + Send + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let id = TaskId::new();
        let cancel = self.shared.cancel.child_token();
        let status = StatusCell::new();
        let (report, receiver) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        let wrapper = {
            let cancel = cancel.clone();
            let status = status.clone();
            async move {
                debug!(task = %id, "task started");
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => TaskOutcome::Cancelled,
                    result = work => match result {
                        Ok(value) => TaskOutcome::Completed(value),
                        Err(fault) => TaskOutcome::Failed(fault),
                    },
                };
                match &outcome {
                    TaskOutcome::Completed(_) => {
                        status.finish(TaskStatus::Completed);
                        debug!(task = %id, "task completed");
                    }
                    TaskOutcome::Failed(fault) => {
                        status.finish(TaskStatus::Failed {
                            reason: fault.to_string(),
                        });
                        debug!(task = %id, %fault, "task failed");
                        shared.record_fault(fault.clone());
                    }
                    TaskOutcome::Cancelled => {
                        status.finish(TaskStatus::Cancelled);
                        debug!(task = %id, "task cancelled");
                    }
                }
                // The handle may have been dropped without joining.
                let _ = report.send(outcome);
            }
        };
        self.children.push(tokio::spawn(wrapper));
        TaskHandle::new(id, cancel, status, receiver)
    }

    /// Run `body` to completion, then wait for every owned task to reach a
    /// terminal state before returning.
    ///
    /// The first fault raised inside the scope wins: it cancels the remaining
    /// siblings and is returned to the awaiter, even when `body` only
    /// observed a sibling's cancellation or never joined the failing task at
    /// all. A bare cancellation with no recorded fault stays
    /// [`TaskError::Cancelled`].
    pub async fn complete<R, B>(mut self, body: B) -> Result<R, TaskError<E>>
    where
        B: Future<Output = Result<R, TaskError<E>>>,
    {
        let result = body.await;
        if result.is_err() {
            // The body gave up; release any still-pending siblings.
            self.shared.cancel.cancel();
        }
        for child in join_all(self.children.drain(..)).await {
            if let Err(err) = child {
                warn!(error = %err, "scope child aborted");
            }
        }
        match (result, self.shared.take_fault()) {
            (Ok(value), None) => Ok(value),
            (_, Some(fault)) => Err(TaskError::Failed(fault)),
            (Err(error), None) => Err(error),
        }
    }

    /// Wait for every owned task to finish. Shorthand for fire-and-forget
    /// scopes with no result to combine.
    pub async fn join(self) -> Result<(), TaskError<E>> {
        self.complete(std::future::ready(Ok(()))).await
    }
}

impl<E> Default for Scope<E> {
    fn default() -> Self {
        Self::new()
    }
}
