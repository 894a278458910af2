//! Port for the long-running work performed during task processing.

use crate::task::domain::TaskId;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for task work operations.
pub type TaskWorkResult<T> = Result<T, TaskWorkError>;

/// Work executed between marking a task in progress and completing it.
#[async_trait]
pub trait TaskWork: Send + Sync {
    /// Performs the work for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkError`] when the work fails; the processor then
    /// reverts the task to pending.
    async fn perform(&self, task_id: TaskId) -> TaskWorkResult<()>;
}

/// Errors returned by task work adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskWorkError {
    /// The work for a task failed.
    #[error("work for task {task_id} failed: {reason}")]
    Failed {
        /// Task whose work failed.
        task_id: TaskId,
        /// Failure description.
        reason: String,
    },
}

impl TaskWorkError {
    /// Creates a failure for `task_id`.
    pub fn failed(task_id: TaskId, reason: impl Into<String>) -> Self {
        Self::Failed {
            task_id,
            reason: reason.into(),
        }
    }
}
