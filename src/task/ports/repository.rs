//! Repository port for task persistence and lookup.

use crate::task::domain::{Task, TaskFilter, TaskId, TaskListing, TaskPatch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations must accept concurrent callers. Each method is a single
/// atomic persistence operation: a task row and the log entries written with
/// it are either both durable or neither is.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its log entries.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task, including its log, by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks matching `filter`, newest first, skipping `offset`
    /// matches and returning at most `limit`.
    ///
    /// The listing total counts every match, independent of the window.
    async fn list(
        &self,
        filter: &TaskFilter,
        offset: u64,
        limit: u64,
    ) -> TaskRepositoryResult<TaskListing>;

    /// Applies `patch` to the stored task at `timestamp` and returns the
    /// updated task.
    ///
    /// The read, the patch and the write (including any appended log entry)
    /// happen as one atomic operation. Concurrent updates to the same task
    /// are last-write-wins.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(
        &self,
        id: TaskId,
        patch: TaskPatch,
        timestamp: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Deletes a task and its log.
    ///
    /// Returns `false` when the task did not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
