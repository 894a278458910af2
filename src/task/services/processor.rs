//! Background processing of individual tasks.
//!
//! A run moves a task to `in_progress`, performs the configured work, then
//! marks it `completed`. At most one run per task is in flight; a second
//! start request for the same task is refused until the first run ends.

use super::lifecycle::{TaskLifecycleError, TaskLifecycleService};
use super::running::RunningSet;
use crate::task::{
    domain::{TaskId, TaskStatus},
    ports::{TaskRepository, TaskWork, TaskWorkError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors returned when a background run cannot be started.
#[derive(Debug, Clone, Error)]
pub enum ProcessingError {
    /// A run for the task is already in flight.
    #[error("task {0} is already being processed")]
    AlreadyRunning(TaskId),

    /// The task does not exist.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The existence check failed.
    #[error(transparent)]
    Lifecycle(TaskLifecycleError),
}

impl From<TaskLifecycleError> for ProcessingError {
    fn from(err: TaskLifecycleError) -> Self {
        match err {
            TaskLifecycleError::NotFound(id) => Self::NotFound(id),
            other => Self::Lifecycle(other),
        }
    }
}

/// Reason a started run did not reach `completed`.
#[derive(Debug, Error)]
enum RunFailure {
    #[error("status update failed: {0}")]
    Status(#[from] TaskLifecycleError),

    #[error(transparent)]
    Work(#[from] TaskWorkError),
}

/// Handle to a spawned background run.
#[derive(Debug)]
pub struct ProcessingHandle {
    task_id: TaskId,
    join: JoinHandle<()>,
}

impl ProcessingHandle {
    /// Returns the identifier of the task being processed.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns whether the run has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the run to end.
    ///
    /// Returns `false` when the run panicked or was aborted. Runs that fail
    /// through an error still return `true`; their outcome is visible in the
    /// task status.
    pub async fn wait(self) -> bool {
        self.join.await.is_ok()
    }
}

/// Starts and tracks background task runs.
pub struct BackgroundProcessor<R, C, W>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    W: TaskWork,
{
    service: TaskLifecycleService<R, C>,
    work: Arc<W>,
    running: RunningSet,
}

impl<R, C, W> Clone for BackgroundProcessor<R, C, W>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    W: TaskWork,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            work: Arc::clone(&self.work),
            running: self.running.clone(),
        }
    }
}

impl<R, C, W> BackgroundProcessor<R, C, W>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    /// Creates a processor with an empty running set.
    #[must_use]
    pub fn new(service: TaskLifecycleService<R, C>, work: Arc<W>) -> Self {
        Self::with_running_set(service, work, RunningSet::new())
    }

    /// Creates a processor sharing an existing running set.
    #[must_use]
    pub const fn with_running_set(
        service: TaskLifecycleService<R, C>,
        work: Arc<W>,
        running: RunningSet,
    ) -> Self {
        Self {
            service,
            work,
            running,
        }
    }

    /// Returns whether a run for `task_id` is in flight.
    #[must_use]
    pub fn is_running(&self, task_id: TaskId) -> bool {
        self.running.contains(task_id)
    }

    /// Returns the number of runs in flight.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Spawns a run for `task_id` and returns immediately.
    ///
    /// The task's existence is not checked here; a run for a missing task
    /// fails on its first status update and deregisters itself. Use
    /// [`Self::start_existing`] to reject unknown tasks up front.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::AlreadyRunning`] when a run for the task is
    /// in flight.
    pub fn start(&self, task_id: TaskId) -> Result<ProcessingHandle, ProcessingError> {
        let claim = self
            .running
            .try_claim(task_id)
            .ok_or(ProcessingError::AlreadyRunning(task_id))?;
        let service = self.service.clone();
        let work = Arc::clone(&self.work);

        tracing::info!(%task_id, "background processing started");
        let join = tokio::spawn(async move {
            // Held for the whole run; dropping it deregisters the task even
            // when the run is cancelled or panics.
            let _claim = claim;
            run(&service, work.as_ref(), task_id).await;
        });

        Ok(ProcessingHandle { task_id, join })
    }

    /// Checks that the task exists, then starts a run for it.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::NotFound`] when the task does not exist,
    /// [`ProcessingError::AlreadyRunning`] when a run is in flight and
    /// [`ProcessingError::Lifecycle`] when the lookup fails.
    pub async fn start_existing(
        &self,
        task_id: TaskId,
    ) -> Result<ProcessingHandle, ProcessingError> {
        if !self.service.exists(task_id).await? {
            return Err(ProcessingError::NotFound(task_id));
        }
        self.start(task_id)
    }
}

async fn run<R, C, W>(service: &TaskLifecycleService<R, C>, work: &W, task_id: TaskId)
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    W: TaskWork,
{
    match execute(service, work, task_id).await {
        Ok(()) => tracing::info!(%task_id, "background processing completed"),
        Err(failure) => {
            tracing::error!(%task_id, error = %failure, "background processing failed");
            if let Err(revert_err) = service.set_status(task_id, TaskStatus::Pending).await {
                tracing::warn!(
                    %task_id,
                    error = %revert_err,
                    "failed to revert task to pending after processing failure"
                );
            }
        }
    }
}

async fn execute<R, C, W>(
    service: &TaskLifecycleService<R, C>,
    work: &W,
    task_id: TaskId,
) -> Result<(), RunFailure>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    W: TaskWork,
{
    service.set_status(task_id, TaskStatus::InProgress).await?;
    work.perform(task_id).await?;
    service.set_status(task_id, TaskStatus::Completed).await?;
    Ok(())
}
