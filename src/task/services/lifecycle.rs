//! Service layer for task creation, lookup, listing, update and deletion.

use crate::task::{
    domain::{
        NewTask, PageRequest, Task, TaskDomainError, TaskFilter, TaskId, TaskPage, TaskPatch,
        TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: Option<i64>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task priority. Unset priorities default to 1.
    #[must_use]
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    fn into_new_task(self) -> Result<NewTask, TaskDomainError> {
        let mut new_task = NewTask::new(TaskTitle::new(self.title)?);
        if let Some(description) = self.description {
            new_task = new_task.with_description(description);
        }
        if let Some(priority) = self.priority {
            new_task = new_task.with_priority(TaskPriority::new(priority)?);
        }
        Ok(new_task)
    }
}

/// Request payload for a partial task update.
///
/// Fields left unset are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<Option<String>>,
    priority: Option<i64>,
    status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Clears the description.
    #[must_use]
    pub fn without_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn into_patch(self) -> Result<TaskPatch, TaskDomainError> {
        Ok(TaskPatch {
            title: self.title.map(TaskTitle::new).transpose()?,
            description: self.description,
            priority: self.priority.map(TaskPriority::new).transpose()?,
            status: self.status,
        })
    }
}

/// Request payload for listing tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTasksRequest {
    page: u64,
    per_page: u64,
    title: Option<String>,
    status: Option<TaskStatus>,
}

impl ListTasksRequest {
    /// Creates a request for the first page with the default page size.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page: 1,
            per_page: PageRequest::DEFAULT_PER_PAGE,
            title: None,
            status: None,
        }
    }

    /// Sets the one-based page number.
    #[must_use]
    pub const fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    /// Filters by a case-insensitive title substring.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Filters by exact status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Default for ListTasksRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Clone, Error)]
pub enum TaskLifecycleError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Validates raw input into domain values before any repository call, and
/// stamps every mutation with the injected clock.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a pending task with its initial log entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when validation fails and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let new_task = request.into_new_task()?;
        let task = Task::new(new_task, &*self.clock);
        self.repository.store(&task).await?;
        tracing::debug!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Retrieves a task with its log.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// and [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn get(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(id))
    }

    /// Returns whether a task exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn exists(&self, id: TaskId) -> TaskLifecycleResult<bool> {
        Ok(self.repository.find_by_id(id).await?.is_some())
    }

    /// Lists one page of tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an out-of-range page or page
    /// size and [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn list(&self, request: ListTasksRequest) -> TaskLifecycleResult<TaskPage> {
        let page = PageRequest::new(request.page, request.per_page)?;
        let mut filter = TaskFilter::new();
        if let Some(title) = request.title {
            filter = filter.with_title_contains(title);
        }
        if let Some(status) = request.status {
            filter = filter.with_status(status);
        }

        let listing = self
            .repository
            .list(&filter, page.offset(), page.limit())
            .await?;
        Ok(TaskPage::new(listing, page))
    }

    /// Applies a partial update.
    ///
    /// A status change appends exactly one log entry; `updated_at` is always
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when validation fails,
    /// [`TaskLifecycleError::NotFound`] when the task does not exist and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let patch = request.into_patch()?;
        self.apply(id, patch).await
    }

    /// Sets the status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// and [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskLifecycleResult<Task> {
        self.apply(id, TaskPatch::status(status)).await
    }

    /// Deletes a task and its log.
    ///
    /// Returns `false` when the task did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn delete(&self, id: TaskId) -> TaskLifecycleResult<bool> {
        let deleted = self.repository.delete(id).await?;
        if deleted {
            tracing::debug!(task_id = %id, "task deleted");
        }
        Ok(deleted)
    }

    async fn apply(&self, id: TaskId, patch: TaskPatch) -> TaskLifecycleResult<Task> {
        let task = self.repository.update(id, patch, self.clock.utc()).await?;
        Ok(task)
    }
}
