//! Task aggregate root and its status log.

use super::{TaskId, TaskLogId, TaskPriority, TaskStatus, TaskTitle};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Immutable audit entry recording a status a task has reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    id: TaskLogId,
    task_id: TaskId,
    status: TaskStatus,
    created_at: DateTime<Utc>,
}

impl TaskLog {
    /// Creates a log entry for `task_id` reaching `status` at `created_at`.
    #[must_use]
    pub fn new(task_id: TaskId, status: TaskStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TaskLogId::new(),
            task_id,
            status,
            created_at,
        }
    }

    /// Reconstructs a log entry from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: TaskLogId,
        task_id: TaskId,
        status: TaskStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            status,
            created_at,
        }
    }

    /// Returns the log identifier.
    #[must_use]
    pub const fn id(&self) -> TaskLogId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the recorded status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns when the status was reached.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: TaskTitle,
    description: Option<String>,
    priority: TaskPriority,
}

impl NewTask {
    /// Creates task input with the default priority and no description.
    #[must_use]
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: None,
            priority: TaskPriority::default(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial update applied to a task.
///
/// Only fields that are set are applied. `description` distinguishes "leave
/// unchanged" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<TaskTitle>,
    /// Replacement or cleared description.
    pub description: Option<Option<String>>,
    /// Replacement priority.
    pub priority: Option<TaskPriority>,
    /// Replacement status.
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Creates a patch that only sets the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns whether the patch sets no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    priority: TaskPriority,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    logs: Vec<TaskLog>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted status log in chronological order.
    pub logs: Vec<TaskLog>,
}

impl Task {
    /// Creates a pending task and records its initial status.
    #[must_use]
    pub fn new(input: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let id = TaskId::new();
        let status = TaskStatus::default();

        Self {
            id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            status,
            created_at: timestamp,
            updated_at: timestamp,
            logs: vec![TaskLog::new(id, status, timestamp)],
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            priority: data.priority,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            logs: data.logs,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the status log in chronological order.
    #[must_use]
    pub fn logs(&self) -> &[TaskLog] {
        &self.logs
    }

    /// Applies a partial update at `timestamp`.
    ///
    /// `updated_at` is refreshed even when no field changes, but never moves
    /// backwards. A log entry is appended only when the status actually
    /// changes; that entry is returned so adapters can persist it alongside
    /// the task row.
    pub fn apply(&mut self, patch: TaskPatch, timestamp: DateTime<Utc>) -> Option<TaskLog> {
        let TaskPatch {
            title,
            description,
            priority,
            status,
        } = patch;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_priority) = priority {
            self.priority = new_priority;
        }

        self.updated_at = self.updated_at.max(timestamp);
        status.and_then(|next| self.transition_to(next))
    }

    fn transition_to(&mut self, next: TaskStatus) -> Option<TaskLog> {
        if !self.status.records_transition_to(next) {
            return None;
        }
        self.status = next;
        let log = TaskLog::new(self.id, next, self.updated_at);
        self.logs.push(log.clone());
        Some(log)
    }
}
