//! Diesel row models for task persistence.

use super::schema::{task_logs, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Priority between 1 and 5.
    pub priority: i16,
    /// Task status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Priority between 1 and 5.
    pub priority: i16,
    /// Task status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written when a task is updated.
///
/// Every column is written so that a cleared description is persisted as
/// `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Priority between 1 and 5.
    pub priority: i16,
    /// Task status.
    pub status: String,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for task log entries.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(TaskRow, foreign_key = task_id))]
#[diesel(table_name = task_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskLogRow {
    /// Log entry identifier.
    pub id: uuid::Uuid,
    /// Owning task identifier.
    pub task_id: uuid::Uuid,
    /// Status reached by the task.
    pub status: String,
    /// Time the status was reached.
    pub created_at: DateTime<Utc>,
}

/// Insert model for task log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_logs)]
pub struct NewTaskLogRow {
    /// Log entry identifier.
    pub id: uuid::Uuid,
    /// Owning task identifier.
    pub task_id: uuid::Uuid,
    /// Status reached by the task.
    pub status: String,
    /// Time the status was reached.
    pub created_at: DateTime<Utc>,
}
