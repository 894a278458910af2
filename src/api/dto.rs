//! Request and response bodies for the HTTP surface.

use crate::task::domain::{Task, TaskId, TaskLog, TaskLogId, TaskPage, TaskStatus};
use crate::task::services::{CreateTaskRequest, ListTasksRequest, UpdateTaskRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ApiErrorResponse;

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskBody {
    /// Task title, 1 to 255 characters.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority between 1 and 5; defaults to 1.
    #[serde(default)]
    pub priority: Option<i64>,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        let CreateTaskBody {
            title,
            description,
            priority,
        } = body;
        let mut request = Self::new(title);
        if let Some(text) = description {
            request = request.with_description(text);
        }
        if let Some(value) = priority {
            request = request.with_priority(value);
        }
        request
    }
}

/// Body of `PUT /tasks/{id}`.
///
/// Absent fields are left untouched. An explicit `"description": null`
/// clears the description; `null` for any other field counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskBody {
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement description; `Some(None)` clears it.
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    /// Replacement status, one of `pending`, `in_progress`, `completed`.
    #[serde(default)]
    pub status: Option<String>,
    /// Replacement priority.
    #[serde(default)]
    pub priority: Option<i64>,
}

impl TryFrom<UpdateTaskBody> for UpdateTaskRequest {
    type Error = ApiErrorResponse;

    fn try_from(body: UpdateTaskBody) -> Result<Self, Self::Error> {
        let UpdateTaskBody {
            title,
            description,
            status,
            priority,
        } = body;
        let mut request = Self::new();
        if let Some(text) = title {
            request = request.with_title(text);
        }
        match description {
            Some(Some(text)) => request = request.with_description(text),
            Some(None) => request = request.without_description(),
            None => {}
        }
        if let Some(raw) = status {
            request = request.with_status(TaskStatus::try_from(raw.as_str())?);
        }
        if let Some(value) = priority {
            request = request.with_priority(value);
        }
        Ok(request)
    }
}

/// Distinguishes an explicit `null` from a missing field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query string of `GET /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksQuery {
    /// One-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub per_page: Option<u64>,
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Exact status.
    pub status: Option<String>,
}

impl TryFrom<ListTasksQuery> for ListTasksRequest {
    type Error = ApiErrorResponse;

    fn try_from(query: ListTasksQuery) -> Result<Self, Self::Error> {
        let ListTasksQuery {
            page,
            per_page,
            title,
            status,
        } = query;
        let mut request = Self::new();
        if let Some(number) = page {
            request = request.with_page(number);
        }
        if let Some(size) = per_page {
            request = request.with_per_page(size);
        }
        if let Some(needle) = title {
            request = request.with_title(needle);
        }
        if let Some(raw) = status.filter(|value| !value.trim().is_empty()) {
            request = request.with_status(TaskStatus::try_from(raw.as_str())?);
        }
        Ok(request)
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Task summary, used in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description, `null` when unset.
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Priority between 1 and 5.
    pub priority: u8,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last update.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            status: task.status(),
            priority: task.priority().value(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// One status-change log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLogResponse {
    /// Log entry identifier.
    pub id: TaskLogId,
    /// Owning task.
    pub task_id: TaskId,
    /// Status reached.
    pub status: TaskStatus,
    /// Time the status was reached.
    pub created_at: DateTime<Utc>,
}

impl From<&TaskLog> for TaskLogResponse {
    fn from(log: &TaskLog) -> Self {
        Self {
            id: log.id(),
            task_id: log.task_id(),
            status: log.status(),
            created_at: log.created_at(),
        }
    }
}

/// Task with its full status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetailResponse {
    /// Task fields.
    #[serde(flatten)]
    pub task: TaskResponse,
    /// Status history, oldest first.
    pub logs: Vec<TaskLogResponse>,
}

impl From<&Task> for TaskDetailResponse {
    fn from(task: &Task) -> Self {
        Self {
            task: TaskResponse::from(task),
            logs: task.logs().iter().map(TaskLogResponse::from).collect(),
        }
    }
}

/// One page of task summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedTasksResponse {
    /// Tasks on this page, newest first.
    pub items: Vec<TaskResponse>,
    /// Number of tasks matching the filters.
    pub total: u64,
    /// One-based page number.
    pub page: u64,
    /// Page size.
    pub per_page: u64,
    /// Number of pages, at least 1.
    pub pages: u64,
}

impl From<TaskPage> for PaginatedTasksResponse {
    fn from(page: TaskPage) -> Self {
        Self {
            items: page.items().iter().map(TaskResponse::from).collect(),
            total: page.total(),
            page: page.page(),
            per_page: page.per_page(),
            pages: page.pages(),
        }
    }
}

/// Plain message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}
