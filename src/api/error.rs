//! API error handling.
//!
//! Every failure leaving the HTTP surface is rendered as
//! `{code, message, details?}` with a matching status code.

use crate::task::domain::{ParseTaskStatusError, TaskDomainError};
use crate::task::services::{ProcessingError, TaskLifecycleError};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Error body for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Field-level errors for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Creates an error body without details.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a `VALIDATION_ERROR` body with field-level details.
    #[must_use]
    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self {
            code: ApiErrorResponse::VALIDATION_ERROR.to_owned(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Validation failure attributed to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Reason the field was rejected.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Status code plus error body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Code for rejected input.
    pub const VALIDATION_ERROR: &'static str = "VALIDATION_ERROR";
    /// Code for an unknown task.
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    /// Code for a processing request on a task with a run in flight.
    pub const ALREADY_RUNNING: &'static str = "ALREADY_RUNNING";
    /// Code for failures not caused by the request.
    pub const INTERNAL_ERROR: &'static str = "INTERNAL_ERROR";

    /// Creates an error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 422 response for one rejected field.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let detail = FieldError::new(field, message);
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::validation(detail.message.clone(), vec![detail]),
        )
    }

    /// Creates a 404 response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ApiError::new(Self::NOT_FOUND, message),
        )
    }

    /// Creates a 409 response for a duplicate processing request.
    #[must_use]
    pub fn already_running() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            ApiError::new(Self::ALREADY_RUNNING, "Task is already being processed"),
        )
    }

    /// Creates a 500 response. Details stay in the server log.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(Self::INTERNAL_ERROR, "An internal error occurred"),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<TaskDomainError> for ApiErrorResponse {
    fn from(error: TaskDomainError) -> Self {
        Self::invalid_field(error.field(), error.to_string())
    }
}

impl From<ParseTaskStatusError> for ApiErrorResponse {
    fn from(error: ParseTaskStatusError) -> Self {
        Self::invalid_field("status", error.to_string())
    }
}

impl From<TaskLifecycleError> for ApiErrorResponse {
    fn from(error: TaskLifecycleError) -> Self {
        match error {
            TaskLifecycleError::Domain(domain) => Self::from(domain),
            TaskLifecycleError::NotFound(_) => Self::not_found("Task not found"),
            TaskLifecycleError::Repository(repository) => {
                tracing::error!(error = %repository, "task repository failure");
                Self::internal_error()
            }
        }
    }
}

impl From<ProcessingError> for ApiErrorResponse {
    fn from(error: ProcessingError) -> Self {
        match error {
            ProcessingError::AlreadyRunning(_) => Self::already_running(),
            ProcessingError::NotFound(_) => Self::not_found("Task not found"),
            ProcessingError::Lifecycle(lifecycle) => Self::from(lifecycle),
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_field("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_field("query", rejection.body_text())
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_field("id", rejection.body_text())
    }
}
