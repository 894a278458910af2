//! Request handlers.
//!
//! Handlers are generic over the repository, clock and work adapters so the
//! same router serves the in-memory and `PostgreSQL` deployments as well as
//! tests.

use super::dto::{
    CreateTaskBody, HealthResponse, ListTasksQuery, MessageResponse, PaginatedTasksResponse,
    TaskDetailResponse, UpdateTaskBody,
};
use super::error::ApiErrorResponse;
use super::state::AppState;
use crate::task::{
    domain::TaskId,
    ports::{TaskRepository, TaskWork},
    services::{ListTasksRequest, UpdateTaskRequest},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use mockable::Clock;
use uuid::Uuid;

type ApiResult<T> = Result<T, ApiErrorResponse>;

fn task_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<TaskId> {
    let Path(uuid) = path?;
    Ok(TaskId::from_uuid(uuid))
}

/// `GET /`
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Task Management API is running"))
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_owned(),
    })
}

/// `POST /tasks`
///
/// # Response
///
/// - **201 Created**: the new pending task with its initial log entry
/// - **422 Unprocessable Entity**: malformed body, bad title or priority
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for validation and persistence failures.
pub async fn create_task<R, C, W>(
    State(state): State<AppState<R, C, W>>,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskDetailResponse>)>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    let Json(payload) = body?;
    let task = state.service().create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(TaskDetailResponse::from(&task))))
}

/// `GET /tasks`
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for an invalid query and persistence
/// failures.
pub async fn list_tasks<R, C, W>(
    State(state): State<AppState<R, C, W>>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedTasksResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    let Query(params) = query?;
    let request = ListTasksRequest::try_from(params)?;
    let page = state.service().list(request).await?;
    Ok(Json(PaginatedTasksResponse::from(page)))
}

/// `GET /tasks/{id}`
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when the task does not exist or the lookup
/// fails.
pub async fn get_task<R, C, W>(
    State(state): State<AppState<R, C, W>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<TaskDetailResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    let id = task_id(path)?;
    let task = state.service().get(id).await?;
    Ok(Json(TaskDetailResponse::from(&task)))
}

/// `PUT /tasks/{id}`
///
/// Applies the fields present in the body. A status change appends one log
/// entry.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for validation failures, an unknown task and
/// persistence failures.
pub async fn update_task<R, C, W>(
    State(state): State<AppState<R, C, W>>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> ApiResult<Json<TaskDetailResponse>>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    let id = task_id(path)?;
    let Json(payload) = body?;
    let request = UpdateTaskRequest::try_from(payload)?;
    let task = state.service().update(id, request).await?;
    Ok(Json(TaskDetailResponse::from(&task)))
}

/// `DELETE /tasks/{id}`
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] when the task does not exist or deletion
/// fails.
pub async fn delete_task<R, C, W>(
    State(state): State<AppState<R, C, W>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    let id = task_id(path)?;
    if state.service().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiErrorResponse::not_found("Task not found"))
    }
}

/// `POST /tasks/{id}/process`
///
/// Starts a background run and returns without waiting for it.
///
/// # Response
///
/// - **202 Accepted**: run started
/// - **404 Not Found**: no such task
/// - **409 Conflict**: a run for the task is already in flight
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] in the cases above and for lookup failures.
pub async fn process_task<R, C, W>(
    State(state): State<AppState<R, C, W>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    let id = task_id(path)?;
    state.processor().start_existing(id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(format!(
            "Background processing started for task {id}"
        ))),
    ))
}
