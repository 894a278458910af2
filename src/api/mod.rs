//! HTTP surface for task tracking.
//!
//! [`router`] builds the axum application over an [`AppState`]; the binary
//! serves it and the integration tests drive it in-process.

pub mod dto;
pub mod error;
pub mod handlers;
mod state;

pub use error::{ApiError, ApiErrorResponse, FieldError};
pub use state::AppState;

use crate::task::ports::{TaskRepository, TaskWork};
use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    create_task, delete_task, get_task, health, list_tasks, process_task, root, update_task,
};
use mockable::Clock;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn router<R, C, W>(state: AppState<R, C, W>) -> Router
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/tasks",
            get(list_tasks::<R, C, W>).post(create_task::<R, C, W>),
        )
        .route(
            "/tasks/",
            get(list_tasks::<R, C, W>).post(create_task::<R, C, W>),
        )
        .route(
            "/tasks/{id}",
            get(get_task::<R, C, W>)
                .put(update_task::<R, C, W>)
                .delete(delete_task::<R, C, W>),
        )
        .route("/tasks/{id}/process", post(process_task::<R, C, W>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
