//! Application services for the task lifecycle and background processing.

mod lifecycle;
mod processor;
mod running;

pub use lifecycle::{
    CreateTaskRequest, ListTasksRequest, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService, UpdateTaskRequest,
};
pub use processor::{BackgroundProcessor, ProcessingError, ProcessingHandle};
pub use running::{RunningClaim, RunningSet};
