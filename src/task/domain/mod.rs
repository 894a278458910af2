//! Domain model for task tracking.
//!
//! The task domain models task records, their status log, and listing
//! queries while keeping all infrastructure concerns outside of the domain
//! boundary.

mod error;
mod ids;
mod query;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskLogId, TaskPriority, TaskTitle};
pub use query::{PageRequest, TaskFilter, TaskListing, TaskPage};
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task, TaskLog, TaskPatch};
