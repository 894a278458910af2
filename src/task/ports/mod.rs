//! Port contracts for task tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;
pub mod work;

pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use work::{TaskWork, TaskWorkError, TaskWorkResult};
