//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title is {length} characters long, expected at most 255")]
    TitleTooLong {
        /// Observed length in characters.
        length: usize,
    },

    /// The priority lies outside `1..=5`.
    #[error("invalid priority {0}, expected a value between 1 and 5")]
    InvalidPriority(i64),

    /// The requested page number is zero.
    #[error("invalid page {0}, expected a value of at least 1")]
    InvalidPage(u64),

    /// The requested page size lies outside `1..=100`.
    #[error("invalid page size {0}, expected a value between 1 and 100")]
    InvalidPageSize(u64),
}

impl TaskDomainError {
    /// Returns the name of the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::InvalidPriority(_) => "priority",
            Self::InvalidPage(_) => "page",
            Self::InvalidPageSize(_) => "per_page",
        }
    }
}

/// Error returned while parsing task statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
