//! Filtering and pagination values for task listings.

use super::{Task, TaskDomainError, TaskStatus};

/// Optional filters applied to a task listing. Set filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    title_contains: Option<String>,
    status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Creates a filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to titles containing `needle`, ignoring case.
    ///
    /// An empty needle leaves the filter unset.
    #[must_use]
    pub fn with_title_contains(mut self, needle: impl Into<String>) -> Self {
        let raw = needle.into();
        self.title_contains = (!raw.is_empty()).then_some(raw);
        self
    }

    /// Restricts the listing to tasks with exactly `status`.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the title substring filter, if set.
    #[must_use]
    pub fn title_contains(&self) -> Option<&str> {
        self.title_contains.as_deref()
    }

    /// Returns the status filter, if set.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns whether `task` satisfies every set filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let title_matches = self.title_contains.as_deref().is_none_or(|needle| {
            task.title()
                .as_str()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let status_matches = self.status.is_none_or(|status| task.status() == status);
        title_matches && status_matches
    }
}

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Default page size.
    pub const DEFAULT_PER_PAGE: u64 = 10;
    /// Largest accepted page size.
    pub const MAX_PER_PAGE: u64 = 100;

    /// Creates a validated page request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPage`] when `page` is zero and
    /// [`TaskDomainError::InvalidPageSize`] when `per_page` lies outside
    /// `1..=100`.
    pub const fn new(page: u64, per_page: u64) -> Result<Self, TaskDomainError> {
        if page == 0 {
            return Err(TaskDomainError::InvalidPage(page));
        }
        if per_page == 0 || per_page > Self::MAX_PER_PAGE {
            return Err(TaskDomainError::InvalidPageSize(per_page));
        }
        Ok(Self { page, per_page })
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page(self) -> u64 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn per_page(self) -> u64 {
        self.per_page
    }

    /// Returns the number of records preceding this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Returns the maximum number of records on this page.
    #[must_use]
    pub const fn limit(self) -> u64 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Window of tasks returned by a repository listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListing {
    /// Tasks in the requested window, newest first.
    pub items: Vec<Task>,
    /// Number of tasks matching the filter, regardless of the window.
    pub total: u64,
}

/// One page of tasks with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    items: Vec<Task>,
    total: u64,
    request: PageRequest,
}

impl TaskPage {
    /// Builds a page from a repository listing and the request that produced
    /// it.
    #[must_use]
    pub fn new(listing: TaskListing, request: PageRequest) -> Self {
        Self {
            items: listing.items,
            total: listing.total,
            request,
        }
    }

    /// Returns the tasks on this page.
    #[must_use]
    pub fn items(&self) -> &[Task] {
        &self.items
    }

    /// Returns the number of matching tasks across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.request.page()
    }

    /// Returns the page size.
    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.request.per_page()
    }

    /// Returns the number of pages, never less than one.
    #[must_use]
    pub const fn pages(&self) -> u64 {
        if self.total == 0 {
            return 1;
        }
        self.total.div_ceil(self.request.per_page())
    }
}
