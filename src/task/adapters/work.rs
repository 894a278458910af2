//! Simulated work adapter used by the background processor.

use crate::task::{
    domain::TaskId,
    ports::{TaskWork, TaskWorkResult},
};
use async_trait::async_trait;
use std::time::Duration;

/// Work that stands in for real processing by waiting a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedWork {
    duration: Duration,
}

impl SimulatedWork {
    /// Default simulated work duration.
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

    /// Creates simulated work lasting `duration`.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Returns the simulated work duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for SimulatedWork {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION)
    }
}

#[async_trait]
impl TaskWork for SimulatedWork {
    async fn perform(&self, task_id: TaskId) -> TaskWorkResult<()> {
        tracing::debug!(%task_id, duration = ?self.duration, "simulating task work");
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
