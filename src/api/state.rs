//! Shared state handed to every request handler.

use crate::task::{
    ports::{TaskRepository, TaskWork},
    services::{BackgroundProcessor, TaskLifecycleService},
};
use mockable::Clock;
use std::sync::Arc;

/// Services reachable from the HTTP handlers.
pub struct AppState<R, C, W>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    W: TaskWork,
{
    service: TaskLifecycleService<R, C>,
    processor: BackgroundProcessor<R, C, W>,
}

impl<R, C, W> Clone for AppState<R, C, W>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    W: TaskWork,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            processor: self.processor.clone(),
        }
    }
}

impl<R, C, W> AppState<R, C, W>
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
    W: TaskWork + 'static,
{
    /// Wires a lifecycle service and a processor over one repository.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>, work: Arc<W>) -> Self {
        let service = TaskLifecycleService::new(repository, clock);
        let processor = BackgroundProcessor::new(service.clone(), work);
        Self { service, processor }
    }

    /// Returns the task lifecycle service.
    #[must_use]
    pub const fn service(&self) -> &TaskLifecycleService<R, C> {
        &self.service
    }

    /// Returns the background processor.
    #[must_use]
    pub const fn processor(&self) -> &BackgroundProcessor<R, C, W> {
        &self.processor
    }
}
