//! Shared world state for background task processing BDD scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::fixture;
use tasktrack::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskId},
    ports::{TaskWork, TaskWorkError, TaskWorkResult},
    services::{BackgroundProcessor, ProcessingError, ProcessingHandle, TaskLifecycleService},
};
use tokio::sync::Semaphore;

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

/// Processor type used by the BDD world.
pub type TestProcessor = BackgroundProcessor<InMemoryTaskRepository, DefaultClock, ScenarioWork>;

/// Work whose behaviour each scenario can configure.
pub struct ScenarioWork {
    fail: AtomicBool,
    hold: AtomicBool,
    entered: Semaphore,
    release: Semaphore,
}

impl ScenarioWork {
    fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }

    /// Makes every subsequent run fail.
    pub fn fail_runs(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent run wait for [`Self::release_one`].
    pub fn hold_runs(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Lets one held run continue.
    pub fn release_one(&self) {
        self.release.add_permits(1);
    }

    /// Waits until a run has entered the work step.
    pub async fn wait_until_entered(&self) -> Result<(), eyre::Report> {
        self.entered.acquire().await?.forget();
        Ok(())
    }
}

#[async_trait]
impl TaskWork for ScenarioWork {
    async fn perform(&self, task_id: TaskId) -> TaskWorkResult<()> {
        self.entered.add_permits(1);
        if self.hold.load(Ordering::SeqCst) {
            self.release
                .acquire()
                .await
                .map_err(|err| TaskWorkError::failed(task_id, err.to_string()))?
                .forget();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TaskWorkError::failed(task_id, "scenario failure"));
        }
        Ok(())
    }
}

/// Scenario world for background processing behaviour tests.
pub struct TaskProcessingWorld {
    pub service: TestTaskService,
    pub processor: TestProcessor,
    pub work: Arc<ScenarioWork>,
    pub task: Option<Task>,
    pub handle: Option<ProcessingHandle>,
    pub last_start: Option<Result<(), ProcessingError>>,
}

impl TaskProcessingWorld {
    /// Creates a world with an empty repository.
    #[must_use]
    pub fn new() -> Self {
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(DefaultClock),
        );
        let work = Arc::new(ScenarioWork::new());
        let processor = BackgroundProcessor::new(service.clone(), Arc::clone(&work));

        Self {
            service,
            processor,
            work,
            task: None,
            handle: None,
            last_start: None,
        }
    }

    /// Returns the scenario task.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Reloads the scenario task from the service.
    pub fn refresh_task(&mut self) -> Result<(), eyre::Report> {
        let id = self.task()?.id();
        let fetched = run_async(self.service.get(id))?;
        self.task = Some(fetched);
        Ok(())
    }

    /// Waits for the tracked run to end.
    pub fn finish_run(&mut self) -> Result<(), eyre::Report> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| eyre::eyre!("no run in scenario world"))?;
        if !run_async(handle.wait()) {
            return Err(eyre::eyre!("run ended abnormally"));
        }
        Ok(())
    }
}

impl Default for TaskProcessingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskProcessingWorld {
    TaskProcessingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
