//! Set of task identifiers with a background run in flight.

use crate::task::domain::TaskId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared set of task identifiers currently being processed.
///
/// Membership is claimed with [`RunningSet::try_claim`], which checks and
/// inserts under one lock acquisition. The returned [`RunningClaim`] removes
/// the identifier again when dropped.
#[derive(Debug, Clone, Default)]
pub struct RunningSet {
    ids: Arc<Mutex<HashSet<TaskId>>>,
}

impl RunningSet {
    /// Creates an empty running set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task_id` unless it is already registered.
    ///
    /// Returns `None` when another run holds the identifier.
    #[must_use]
    pub fn try_claim(&self, task_id: TaskId) -> Option<RunningClaim> {
        let inserted = self.lock().insert(task_id);
        inserted.then(|| RunningClaim {
            set: self.clone(),
            task_id,
        })
    }

    /// Returns whether `task_id` is registered.
    #[must_use]
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.lock().contains(&task_id)
    }

    /// Returns the number of registered identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether no identifier is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn release(&self, task_id: TaskId) {
        self.lock().remove(&task_id);
    }

    // No code panics while holding the lock, so a poisoned set is still
    // consistent.
    fn lock(&self) -> MutexGuard<'_, HashSet<TaskId>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registration of one task identifier in a [`RunningSet`].
///
/// Dropping the claim deregisters the identifier.
#[derive(Debug)]
pub struct RunningClaim {
    set: RunningSet,
    task_id: TaskId,
}

impl RunningClaim {
    /// Returns the claimed task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

impl Drop for RunningClaim {
    fn drop(&mut self) {
        self.set.release(self.task_id);
    }
}
