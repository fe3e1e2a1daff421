use std::fmt;
use std::sync::Arc;

use crate::task::Task;
use crate::types::{Priority, WorkerId};

/// The atomic schedulable unit: a named [`Task`] plus an optional priority hint.
///
/// Immutable after construction. Cloning shares the underlying task, so the
/// caller keeps ownership of it. Names are for diagnostics and need not be
/// unique; [`WorkerId`] is what identifies a worker.
pub struct Worker<T> {
    id: WorkerId,
    name: String,
    task: Arc<dyn Task<Output = T>>,
    priority: Option<Priority>,
}

impl<T: Send + 'static> Worker<T> {
    /// Create a worker around a shared task.
    ///
    /// `priority` is an optional launch-order hint limited to the levels of
    /// [`Priority`]; `None` means "no preference" and is launched after every
    /// prioritized worker by [`PriorityFirst`](crate::PriorityFirst).
    pub fn new(task: Arc<dyn Task<Output = T>>, name: impl Into<String>, priority: Option<Priority>) -> Self {
        Self {
            id: WorkerId::new(),
            name: name.into(),
            task,
            priority,
        }
    }

    /// Create a worker that takes ownership of a task value.
    pub fn from_task<K>(task: K, name: impl Into<String>) -> Self
    where
        K: Task<Output = T> + 'static,
    {
        Self::new(Arc::new(task), name, None)
    }

    /// Return a copy of this worker with the given priority hint.
    ///
    /// The copy keeps the same [`WorkerId`].
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl<T> Worker<T> {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Shared handle to the task.
    pub fn task(&self) -> Arc<dyn Task<Output = T>> {
        Arc::clone(&self.task)
    }
}

impl<T> Clone for Worker<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            task: Arc::clone(&self.task),
            priority: self.priority,
        }
    }
}

impl<T> fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::task::task_fn;

    #[test]
    fn clone_shares_identity_and_task() {
        let worker = Worker::from_task(task_fn(|| async { Ok::<_, TaskError>(1u8) }), "w1")
            .with_priority(Priority::P2);
        let copy = worker.clone();

        assert_eq!(copy.id(), worker.id());
        assert_eq!(copy.name(), "w1");
        assert_eq!(copy.priority(), Some(Priority::P2));
        assert!(Arc::ptr_eq(&copy.task(), &worker.task()));
    }

    #[test]
    fn separately_built_workers_differ() {
        let task: Arc<dyn Task<Output = u8>> = Arc::new(task_fn(|| async { Ok::<_, TaskError>(1u8) }));
        let a = Worker::new(Arc::clone(&task), "same", None);
        let b = Worker::new(task, "same", None);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.priority(), None);
    }
}
