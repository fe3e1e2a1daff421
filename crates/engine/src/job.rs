use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::consumer::{DataConsumer, DataPrinter, ErrorConsumer, ErrorPrinter};
use crate::worker::Worker;

// ── Completion ───────────────────────────────────────────────────────

/// Completion signal of one job submission.
///
/// Satisfied once every worker has finished AND both drain loops have handed
/// their last item to the consumers, so consumer state is safe to read as
/// soon as [`wait`](Completion::wait) returns.
#[derive(Clone)]
pub struct Completion {
    tx: Arc<watch::Sender<bool>>,
}

impl Completion {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn complete(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_complete(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the job has been fully consumed.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // Err only if the sender is gone, which cannot happen while `self` holds it.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("complete", &self.is_complete())
            .finish()
    }
}

// ── Job ──────────────────────────────────────────────────────────────

/// A named, ordered batch of workers submitted together, plus the consumers
/// that receive their outcomes.
///
/// A job is single-use: once a scheduler has accepted it, any further
/// submission (to the same or another scheduler) is rejected with
/// [`SchedulerError::AlreadySubmitted`](crate::SchedulerError::AlreadySubmitted).
/// Build a fresh job to run the same workers again.
pub struct Job<T> {
    name: String,
    workers: Arc<[Worker<T>]>,
    data_consumer: Arc<dyn DataConsumer<T>>,
    error_consumer: Arc<dyn ErrorConsumer>,
    submitted: AtomicBool,
    completion: Completion,
}

impl<T: fmt::Debug + Send + 'static> Job<T> {
    /// Create a job whose outcomes are printed to stdout.
    pub fn new(name: impl Into<String>, workers: impl Into<Arc<[Worker<T>]>>) -> Self {
        Self::with_consumers(name, workers, DataPrinter, ErrorPrinter)
    }
}

impl<T: Send + 'static> Job<T> {
    /// Create a job with explicit consumers.
    pub fn with_consumers<D, E>(
        name: impl Into<String>,
        workers: impl Into<Arc<[Worker<T>]>>,
        data_consumer: D,
        error_consumer: E,
    ) -> Self
    where
        D: DataConsumer<T> + 'static,
        E: ErrorConsumer + 'static,
    {
        Self {
            name: name.into(),
            workers: workers.into(),
            data_consumer: Arc::new(data_consumer),
            error_consumer: Arc::new(error_consumer),
            submitted: AtomicBool::new(false),
            completion: Completion::new(),
        }
    }

    /// Replace the data consumer.
    pub fn with_data_consumer<D: DataConsumer<T> + 'static>(mut self, consumer: D) -> Self {
        self.data_consumer = Arc::new(consumer);
        self
    }

    /// Replace the error consumer.
    pub fn with_error_consumer<E: ErrorConsumer + 'static>(mut self, consumer: E) -> Self {
        self.error_consumer = Arc::new(consumer);
        self
    }
}

impl<T> Job<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workers(&self) -> &[Worker<T>] {
        &self.workers
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Whether a scheduler has accepted this job.
    pub fn is_submitted(&self) -> bool {
        self.submitted.load(Ordering::Acquire)
    }

    /// Whether every outcome has been consumed.
    pub fn is_complete(&self) -> bool {
        self.completion.is_complete()
    }

    /// Block until all workers ran and all their outcomes were consumed.
    ///
    /// Returns immediately if the job was never accepted by a scheduler.
    pub async fn wait(&self) {
        if !self.is_submitted() {
            return;
        }
        self.completion.wait().await;
    }

    /// Handle to this job's completion signal.
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    pub(crate) fn data_consumer(&self) -> Arc<dyn DataConsumer<T>> {
        Arc::clone(&self.data_consumer)
    }

    pub(crate) fn error_consumer(&self) -> Arc<dyn ErrorConsumer> {
        Arc::clone(&self.error_consumer)
    }

    /// Flip the single-use flag. False if the job was already accepted.
    pub(crate) fn mark_submitted(&self) -> bool {
        self.submitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl<T> fmt::Debug for Job<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("workers", &self.workers.len())
            .field("submitted", &self.is_submitted())
            .field("complete", &self.is_complete())
            .finish()
    }
}
