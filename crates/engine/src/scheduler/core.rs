use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use crate::config::SchedulerConfig;
use crate::job::Completion;
use crate::metrics::SchedulerMetrics;
use crate::strategy::{SchedulingStrategy, Sequential};

/// The job scheduler. Runs one [`Job`](crate::Job) at a time: every worker
/// is spawned as its own tokio task, and outcomes are fanned into a data
/// stream and an error stream drained by the job's consumers.
///
/// Instances are independent; a scheduler may be reused for sequential
/// submissions but refuses a second job while one is in flight.
pub struct Scheduler<T> {
    /// Launch-order policy.
    pub(super) strategy: Box<dyn SchedulingStrategy<T>>,
    /// Log worker start/end at `info`.
    pub(super) debug: bool,
    /// Single-job guard: true from accepted submit until cleanup finishes.
    pub(super) in_flight: Arc<AtomicBool>,
    /// Completion of the most recently accepted job.
    pub(super) current: Mutex<Option<Completion>>,
    /// Scheduler metrics.
    pub(super) metrics: Arc<RwLock<SchedulerMetrics>>,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Sequential strategy, debug disabled.
    pub fn new() -> Self {
        Self {
            strategy: Box::new(Sequential),
            debug: false,
            in_flight: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(None),
            metrics: Arc::new(RwLock::new(SchedulerMetrics::default())),
        }
    }

    /// Build a scheduler from configuration.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        info!(strategy = ?config.strategy, debug = config.debug, "creating scheduler");
        Self::new()
            .with_boxed_strategy(config.strategy.build())
            .with_debug(config.debug)
    }

    /// Set the scheduling strategy.
    pub fn with_strategy<S: SchedulingStrategy<T> + 'static>(self, strategy: S) -> Self {
        self.with_boxed_strategy(Box::new(strategy))
    }

    pub fn with_boxed_strategy(mut self, strategy: Box<dyn SchedulingStrategy<T>>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable per-worker start/end log lines.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl<T: Send + 'static> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// True while a job is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Get a snapshot of the current scheduler metrics.
    pub fn metrics(&self) -> SchedulerMetrics {
        self.metrics
            .read()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Wait for the most recently accepted job to run and be fully consumed.
    ///
    /// Returns immediately if no job was ever accepted.
    pub async fn wait_for_workers(&self) {
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(completion) = current {
            completion.wait().await;
        }
    }

    pub(super) fn set_current(&self, completion: Completion) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(completion);
    }
}

/// Apply `f` to the metrics, skipping the update if the lock is poisoned.
pub(super) fn update_metrics(metrics: &RwLock<SchedulerMetrics>, f: impl FnOnce(&mut SchedulerMetrics)) {
    if let Ok(mut m) = metrics.write() {
        f(&mut m);
    }
}
