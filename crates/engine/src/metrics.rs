use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scheduler operational counters, snapshotted by [`Scheduler::metrics`](crate::Scheduler::metrics).
///
/// Worker names are arbitrary and need not be unique, so every counter is an
/// aggregate over all workers the scheduler has run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerMetrics {
    /// Jobs accepted by `submit`.
    pub jobs_submitted: u64,
    /// `submit` calls that returned an error.
    pub jobs_rejected: u64,
    /// Jobs whose workers and drain loops have all finished.
    pub jobs_completed: u64,
    /// Worker executions across all jobs.
    pub workers_executed: u64,
    /// Workers whose task returned a failure or panicked.
    pub worker_failures: u64,
    /// Average task duration across all executions.
    pub avg_worker_duration: Duration,
    /// Completion time of the most recent worker.
    pub last_worker_run: Option<DateTime<Utc>>,
    /// Workers currently running their task.
    pub active_workers: usize,
    /// Data consumer invocations.
    pub values_consumed: u64,
    /// Error consumer invocations.
    pub errors_consumed: u64,
    /// Consumer invocations that panicked.
    pub consumer_panics: u64,
}

impl SchedulerMetrics {
    /// Record a finished worker execution.
    pub fn record_execution(&mut self, duration: Duration, failed: bool) {
        self.workers_executed += 1;
        self.last_worker_run = Some(Utc::now());
        if failed {
            self.worker_failures += 1;
        }

        let count = self.workers_executed;
        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        self.avg_worker_duration = if count == 1 {
            duration
        } else {
            let prev_nanos = self.avg_worker_duration.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
    }
}
