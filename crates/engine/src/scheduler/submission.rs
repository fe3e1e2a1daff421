use std::sync::atomic::Ordering;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::error::SchedulerError;
use crate::job::Job;
use crate::strategy::verify_permutation;
use crate::types::WorkerId;
use crate::worker::Worker;

use super::core::update_metrics;
use super::Scheduler;

impl<T: Send + 'static> Scheduler<T> {
    /// Submit a job for execution.
    ///
    /// Returns as soon as the job's tasks are spawned; use [`Job::wait`] or
    /// [`Scheduler::wait_for_workers`] to block until it is fully consumed.
    /// Fails without side effects when the job is absent, when another job is
    /// in flight, when the strategy returns something other than a
    /// reordering, or when the job was already accepted once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, job: Option<&Job<T>>) -> Result<(), SchedulerError> {
        let result = self.try_submit(job);
        if let Err(e) = &result {
            warn!(error = %e, "job rejected");
            update_metrics(&self.metrics, |m| m.jobs_rejected += 1);
        }
        result
    }

    /// Alias for [`submit`](Scheduler::submit).
    pub fn schedule(&self, job: Option<&Job<T>>) -> Result<(), SchedulerError> {
        self.submit(job)
    }

    fn try_submit(&self, job: Option<&Job<T>>) -> Result<(), SchedulerError> {
        let job = job.ok_or(SchedulerError::MissingJob)?;
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        // Check-and-set in one step so two racing submits cannot both win.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SchedulerError::Busy(job.name().to_string()));
        }

        let ordered = match self.order_workers(job) {
            Ok(ordered) => ordered,
            Err(e) => {
                self.in_flight.store(false, Ordering::Release);
                return Err(e);
            }
        };

        if !job.mark_submitted() {
            self.in_flight.store(false, Ordering::Release);
            return Err(SchedulerError::AlreadySubmitted(job.name().to_string()));
        }

        self.launch(&runtime, job, ordered);
        Ok(())
    }

    /// Apply the strategy and verify it only reordered the job's workers.
    fn order_workers(&self, job: &Job<T>) -> Result<Vec<Worker<T>>, SchedulerError> {
        let original: Vec<WorkerId> = job.workers().iter().map(Worker::id).collect();
        let ordered = self.strategy.schedule(job.workers().to_vec());

        verify_permutation(&original, &ordered).map_err(|reason| SchedulerError::InvalidSchedule {
            job: job.name().to_string(),
            strategy: self.strategy.name().to_string(),
            reason,
        })?;

        debug!(
            job = job.name(),
            strategy = self.strategy.name(),
            order = ?ordered.iter().map(Worker::name).collect::<Vec<_>>(),
            "workers ordered"
        );
        Ok(ordered)
    }
}
