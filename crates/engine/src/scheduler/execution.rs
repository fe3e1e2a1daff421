use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::consumer::{DataConsumer, ErrorConsumer, WorkerFailure};
use crate::error::TaskError;
use crate::job::{Completion, Job};
use crate::metrics::SchedulerMetrics;
use crate::worker::Worker;

use super::core::update_metrics;
use super::Scheduler;

/// Everything a worker task needs besides its worker.
struct WorkerContext<T> {
    job: Arc<str>,
    data_tx: UnboundedSender<Option<T>>,
    error_tx: UnboundedSender<Option<WorkerFailure>>,
    metrics: Arc<RwLock<SchedulerMetrics>>,
    debug: bool,
}

/// State owned by the cleanup task of one submission.
struct JobRun<T> {
    job: Arc<str>,
    workers: JoinSet<()>,
    data_tx: UnboundedSender<Option<T>>,
    error_tx: UnboundedSender<Option<WorkerFailure>>,
    data_drain: JoinHandle<()>,
    error_drain: JoinHandle<()>,
    in_flight: Arc<AtomicBool>,
    completion: Completion,
    metrics: Arc<RwLock<SchedulerMetrics>>,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Spawn N worker tasks in `ordered` order, then the two drain loops and
    /// the cleanup task. Called with the in-flight flag already held.
    pub(super) fn launch(&self, runtime: &Handle, job: &Job<T>, ordered: Vec<Worker<T>>) {
        let job_name: Arc<str> = Arc::from(job.name());
        let completion = job.completion();
        self.set_current(completion.clone());
        update_metrics(&self.metrics, |m| m.jobs_submitted += 1);

        info!(
            job = %job_name,
            workers = ordered.len(),
            strategy = self.strategy.name(),
            "job submitted"
        );

        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let mut workers = JoinSet::new();
        for worker in ordered {
            let ctx = WorkerContext {
                job: Arc::clone(&job_name),
                data_tx: data_tx.clone(),
                error_tx: error_tx.clone(),
                metrics: Arc::clone(&self.metrics),
                debug: self.debug,
            };
            workers.spawn_on(run_worker(worker, ctx), runtime);
        }

        let data_drain = runtime.spawn(drain_data(
            Arc::clone(&job_name),
            data_rx,
            job.data_consumer(),
            Arc::clone(&self.metrics),
        ));
        let error_drain = runtime.spawn(drain_errors(
            Arc::clone(&job_name),
            error_rx,
            job.error_consumer(),
            Arc::clone(&self.metrics),
        ));

        runtime.spawn(cleanup(JobRun {
            job: job_name,
            workers,
            data_tx,
            error_tx,
            data_drain,
            error_drain,
            in_flight: Arc::clone(&self.in_flight),
            completion,
            metrics: Arc::clone(&self.metrics),
        }));
    }
}

// ── Worker task ──────────────────────────────────────────────────────

/// Run one worker and push exactly one item onto each stream.
async fn run_worker<T: Send + 'static>(worker: Worker<T>, ctx: WorkerContext<T>) {
    if ctx.debug {
        info!(job = %ctx.job, worker = worker.name(), "starting worker");
    } else {
        debug!(job = %ctx.job, worker = worker.name(), "starting worker");
    }
    update_metrics(&ctx.metrics, |m| m.active_workers += 1);

    let started = Instant::now();
    let task = worker.task();
    let outcome = match AssertUnwindSafe(task.run()).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(TaskError::Panicked(panic_message(panic.as_ref()))),
    };
    let elapsed = started.elapsed();

    let (value, failure) = match outcome {
        Ok(value) => (Some(value), None),
        Err(error) => {
            warn!(job = %ctx.job, worker = worker.name(), error = %error, "worker failed");
            let failure = WorkerFailure {
                worker: worker.name().to_string(),
                worker_id: worker.id(),
                error,
            };
            (None, Some(failure))
        }
    };

    update_metrics(&ctx.metrics, |m| {
        m.active_workers = m.active_workers.saturating_sub(1);
        m.record_execution(elapsed, failure.is_some());
    });

    if ctx.data_tx.send(value).is_err() {
        warn!(job = %ctx.job, worker = worker.name(), "data stream closed, dropping value");
    }
    if ctx.error_tx.send(failure).is_err() {
        warn!(job = %ctx.job, worker = worker.name(), "error stream closed, dropping failure");
    }

    if ctx.debug {
        info!(job = %ctx.job, worker = worker.name(), elapsed = ?elapsed, "ended worker");
    } else {
        debug!(job = %ctx.job, worker = worker.name(), elapsed = ?elapsed, "ended worker");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ── Drain loops ──────────────────────────────────────────────────────

/// A panicking consumer call is logged and counted; draining continues so
/// every outcome is still offered.
async fn drain_data<T>(
    job: Arc<str>,
    mut rx: UnboundedReceiver<Option<T>>,
    consumer: Arc<dyn DataConsumer<T>>,
    metrics: Arc<RwLock<SchedulerMetrics>>,
) {
    while let Some(value) = rx.recv().await {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| consumer.consume(value)));
        if let Err(payload) = &outcome {
            error!(job = %job, panic = %panic_message(payload.as_ref()), "data consumer panicked");
        }
        update_metrics(&metrics, |m| {
            m.values_consumed += 1;
            if outcome.is_err() {
                m.consumer_panics += 1;
            }
        });
    }
}

/// Absent failures keep the stream length equal to the worker count but are
/// not forwarded to the consumer.
async fn drain_errors(
    job: Arc<str>,
    mut rx: UnboundedReceiver<Option<WorkerFailure>>,
    consumer: Arc<dyn ErrorConsumer>,
    metrics: Arc<RwLock<SchedulerMetrics>>,
) {
    while let Some(item) = rx.recv().await {
        let Some(failure) = item else { continue };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| consumer.consume(failure)));
        if let Err(payload) = &outcome {
            error!(job = %job, panic = %panic_message(payload.as_ref()), "error consumer panicked");
        }
        update_metrics(&metrics, |m| {
            m.errors_consumed += 1;
            if outcome.is_err() {
                m.consumer_panics += 1;
            }
        });
    }
}

// ── Cleanup ──────────────────────────────────────────────────────────

/// Wait for every worker, close both streams, wait for both drains, then
/// release the scheduler and fire the completion signal.
async fn cleanup<T: Send + 'static>(mut run: JobRun<T>) {
    while let Some(joined) = run.workers.join_next().await {
        if let Err(e) = joined {
            error!(job = %run.job, error = %e, "worker task did not finish cleanly");
        }
    }

    // Workers dropped their clones on exit; these are the last senders.
    drop(run.data_tx);
    drop(run.error_tx);

    if let Err(e) = run.data_drain.await {
        error!(job = %run.job, error = %e, "data consumer loop failed");
    }
    if let Err(e) = run.error_drain.await {
        error!(job = %run.job, error = %e, "error consumer loop failed");
    }

    run.in_flight.store(false, Ordering::Release);
    update_metrics(&run.metrics, |m| m.jobs_completed += 1);
    info!(job = %run.job, "job complete");
    run.completion.complete();
}
