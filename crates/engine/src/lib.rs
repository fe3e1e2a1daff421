//! In-process job runner.
//!
//! A [`Job`] is a named batch of [`Worker`]s. A [`Scheduler`] orders the
//! workers with a [`SchedulingStrategy`], spawns one tokio task per worker,
//! and streams each outcome to the job's [`DataConsumer`] and
//! [`ErrorConsumer`] while the workers are still running. [`Job::wait`]
//! returns once every worker has finished and every outcome was consumed.
//!
//! ```ignore
//! let workers: Vec<Worker<u32>> = (0..10)
//!     .map(|i| Worker::from_task(task_fn(|| async { Ok(5) }), i.to_string()))
//!     .collect();
//! let job = Job::new("batch", workers);
//! let scheduler = Scheduler::default();
//! scheduler.submit(Some(&job))?;
//! job.wait().await;
//! ```

pub mod config;
pub mod consumer;
pub mod error;
pub mod job;
pub mod metrics;
pub mod scheduler;
pub mod strategy;
pub mod task;
pub mod types;
pub mod worker;

pub use config::SchedulerConfig;
pub use consumer::{DataConsumer, DataPrinter, ErrorConsumer, ErrorPrinter, WorkerFailure};
pub use error::{SchedulerError, TaskError};
pub use job::{Completion, Job};
pub use metrics::SchedulerMetrics;
pub use scheduler::Scheduler;
pub use strategy::{PriorityFirst, SchedulingStrategy, Sequential, StrategyKind};
pub use task::{task_fn, FnTask, Task};
pub use types::{Priority, WorkerId};
pub use worker::Worker;
