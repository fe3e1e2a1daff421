use thiserror::Error;

/// Failure reported by a single worker's task.
///
/// Never surfaced from [`Scheduler::submit`](crate::Scheduler::submit);
/// delivered asynchronously to the job's [`ErrorConsumer`](crate::ErrorConsumer).
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskError {
    /// Shorthand for [`TaskError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors returned synchronously by the scheduler and config loader.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler: job cannot be absent")]
    MissingJob,

    #[error("scheduler: cannot schedule job [{0}], a job is already in progress")]
    Busy(String),

    #[error("scheduler: job [{0}] has already been submitted")]
    AlreadySubmitted(String),

    #[error("scheduler: strategy '{strategy}' returned an invalid ordering for job [{job}]: {reason}")]
    InvalidSchedule {
        job: String,
        strategy: String,
        reason: String,
    },

    #[error("scheduler: submit must be called from within a tokio runtime")]
    NoRuntime,

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}

impl SchedulerError {
    /// True for the in-flight conflict returned by a second `submit`.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}
