//! Consumer capabilities invoked by a job's drain loops.
//!
//! The data consumer sees every worker outcome; the error consumer sees
//! only outcomes that carried a failure. Both run on their own drain task,
//! concurrently with producers and with the caller, so implementations that
//! accumulate state must synchronize it themselves.

use std::fmt;
use std::sync::Arc;

use crate::error::TaskError;
use crate::types::WorkerId;

/// Performs some action on one data value.
///
/// Called once per worker outcome. A failed worker contributes `None`.
pub trait DataConsumer<T>: Send + Sync {
    fn consume(&self, value: Option<T>);
}

/// Performs some action on one worker failure.
pub trait ErrorConsumer: Send + Sync {
    fn consume(&self, failure: WorkerFailure);
}

impl<T, C: DataConsumer<T> + ?Sized> DataConsumer<T> for Arc<C> {
    fn consume(&self, value: Option<T>) {
        (**self).consume(value)
    }
}

impl<C: ErrorConsumer + ?Sized> ErrorConsumer for Arc<C> {
    fn consume(&self, failure: WorkerFailure) {
        (**self).consume(failure)
    }
}

/// A failure tagged with the worker that produced it.
#[derive(Debug)]
pub struct WorkerFailure {
    pub worker: String,
    pub worker_id: WorkerId,
    pub error: TaskError,
}

impl fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker [{}] failed: {}", self.worker, self.error)
    }
}

impl std::error::Error for WorkerFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

// ── Print consumers ──────────────────────────────────────────────────

/// Prints every value to stdout. Default data consumer of a [`Job`](crate::Job).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DataPrinter;

/// Prints every failure to stdout. Default error consumer of a [`Job`](crate::Job).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPrinter;

impl<T: fmt::Debug> DataConsumer<T> for DataPrinter {
    fn consume(&self, value: Option<T>) {
        match value {
            Some(v) => println!("worker value received: {:?}", v),
            None => println!("worker value received: <none>"),
        }
    }
}

impl ErrorConsumer for ErrorPrinter {
    fn consume(&self, failure: WorkerFailure) {
        println!("worker error: {}", failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Option<i32>>>);

    impl DataConsumer<i32> for Collect {
        fn consume(&self, value: Option<i32>) {
            self.0.lock().unwrap().push(value);
        }
    }

    #[test]
    fn arc_consumer_delegates() {
        let inner = Arc::new(Collect::default());
        let shared: Arc<dyn DataConsumer<i32>> = inner.clone();
        shared.consume(Some(3));
        shared.consume(None);
        assert_eq!(*inner.0.lock().unwrap(), vec![Some(3), None]);
    }

    #[test]
    fn failure_display_names_worker() {
        let failure = WorkerFailure {
            worker: "fetch".into(),
            worker_id: WorkerId::new(),
            error: TaskError::failed("timeout talking to upstream"),
        };
        assert_eq!(failure.to_string(), "worker [fetch] failed: timeout talking to upstream");
        assert!(std::error::Error::source(&failure).is_some());
    }

    #[test]
    fn printers_accept_any_outcome() {
        DataPrinter.consume(Some("value"));
        DataConsumer::<u8>::consume(&DataPrinter, None);
        ErrorPrinter.consume(WorkerFailure {
            worker: "w".into(),
            worker_id: WorkerId::new(),
            error: TaskError::failed("x"),
        });
    }
}
