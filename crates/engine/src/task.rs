use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// The computation a [`Worker`](crate::Worker) executes.
///
/// The scheduler calls [`run`](Task::run) exactly once per worker execution,
/// from a freshly spawned tokio task. `Ok(value)` is a value with no failure;
/// `Err(e)` is a failure whose data outcome is the absent value.
#[async_trait]
pub trait Task: Send + Sync {
    /// Value produced on success.
    type Output: Send + 'static;

    /// Run to completion.
    async fn run(&self) -> Result<Self::Output, TaskError>;
}

/// Blanket implementation so `Arc<T>` can be used directly as a task.
#[async_trait]
impl<T: Task + ?Sized> Task for Arc<T> {
    type Output = T::Output;

    async fn run(&self) -> Result<Self::Output, TaskError> {
        (**self).run().await
    }
}

// ── Closure adapter ──────────────────────────────────────────────────

/// Adapts an async closure into a [`Task`]. Build with [`task_fn`].
pub struct FnTask<F> {
    f: F,
}

/// Wrap an async closure as a task.
///
/// ```ignore
/// let task = task_fn(|| async { Ok::<_, TaskError>(5) });
/// ```
pub fn task_fn<F, Fut, T>(f: F) -> FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, TaskError>> + Send,
    T: Send + 'static,
{
    FnTask { f }
}

#[async_trait]
impl<F, Fut, T> Task for FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, TaskError>> + Send,
    T: Send + 'static,
{
    type Output = T;

    async fn run(&self) -> Result<T, TaskError> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(u32);

    #[async_trait]
    impl Task for Constant {
        type Output = u32;

        async fn run(&self) -> Result<u32, TaskError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn closure_task_runs() {
        let task = task_fn(|| async { Ok::<_, TaskError>("done") });
        assert_eq!(task.run().await.unwrap(), "done");
    }

    #[tokio::test]
    async fn closure_task_reports_failure() {
        let task = task_fn(|| async { Err::<u8, _>(TaskError::failed("boom")) });
        let err = task.run().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn arc_task_delegates() {
        let task: Arc<dyn Task<Output = u32>> = Arc::new(Constant(7));
        assert_eq!(task.run().await.unwrap(), 7);
        let shared = Arc::new(Constant(9));
        assert_eq!(Task::run(&shared).await.unwrap(), 9);
    }
}
