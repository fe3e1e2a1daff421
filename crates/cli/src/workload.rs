//! Demo workload: sleeping workers and a summing consumer.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use jobrunner_engine::{DataConsumer, Priority, Task, TaskError, Worker};

/// Sleeps, then returns its index or fails.
pub struct SleepTask {
    index: u64,
    sleep: Duration,
    fail: bool,
}

#[async_trait]
impl Task for SleepTask {
    type Output = u64;

    async fn run(&self) -> Result<u64, TaskError> {
        tokio::time::sleep(self.sleep).await;
        if self.fail {
            return Err(TaskError::failed(format!("worker {} gave up", self.index)));
        }
        Ok(self.index)
    }
}

/// Deterministic spread of sleep durations in `0..=max_sleep_ms`.
fn sleep_for(index: u64, max_sleep_ms: u64) -> Duration {
    if max_sleep_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(index.wrapping_mul(7919) % (max_sleep_ms + 1))
}

/// Build `count` workers; every `fail_every`-th one fails (0 = never).
pub fn build_workers(count: usize, max_sleep_ms: u64, fail_every: usize) -> Vec<Worker<u64>> {
    (0..count)
        .map(|i| {
            let index = i as u64;
            let task = SleepTask {
                index,
                sleep: sleep_for(index, max_sleep_ms),
                fail: fail_every > 0 && (i + 1) % fail_every == 0,
            };
            Worker::from_task(task, format!("worker-{}", i)).with_priority(Priority::ALL[i % Priority::ALL.len()])
        })
        .collect()
}

/// Prints each value and keeps a running total.
#[derive(Default)]
pub struct SumConsumer {
    total: AtomicU64,
    received: AtomicUsize,
}

impl SumConsumer {
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl DataConsumer<u64> for SumConsumer {
    fn consume(&self, value: Option<u64>) {
        self.received.fetch_add(1, Ordering::SeqCst);
        match value {
            Some(v) => {
                self.total.fetch_add(v, Ordering::SeqCst);
                println!("worker value received: {}", v);
            }
            None => println!("worker value received: <none>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_cycle_through_all_levels() {
        let workers = build_workers(9, 0, 3);
        assert_eq!(workers.len(), 9);
        assert_eq!(workers[0].priority(), Some(Priority::P0));
        assert_eq!(workers[5].priority(), Some(Priority::P1));
    }

    #[test]
    fn sleep_stays_within_bound() {
        for i in 0..200 {
            assert!(sleep_for(i, 25) <= Duration::from_millis(25));
        }
        assert_eq!(sleep_for(17, 0), Duration::ZERO);
    }

    #[tokio::test]
    async fn kth_worker_fails() {
        let failing = SleepTask {
            index: 2,
            sleep: Duration::ZERO,
            fail: true,
        };
        let err = failing.run().await.unwrap_err();
        assert!(err.to_string().contains("worker 2"));

        let ok = SleepTask {
            index: 4,
            sleep: Duration::ZERO,
            fail: false,
        };
        assert_eq!(ok.run().await.unwrap(), 4);
    }

    #[test]
    fn sum_consumer_counts_absent_values() {
        let sum = SumConsumer::default();
        sum.consume(Some(3));
        sum.consume(None);
        sum.consume(Some(4));
        assert_eq!(sum.total(), 7);
        assert_eq!(sum.received(), 3);
    }
}
