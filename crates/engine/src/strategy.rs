//! Scheduling strategies: pure reorderings applied before launch.
//!
//! A strategy decides only the order in which worker tasks are *spawned*.
//! All workers of a job still run concurrently, and results are consumed in
//! arrival order, so launch order never dictates consumption order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::WorkerId;
use crate::worker::Worker;

/// Reorders a job's workers before they are launched.
///
/// Must return the same workers it was given: no additions, removals, or
/// duplicates. The scheduler rejects any other result.
///
/// For example, given `[w1, w2, w3, w4, w5]` a strategy may return
/// `[w5, w3, w1, w2, w4]`; the workers are then spawned as
/// w5 → w3 → w1 → w2 → w4.
pub trait SchedulingStrategy<T>: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn schedule(&self, workers: Vec<Worker<T>>) -> Vec<Worker<T>>;
}

/// Launches workers in the order they appear in the job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sequential;

impl<T> SchedulingStrategy<T> for Sequential {
    fn name(&self) -> &str {
        "sequential"
    }

    fn schedule(&self, workers: Vec<Worker<T>>) -> Vec<Worker<T>> {
        workers
    }
}

/// Launches the most urgent workers first (`P0` before `P3`).
///
/// Workers without a priority go last; ties keep submission order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFirst;

impl<T> SchedulingStrategy<T> for PriorityFirst {
    fn name(&self) -> &str {
        "priority"
    }

    fn schedule(&self, mut workers: Vec<Worker<T>>) -> Vec<Worker<T>> {
        // `None` sorts before `Some`, so key on (is_none, priority).
        workers.sort_by_key(|w| (w.priority().is_none(), w.priority()));
        workers
    }
}

/// Built-in strategy selector used by configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Sequential,
    Priority,
}

impl StrategyKind {
    /// Build the strategy this kind names.
    pub fn build<T>(self) -> Box<dyn SchedulingStrategy<T>> {
        match self {
            Self::Sequential => Box::new(Sequential),
            Self::Priority => Box::new(PriorityFirst),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "priority" => Ok(Self::Priority),
            other => Err(format!("unknown strategy '{}' (expected 'sequential' or 'priority')", other)),
        }
    }
}

/// Check that `scheduled` is a permutation of `original`.
///
/// Returns a description of the first violation found.
pub(crate) fn verify_permutation<T>(original: &[WorkerId], scheduled: &[Worker<T>]) -> Result<(), String> {
    if original.len() != scheduled.len() {
        return Err(format!(
            "expected {} workers, strategy returned {}",
            original.len(),
            scheduled.len()
        ));
    }

    let mut remaining: HashMap<WorkerId, usize> = HashMap::with_capacity(original.len());
    for id in original {
        *remaining.entry(*id).or_default() += 1;
    }

    for worker in scheduled {
        match remaining.get_mut(&worker.id()) {
            Some(count) if *count > 0 => *count -= 1,
            Some(_) => return Err(format!("worker '{}' was duplicated", worker.name())),
            None => return Err(format!("worker '{}' is not part of the job", worker.name())),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::task::task_fn;
    use crate::types::Priority;

    fn worker(name: &str, priority: Option<Priority>) -> Worker<()> {
        let w = Worker::from_task(task_fn(|| async { Ok::<_, TaskError>(()) }), name);
        match priority {
            Some(p) => w.with_priority(p),
            None => w,
        }
    }

    fn names(workers: &[Worker<()>]) -> Vec<&str> {
        workers.iter().map(|w| w.name()).collect()
    }

    #[test]
    fn sequential_is_identity() {
        let workers = vec![worker("a", Some(Priority::P3)), worker("b", None), worker("c", Some(Priority::P0))];
        let out = SchedulingStrategy::schedule(&Sequential, workers);
        assert_eq!(names(&out), vec!["a", "b", "c"]);
    }

    #[test]
    fn priority_first_is_stable_and_puts_unprioritized_last() {
        let workers = vec![
            worker("none-1", None),
            worker("p2-a", Some(Priority::P2)),
            worker("p0", Some(Priority::P0)),
            worker("p2-b", Some(Priority::P2)),
            worker("none-2", None),
            worker("p1", Some(Priority::P1)),
        ];
        let out = SchedulingStrategy::schedule(&PriorityFirst, workers);
        assert_eq!(names(&out), vec!["p0", "p1", "p2-a", "p2-b", "none-1", "none-2"]);
    }

    #[test]
    fn verify_accepts_reordering() {
        let workers = vec![worker("a", None), worker("b", None)];
        let ids: Vec<WorkerId> = workers.iter().map(|w| w.id()).collect();
        let reversed: Vec<_> = workers.into_iter().rev().collect();
        assert!(verify_permutation(&ids, &reversed).is_ok());
    }

    #[test]
    fn verify_rejects_dropped_and_duplicated_workers() {
        let workers = vec![worker("a", None), worker("b", None)];
        let ids: Vec<WorkerId> = workers.iter().map(|w| w.id()).collect();

        let dropped = vec![workers[0].clone()];
        assert!(verify_permutation(&ids, &dropped).unwrap_err().contains("expected 2"));

        let duplicated = vec![workers[0].clone(), workers[0].clone()];
        assert!(verify_permutation(&ids, &duplicated).unwrap_err().contains("duplicated"));

        let foreign = vec![workers[0].clone(), worker("x", None)];
        assert!(verify_permutation(&ids, &foreign).unwrap_err().contains("not part of the job"));
    }

    #[test]
    fn strategy_kind_parses_and_builds() {
        assert_eq!("Priority".parse::<StrategyKind>(), Ok(StrategyKind::Priority));
        assert_eq!(" sequential ".parse::<StrategyKind>(), Ok(StrategyKind::Sequential));
        assert!("random".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::Priority.build::<()>().name(), "priority");
        assert_eq!(StrategyKind::default().build::<()>().name(), "sequential");
    }
}
