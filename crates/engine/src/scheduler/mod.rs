//! Job scheduler -- orders, launches, and synchronizes a job's workers.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructors, and accessor methods
//! - `submission`: the single-job guard and strategy application
//! - `execution`: worker tasks, drain loops, and the cleanup task

mod core;
mod execution;
mod submission;

pub use self::core::Scheduler;
