// src/engine/mod.rs

//! Async runtime around the DAG scheduler.
//!
//! This module ties together:
//! - the pure scheduling core ([`crate::dag::Scheduler`]) behind a single lock
//! - the ready queue that workers pull task ids from
//! - a bounded pool of worker loops that call the [`Executor`](crate::exec::Executor)
//! - the whole-graph deadline and the completion signal
//!
//! The semantics live in the core; [`runtime`] is only the async shell.

use std::time::Duration;

/// Canonical task id type used throughout the engine.
pub type TaskName = String;

/// Default upper bound on concurrently running tasks.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Default whole-graph deadline (one hour).
pub const DEFAULT_DAG_TIMEOUT: Duration = Duration::from_secs(3600);

/// Runtime options for one scheduler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Maximum number of worker loops. The actual pool size is
    /// `min(max_workers, task_count)`.
    pub max_workers: usize,
    /// Whole-graph deadline for one submission.
    pub dag_timeout: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            dag_timeout: DEFAULT_DAG_TIMEOUT,
        }
    }
}

pub mod queue;
pub mod runtime;
pub mod worker;

pub use queue::ReadyQueue;
pub use runtime::{DagScheduler, execute_dag};
