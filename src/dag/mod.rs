// src/dag/mod.rs

//! DAG representation and scheduling.
//!
//! Everything in here is synchronous and free of IO, so it can be tested
//! step by step without Tokio.
//!
//! - [`graph`] builds and validates the task graph of one submission.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   tasks are ready to run, and which must be skipped.
//! - [`task_info`] holds submitted task definitions and per-run task state.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] applies per-task state transitions.
//! - [`run_result`] is the report returned to callers.

pub mod graph;
pub mod run_result;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::TaskGraph;
pub use run_result::RunResult;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{TaskDef, TaskInfo};
