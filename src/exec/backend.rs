// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The scheduler talks to an `Executor` instead of a concrete CLI. This makes
//! it easy to swap in a scripted executor in tests while keeping the
//! production implementation in [`command`](super::command).
//!
//! The only field of the returned object the scheduler looks at is `status`;
//! `"success"` means the task succeeded, anything else means it failed. The
//! rest of the object is passed through untouched into the run result.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boxed future returned by [`Executor::execute`].
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>>;

/// Status value that marks a successful executor result.
pub const SUCCESS_STATUS: &str = "success";

/// Trait abstracting how a single task is executed.
///
/// Production code uses [`DroidExecutor`](super::DroidExecutor); tests provide
/// their own implementation that doesn't spawn real processes.
pub trait Executor: Send + Sync {
    /// Execute one task and return its (normalized) result object.
    ///
    /// Returning `Err` is treated by the scheduler exactly like a result
    /// whose status is not `"success"`.
    fn execute(&self, payload: TaskPayload) -> ExecuteFuture<'_>;
}

/// What the executor receives for each task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub objective: String,
    #[serde(default)]
    pub instructions: String,
    /// Shared context of the submission, identical for every task.
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

/// Read the canonical `status` field of an executor result.
pub fn result_status(result: &Value) -> Option<&str> {
    result.get("status").and_then(Value::as_str)
}

/// Whether an executor result counts as success for scheduling purposes.
pub fn is_success(result: &Value) -> bool {
    result_status(result) == Some(SUCCESS_STATUS)
}
