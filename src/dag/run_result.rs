// src/dag/run_result.rs

//! The report returned for every DAG submission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::TaskName;
use crate::errors::ValidationError;
use crate::types::RunStatus;

/// Aggregated outcome of one `submit` call.
///
/// The same envelope is used for successful runs, partial runs, timed-out
/// runs and rejected submissions, so callers never have to handle a
/// different shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub status: RunStatus,
    pub duration_ms: u64,
    /// One entry per submitted task id.
    pub results: BTreeMap<TaskName, Value>,
    /// Tasks that ended SKIPPED, in submission order.
    pub skipped: Vec<TaskName>,
    /// Tasks that ended FAILED or TIMEOUT, in submission order.
    pub failed: Vec<TaskName>,
    /// Only set when the submission was rejected before execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    /// Result for an empty submission.
    pub fn empty() -> Self {
        Self {
            status: RunStatus::Completed,
            duration_ms: 0,
            results: BTreeMap::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            error: None,
        }
    }

    /// Result for a submission that failed validation. Nothing ran.
    pub fn rejected(err: &ValidationError) -> Self {
        Self {
            status: RunStatus::Failed,
            error: Some(err.to_string()),
            ..Self::empty()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}
