use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single task within one scheduler run.
///
/// States only ever move forward; see [`TaskStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting on at least one dependency.
    Pending,
    /// Dependencies satisfied; sitting on the ready queue.
    Queued,
    /// Handed to the executor.
    Running,
    Success,
    Failed,
    /// Never ran because a dependency failed, was skipped or timed out.
    Skipped,
    /// Still pending or queued when the whole-graph deadline elapsed.
    Timeout,
}

impl TaskStatus {
    /// SUCCESS, FAILED, SKIPPED and TIMEOUT are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Success | TaskStatus::Failed | TaskStatus::Skipped | TaskStatus::Timeout
        )
    }

    /// Whether a dependency in this state prevents its dependents from running.
    pub fn blocks_dependents(self) -> bool {
        matches!(
            self,
            TaskStatus::Failed | TaskStatus::Skipped | TaskStatus::Timeout
        )
    }

    /// Allowed edges of the per-task state machine.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Queued)
                | (Pending, Skipped)
                | (Pending, Timeout)
                | (Queued, Running)
                | (Queued, Timeout)
                | (Running, Success)
                | (Running, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall outcome of one DAG submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every task succeeded.
    Completed,
    /// Some tasks succeeded, others did not.
    Partial,
    /// No task succeeded (or the submission was rejected).
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Completed => "completed",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}
