// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::engine::TaskName;

/// Structured result of a single scheduler "step".
///
/// The async runtime uses `newly_queued` to feed the ready queue; tests use
/// the whole struct to manually step the DAG and make assertions about what
/// changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Tasks that became ready to run as a result of this step.
    pub newly_queued: Vec<TaskName>,
    /// Tasks that were skipped in this step because an upstream task failed,
    /// was skipped or timed out.
    pub newly_skipped: Vec<TaskName>,
    /// Whether this step caused every task to reach a terminal state.
    pub run_just_finished: bool,
}
