// src/dag/state_manager.rs

//! Per-run state transitions for tasks in the scheduler.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dag::task_info::TaskInfo;
use crate::dag::TaskGraph;
use crate::engine::TaskName;
use crate::types::TaskStatus;

/// Tasks whose state changed while releasing dependents.
#[derive(Debug, Default)]
pub struct Released {
    pub queued: Vec<TaskName>,
    pub skipped: Vec<TaskName>,
}

/// Applies state-machine transitions to the tasks of one run.
pub struct StateManager<'a> {
    graph: &'a TaskGraph,
    tasks: &'a mut HashMap<TaskName, TaskInfo>,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a TaskGraph, tasks: &'a mut HashMap<TaskName, TaskInfo>) -> Self {
        Self { graph, tasks }
    }

    /// Move `task` to `next` if the state machine allows it.
    ///
    /// Returns `false` (and leaves the task untouched) for unknown tasks and
    /// for transitions that would move a task backwards or out of a terminal
    /// state.
    pub fn transition(&mut self, task: &str, next: TaskStatus) -> bool {
        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, "transition for unknown task; ignoring");
            return false;
        };

        if !info.status.can_transition_to(next) {
            debug!(
                task = %task,
                from = %info.status,
                to = %next,
                "rejecting illegal task transition"
            );
            return false;
        }

        debug!(task = %task, from = %info.status, to = %next, "task transition");
        info.status = next;
        true
    }

    pub fn status_of(&self, task: &str) -> Option<TaskStatus> {
        self.tasks.get(task).map(|info| info.status)
    }

    /// Re-evaluate the pending dependents of a task that just reached a
    /// terminal state.
    ///
    /// - any dependency FAILED / SKIPPED / TIMEOUT: the dependent is SKIPPED,
    ///   and its own dependents are re-evaluated in turn
    /// - all dependencies terminal: the dependent is QUEUED
    /// - otherwise it stays PENDING
    pub fn release_dependents(&mut self, finished: &str) -> Released {
        let graph = self.graph;
        let mut released = Released::default();
        let mut stack: Vec<TaskName> = vec![finished.to_string()];

        while let Some(name) = stack.pop() {
            for dependent in graph.dependents_of(&name) {
                if self.status_of(dependent) != Some(TaskStatus::Pending) {
                    continue;
                }

                let deps = graph.dependencies_of(dependent);
                let any_blocked = deps.iter().any(|d| {
                    self.status_of(d)
                        .is_some_and(TaskStatus::blocks_dependents)
                });
                let all_done = deps
                    .iter()
                    .all(|d| self.status_of(d).is_some_and(TaskStatus::is_terminal));

                if any_blocked {
                    if self.transition(dependent, TaskStatus::Skipped) {
                        debug!(
                            task = %dependent,
                            upstream = %name,
                            "skipping task due to upstream failure"
                        );
                        released.skipped.push(dependent.clone());
                        stack.push(dependent.clone());
                    }
                } else if all_done && self.transition(dependent, TaskStatus::Queued) {
                    released.queued.push(dependent.clone());
                }
            }
        }

        released
    }

    /// Force every PENDING or QUEUED task to TIMEOUT.
    ///
    /// Returns the affected tasks in submission order.
    pub fn mark_unfinished_timed_out(&mut self) -> Vec<TaskName> {
        let graph = self.graph;
        let mut timed_out = Vec::new();

        for id in graph.tasks() {
            if matches!(
                self.status_of(id),
                Some(TaskStatus::Pending) | Some(TaskStatus::Queued)
            ) && self.transition(id, TaskStatus::Timeout)
            {
                timed_out.push(id.to_string());
            }
        }

        timed_out
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks.values().all(|info| info.status.is_terminal())
    }
}
