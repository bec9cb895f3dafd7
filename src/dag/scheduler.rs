use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::run_result::RunResult;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::StateManager;
use crate::dag::task_info::{TaskDef, TaskInfo};
use crate::engine::TaskName;
use crate::errors::ValidationError;
use crate::exec::{TaskPayload, is_success, result_status};
use crate::types::{RunStatus, TaskStatus};

/// Scheduler holds the immutable DAG plus the mutable state of one run.
///
/// It is responsible for:
/// - queueing root tasks when the run starts
/// - marking tasks running / succeeded / failed
/// - releasing dependents once all their dependencies are done
/// - skipping dependents (transitively) when a dependency does not succeed
/// - timing out whatever has not started when the deadline hits
/// - aggregating the final [`RunResult`]
///
/// The scheduler is synchronous and does no IO; the async worker pool in
/// [`crate::engine`] drives it under a lock.
#[derive(Debug)]
pub struct Scheduler {
    graph: TaskGraph,
    tasks: HashMap<TaskName, TaskInfo>,
    /// Shared, read-only context handed to every executor call.
    context: Value,
    started: bool,
    finished: bool,
}

impl Scheduler {
    /// Validate the submitted definitions and build a scheduler for them.
    pub fn from_defs(defs: &[TaskDef], context: Value) -> Result<Self, ValidationError> {
        let graph = TaskGraph::from_defs(defs)?;

        let mut tasks = HashMap::with_capacity(defs.len());
        for def in defs {
            // Validation guarantees every id is present and unique.
            let Some(id) = def.id.clone() else { continue };
            let deps = graph.dependencies_of(&id).to_vec();
            tasks.insert(id.clone(), TaskInfo::from_def(id, def, deps));
        }

        Ok(Self {
            graph,
            tasks,
            context,
            started: false,
            finished: false,
        })
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Whether every task has reached a terminal state (or the deadline hit).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn status_of(&self, task: &str) -> Option<TaskStatus> {
        self.tasks.get(task).map(|info| info.status)
    }

    pub fn result_of(&self, task: &str) -> Option<&Value> {
        self.tasks.get(task).and_then(|info| info.result.as_ref())
    }

    /// Start the run: every task without dependencies becomes QUEUED.
    ///
    /// Returns the queued tasks in submission order. Calling this twice is a
    /// no-op the second time.
    pub fn start(&mut self) -> Vec<TaskName> {
        if self.started {
            warn!("scheduler: start called twice; ignoring");
            return Vec::new();
        }
        self.started = true;

        let roots = self.graph.roots();
        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        let queued: Vec<TaskName> = roots
            .into_iter()
            .filter(|id| manager.transition(id, TaskStatus::Queued))
            .collect();

        info!(
            tasks = self.graph.len(),
            roots = queued.len(),
            "scheduler: starting DAG run"
        );

        if self.graph.is_empty() {
            self.finished = true;
        }

        queued
    }

    /// Take a queued task off the queue: QUEUED -> RUNNING.
    ///
    /// Returns the executor payload, or `None` if the task is no longer
    /// QUEUED (e.g. it was timed out while waiting on the ready queue).
    pub fn begin_task(&mut self, task: &str) -> Option<TaskPayload> {
        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        if !manager.transition(task, TaskStatus::Running) {
            debug!(task = %task, "task not queued any more; not starting it");
            return None;
        }

        let info = self.tasks.get(task)?;
        Some(info.payload(&self.context))
    }

    /// Handle the executor's result for a running task.
    ///
    /// `result.status == "success"` moves the task to SUCCESS, anything else
    /// to FAILED. Dependents are then released or skipped.
    pub fn handle_completion(&mut self, task: &str, result: Value) -> SchedulerStep {
        let next = if is_success(&result) {
            TaskStatus::Success
        } else {
            TaskStatus::Failed
        };

        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        if !manager.transition(task, next) {
            warn!(task = %task, "completion for task that is not running; ignoring");
            return SchedulerStep::default();
        }

        if next == TaskStatus::Success {
            debug!(task = %task, "task completed successfully");
        } else {
            warn!(
                task = %task,
                status = result_status(&result).unwrap_or("<missing>"),
                "task failed; skipping dependents"
            );
        }

        if let Some(info) = self.tasks.get_mut(task) {
            info.result = Some(result);
        }

        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        let released = manager.release_dependents(task);

        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_queued: released.queued,
            newly_skipped: released.skipped,
            run_just_finished,
        }
    }

    /// Whole-graph deadline elapsed: every PENDING or QUEUED task becomes
    /// TIMEOUT and the run is over. RUNNING tasks are left as they are.
    pub fn force_timeout(&mut self) -> Vec<TaskName> {
        let mut manager = StateManager::new(&self.graph, &mut self.tasks);
        let timed_out = manager.mark_unfinished_timed_out();

        let still_running: Vec<&str> = self
            .graph
            .tasks()
            .filter(|id| self.status_of(id) == Some(TaskStatus::Running))
            .collect();

        warn!(
            timed_out = timed_out.len(),
            ?still_running,
            "scheduler: DAG deadline exceeded"
        );

        self.finished = true;
        timed_out
    }

    /// Aggregate the final report for this run.
    ///
    /// `completed` when nothing was skipped, failed or timed out; otherwise
    /// `partial` if at least one task succeeded, else `failed`.
    pub fn build_result(&self, duration: Duration) -> RunResult {
        let mut results = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();
        let mut successes = 0usize;

        for id in self.graph.tasks() {
            let Some(info) = self.tasks.get(id) else { continue };
            results.insert(id.to_string(), info.result_or_placeholder());

            match info.status {
                TaskStatus::Success => successes += 1,
                TaskStatus::Skipped => skipped.push(id.to_string()),
                TaskStatus::Failed | TaskStatus::Timeout => failed.push(id.to_string()),
                _ => {}
            }
        }

        // A task still RUNNING at the deadline is neither skipped nor failed,
        // so it does not keep the run from being completed.
        let status = if skipped.is_empty() && failed.is_empty() {
            RunStatus::Completed
        } else if successes > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        };

        RunResult {
            status,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            results,
            skipped,
            failed,
            error: None,
        }
    }

    /// Mark the run finished once every task is terminal.
    ///
    /// Returns `true` only for the call that performed the transition.
    fn maybe_finish_run(&mut self) -> bool {
        if self.finished {
            return false;
        }

        let manager = StateManager::new(&self.graph, &mut self.tasks);
        if manager.all_tasks_terminal() {
            info!("scheduler: all tasks terminal; marking run as finished");
            self.finished = true;
            true
        } else {
            false
        }
    }
}
