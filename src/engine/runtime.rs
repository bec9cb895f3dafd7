// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::dag::{RunResult, Scheduler, TaskDef};
use crate::exec::Executor;

use super::RuntimeOptions;
use super::queue::ReadyQueue;
use super::worker::{RunShared, worker_loop};

/// Runs task graphs against an [`Executor`].
///
/// Every call to [`submit`](DagScheduler::submit) gets its own scheduler
/// state, ready queue and worker pool; only the executor is shared, so
/// concurrent submissions never interfere with each other.
pub struct DagScheduler {
    executor: Arc<dyn Executor>,
    options: RuntimeOptions,
}

impl fmt::Debug for DagScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DagScheduler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DagScheduler {
    pub fn new(executor: Arc<dyn Executor>, options: RuntimeOptions) -> Self {
        Self { executor, options }
    }

    pub fn options(&self) -> RuntimeOptions {
        self.options
    }

    /// Validate and run one task graph, returning once every task is
    /// terminal or the whole-graph deadline has passed.
    ///
    /// Never fails: validation problems and task failures are reported in
    /// the returned [`RunResult`].
    pub async fn submit(&self, defs: Vec<TaskDef>, context: Value) -> RunResult {
        let started = Instant::now();

        if defs.is_empty() {
            info!("empty DAG submitted; nothing to do");
            return RunResult::empty();
        }

        let mut scheduler = match Scheduler::from_defs(&defs, context) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "rejecting DAG submission");
                return RunResult::rejected(&err);
            }
        };

        let queue = ReadyQueue::new();
        for task in scheduler.start() {
            queue.push(task);
        }

        let worker_count = self.options.max_workers.min(scheduler.len()).max(1);
        let (done_tx, mut done_rx) = watch::channel(false);

        let shared = Arc::new(RunShared {
            scheduler: Mutex::new(scheduler),
            queue,
            executor: Arc::clone(&self.executor),
            done_tx,
        });

        info!(
            tasks = defs.len(),
            workers = worker_count,
            timeout_secs = self.options.dag_timeout.as_secs(),
            "DAG run started"
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            workers.spawn(worker_loop(worker_id, Arc::clone(&shared)));
        }

        // The `Ref` returned by `wait_for` must not outlive this expression:
        // it holds the watch lock that workers need to signal completion.
        let finished = timeout(self.options.dag_timeout, async {
            done_rx.wait_for(|done| *done).await.map(|_| ())
        })
        .await;

        let completed = matches!(finished, Ok(Ok(())));
        if matches!(finished, Ok(Err(_))) {
            warn!("completion signal dropped; treating run as timed out");
        }

        let result = {
            let mut scheduler = shared.scheduler.lock().await;
            if !completed && !scheduler.is_finished() {
                scheduler.force_timeout();
            }
            scheduler.build_result(started.elapsed())
        };

        if completed {
            // Workers exit on their own once the done flag is set.
            while workers.join_next().await.is_some() {}
        } else {
            // Best effort: abort workers (and through them in-flight executor
            // calls) without waiting for them to wind down.
            workers.abort_all();
        }

        info!(
            status = %result.status,
            duration_ms = result.duration_ms,
            skipped = result.skipped.len(),
            failed = result.failed.len(),
            "DAG run finished"
        );

        result
    }
}

/// One-shot helper: run `tasks` with a fresh [`DagScheduler`].
///
/// A `null` context is replaced by an empty object.
pub async fn execute_dag(
    tasks: Vec<TaskDef>,
    context: Value,
    executor: Arc<dyn Executor>,
    options: RuntimeOptions,
) -> RunResult {
    let context = match context {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    DagScheduler::new(executor, options).submit(tasks, context).await
}
