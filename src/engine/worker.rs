// src/engine/worker.rs

//! Worker loops that pull ready tasks and hand them to the executor.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

use crate::dag::Scheduler;
use crate::exec::{Executor, IssueKind, TaskPayload, error_result, result_status};

use super::queue::ReadyQueue;

/// State shared by all workers of one run.
pub struct RunShared {
    /// The single lock guarding every read-then-write of task state and the
    /// release of dependents.
    pub scheduler: Mutex<Scheduler>,
    pub queue: ReadyQueue,
    pub executor: Arc<dyn Executor>,
    /// Flipped to `true` by the worker whose completion finished the run.
    pub done_tx: watch::Sender<bool>,
}

/// Aborts the wrapped task when dropped.
///
/// Ties an in-flight executor call to the worker awaiting it, so aborting
/// the worker (deadline exceeded) also cancels the executor future.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Main loop of a single worker.
///
/// - waits for the next ready task, or for the run to finish
/// - QUEUED -> RUNNING under the scheduler lock
/// - calls the executor with the lock released
/// - records the result and enqueues released dependents under the lock
pub async fn worker_loop(worker_id: usize, shared: Arc<RunShared>) {
    let mut done_rx = shared.done_tx.subscribe();
    debug!(worker_id, "worker started");

    loop {
        if *done_rx.borrow() {
            break;
        }

        // Waiting on the queue may take forever once the run is over, so race
        // it against the completion signal.
        let task = tokio::select! {
            _ = done_rx.changed() => continue,
            task = shared.queue.pop() => task,
        };

        let Some(task) = task else {
            debug!(worker_id, "ready queue closed; worker exiting");
            break;
        };

        let payload = {
            let mut scheduler = shared.scheduler.lock().await;
            scheduler.begin_task(&task)
        };
        let Some(payload) = payload else {
            continue;
        };

        info!(worker_id, task = %task, "running task");
        let result = call_executor(&shared.executor, &task, payload).await;
        info!(
            worker_id,
            task = %task,
            status = result_status(&result).unwrap_or("<missing>"),
            "task finished"
        );

        let mut scheduler = shared.scheduler.lock().await;
        let step = scheduler.handle_completion(&task, result);

        for next in step.newly_queued {
            shared.queue.push(next);
        }

        if step.run_just_finished {
            // Ignore send errors: the runtime may already have stopped waiting.
            let _ = shared.done_tx.send(true);
        }
    }

    debug!(worker_id, "worker finished");
}

/// Run one executor call in its own Tokio task.
///
/// Never fails: an executor error or panic becomes an `"error"` result, which
/// the scheduler classifies as FAILED like any other non-success status.
async fn call_executor(executor: &Arc<dyn Executor>, task: &str, payload: TaskPayload) -> Value {
    let executor = Arc::clone(executor);
    let handle = tokio::spawn(async move { executor.execute(payload).await });
    let _guard = AbortOnDrop(handle.abort_handle());

    match handle.await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            error!(task = %task, error = %err, "executor returned an error");
            error_result("error", IssueKind::Executor, &format!("Executor error: {err:#}"))
        }
        Err(join_err) if join_err.is_panic() => {
            error!(task = %task, "executor panicked");
            error_result(
                "error",
                IssueKind::Executor,
                "Executor panicked while running the task",
            )
        }
        Err(join_err) => {
            error!(task = %task, error = %join_err, "executor call was cancelled");
            error_result("error", IssueKind::Executor, "Executor call was cancelled")
        }
    }
}
