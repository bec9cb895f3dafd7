// src/engine/queue.rs

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use super::TaskName;

/// FIFO queue of task ids whose dependencies are satisfied.
///
/// Semantics:
/// - `push` never blocks, so it can be called while the scheduler lock is
///   held (dependents are released and enqueued in one critical section).
/// - `pop` waits until an id is available. Several workers may wait at the
///   same time; each id is handed to exactly one of them, in arrival order.
/// - `pop` is cancel-safe: dropping the future never loses an id.
#[derive(Debug)]
pub struct ReadyQueue {
    tx: mpsc::UnboundedSender<TaskName>,
    rx: Mutex<mpsc::UnboundedReceiver<TaskName>>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Append a task id to the back of the queue.
    pub fn push(&self, task: TaskName) {
        debug!(task = %task, "task placed on ready queue");
        if let Err(err) = self.tx.send(task) {
            // The receiver is owned by `self`; a send error here is a bug.
            warn!(task = %err.0, "ready queue receiver gone; dropping task");
        }
    }

    /// Wait for the next ready task id.
    pub async fn pop(&self) -> Option<TaskName> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new()
    }
}
