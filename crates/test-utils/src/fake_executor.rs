use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use droid_executor::exec::{ExecuteFuture, Executor, TaskPayload};
use serde_json::{Value, json};

/// What the fake does for one objective.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// `{"status": "success"}`.
    Succeed,
    /// A result with the given status (e.g. `"failed"`).
    Status(String),
    /// `Err(..)` from `execute`.
    Error(String),
    /// Panic inside `execute`.
    Panic,
    /// Never return.
    Hang,
}

/// Observable executor events, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

/// A scripted executor that:
/// - looks up a [`Behavior`] and an optional delay by task objective
/// - records start/finish events and the payloads it received
/// - tracks the highest number of calls in flight at once.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    behaviors: HashMap<String, Behavior>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    events: Mutex<Vec<Event>>,
    payloads: Mutex<Vec<TaskPayload>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, objective: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(objective.to_string(), behavior);
        self
    }

    pub fn failing(self, objective: &str) -> Self {
        self.with(objective, Behavior::Status("failed".to_string()))
    }

    pub fn delay(mut self, objective: &str, delay: Duration) -> Self {
        self.delays.insert(objective.to_string(), delay);
        self
    }

    pub fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Objectives in the order their calls started.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started(id) => Some(id),
                Event::Finished(_) => None,
            })
            .collect()
    }

    pub fn payloads(&self) -> Vec<TaskPayload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.started().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Index of an event in the log; panics if it never happened.
    pub fn position(&self, event: &Event) -> usize {
        self.events()
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("event {event:?} not recorded"))
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, payload: TaskPayload) -> ExecuteFuture<'_> {
        Box::pin(async move {
            let objective = payload.objective.clone();
            self.payloads.lock().unwrap().push(payload);
            self.record(Event::Started(objective.clone()));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self
                .delays
                .get(&objective)
                .copied()
                .unwrap_or(self.default_delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let behavior = self
                .behaviors
                .get(&objective)
                .cloned()
                .unwrap_or(Behavior::Succeed);

            let outcome: anyhow::Result<Value> = match behavior {
                Behavior::Succeed => Ok(json!({
                    "status": "success",
                    "summary": format!("done: {objective}"),
                })),
                Behavior::Status(status) => Ok(json!({
                    "status": status,
                    "summary": format!("{status}: {objective}"),
                })),
                Behavior::Error(msg) => Err(anyhow::anyhow!(msg)),
                Behavior::Panic => {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    panic!("scripted panic in {objective}")
                }
                Behavior::Hang => std::future::pending().await,
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.record(Event::Finished(objective));
            outcome
        })
    }
}
