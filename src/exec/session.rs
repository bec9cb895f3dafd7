// src/exec/session.rs

//! Tracking of the most recent droid session id.

use std::sync::{Mutex, PoisonError};

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Remembers the last session id reported by the CLI.
///
/// Owned by the long-lived executor: created with it, updated after every
/// call that reports a session, never reset implicitly.
#[derive(Debug)]
pub struct SessionTracker {
    last: Mutex<Option<String>>,
    patterns: Vec<Regex>,
}

impl SessionTracker {
    pub fn new() -> Self {
        // Free-form fallbacks for output that isn't the official JSON shape.
        let patterns = [r"Session ID:\s*([a-f0-9-]+)", r"session[_-]?id[:\s]+([a-f0-9-]+)"]
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        Self {
            last: Mutex::new(None),
            patterns,
        }
    }

    pub fn last(&self) -> Option<String> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look for a session id in the parsed JSON output first, then in the
    /// raw text streams. Records and returns it when found.
    pub fn observe(
        &self,
        data: Option<&Map<String, Value>>,
        stdout: &str,
        stderr: &str,
    ) -> Option<String> {
        let from_json = data
            .and_then(|d| d.get("session_id"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let found = from_json
            .or_else(|| self.extract(stdout))
            .or_else(|| self.extract(stderr))?;

        debug!(session_id = %found, "recorded droid session id");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(found.clone());
        Some(found)
    }

    fn extract(&self, text: &str) -> Option<String> {
        self.patterns.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
