// src/exec/mod.rs

//! Task execution layer.
//!
//! The scheduler never runs anything itself; it hands a [`TaskPayload`] to an
//! [`Executor`] and classifies the returned object by its `status`.
//!
//! - [`backend`] defines the `Executor` trait and the payload type, so tests
//!   can plug in a scripted executor.
//! - [`command`] contains `DroidExecutor`, which runs `droid exec` as a
//!   subprocess with a per-task timeout.
//! - [`prompt`] builds the prompt text from a payload.
//! - [`normalize`] turns CLI output into the canonical result shape.
//! - [`session`] remembers the last droid session id.

pub mod backend;
pub mod command;
pub mod normalize;
pub mod prompt;
pub mod session;

pub use backend::{ExecuteFuture, Executor, SUCCESS_STATUS, TaskPayload, is_success, result_status};
pub use command::DroidExecutor;
pub use normalize::{IssueKind, error_result, normalize_output, parse_json, process_error_result};
pub use prompt::build_prompt;
pub use session::SessionTracker;
