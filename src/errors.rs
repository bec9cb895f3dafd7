// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DroidError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid task graph: {0}")]
    InvalidGraph(#[from] ValidationError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Structural problems with a submitted task graph.
///
/// These are detected before any task runs; the whole submission is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task missing 'id' field (task #{index})")]
    MissingId { index: usize },

    #[error("Duplicate task id: '{0}'")]
    DuplicateId(String),

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("DAG contains cycle (involving task '{0}')")]
    Cycle(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DroidError>;
