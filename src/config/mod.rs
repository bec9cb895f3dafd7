// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply `DROID_*` overrides (`loader.rs`).
//! - Validate basic invariants like non-zero limits (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    apply_env_overrides, default_config_path, load_and_validate, load_effective, load_from_path,
};
pub use model::{ConfigFile, DroidSection, RawConfigFile, SchedulerSection};
