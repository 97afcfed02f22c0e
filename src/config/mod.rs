// src/config/mod.rs

//! Configuration loading and validation for o2reap.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file through the [`crate::fs::FileSystem`] seam (`loader.rs`).
//! - Turn the raw file into checked runner options (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{
    CONFIG_ENV, DEFAULT_CONFIG_FILE, load_and_validate, load_from_sources, load_or_default,
    load_with_fs,
};
pub use model::{ConfigFile, OperationConfig, RawConfigFile, RunnerSection};
pub use validate::{runner_options, validate_runner_options};
