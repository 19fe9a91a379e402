// src/config/mod.rs

//! Configuration loading and validation for watchproc.
//!
//! Responsibilities:
//! - Define the YAML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate patterns, actions and timers before anything runs
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str, to_yaml_string};
pub use model::{ActionInvocation, ConfigFile, DurationSpec, OrderedMap, RuleSet, TimerConfig};
pub use validate::validate_config;
