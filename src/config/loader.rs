// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs YAML deserialization; it does **not** perform semantic
/// validation (regex compilation, action construction, etc.). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config file at {path:?}"))?;
    load_from_str(&contents).with_context(|| format!("parsing YAML config from {path:?}"))
}

/// Parse a configuration from a YAML string.
pub fn load_from_str(contents: &str) -> Result<ConfigFile> {
    let config: ConfigFile = serde_yaml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from path and run full validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads YAML (defaults applied by `serde`).
/// - Compiles every trigger pattern.
/// - Constructs every action, rejecting unknown identifiers and malformed
///   kwargs.
/// - Checks timer durations and name uniqueness.
///
/// All of this happens before any process is spawned.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Serialize a configuration back to the YAML schema it was loaded from.
///
/// Loading the result again yields an equivalent config (same rules in the
/// same order, same timer definitions).
pub fn to_yaml_string(config: &ConfigFile) -> Result<String> {
    Ok(serde_yaml::to_string(config)?)
}
