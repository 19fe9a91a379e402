// src/config/validate.rs

use anyhow::{Context, Result};

use crate::config::model::ConfigFile;
use crate::timers::TimerRegistry;
use crate::triggers::TriggerRegistry;

/// Run semantic validation against a loaded configuration.
///
/// Compiling the registries *is* the validation: every pattern is compiled,
/// every action invocation is constructed through the registration table, and
/// every timer duration is checked, exactly as the supervisor will do later.
/// Anything that would fail at run start fails here instead, before the
/// supervised process exists.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    TriggerRegistry::compile(&cfg.stdout).context("in `stdout` rules")?;
    TriggerRegistry::compile(&cfg.stderr).context("in `stderr` rules")?;
    TimerRegistry::from_config(&cfg.timers).context("in `timers`")?;
    Ok(())
}
