// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Most functions return `anyhow::Result`; the variants below exist so that
//! the interesting failure classes (configuration vs. runtime reference
//! errors) stay inspectable with `downcast_ref` from tests and callers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchprocError {
    /// Anything wrong with the config file that is detected before the
    /// supervised process is spawned.
    #[error("configuration error: {0}")]
    Config(String),

    /// An action identifier in the config that is not in the registration
    /// table.
    #[error("\"{0}\" is not a known action")]
    UnknownAction(String),

    /// `timer_start` / `timer_stop` referenced a timer that was never
    /// configured. Detected at action-execution time.
    #[error("timer \"{0}\" does not exist")]
    UnknownTimer(String),
}

pub use anyhow::{Error, Result};
