// src/lib.rs

pub mod actions;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod proc;
pub mod timers;
pub mod triggers;

use std::process::ExitStatus;

use anyhow::Result;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::Supervisor;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the config, spawns the executable with the given
/// arguments, supervises it until it exits, and returns the exit code the
/// supervisor process should itself exit with (the child's own).
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_and_validate(&args.config)?;
    let supervisor = Supervisor::from_config(&cfg)?;
    let status = supervisor.run(&args.program, &args.args).await?;
    Ok(exit_code(status))
}

/// Map the child's exit status onto our own exit code.
///
/// On unix a signal-killed child maps to the conventional `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    signal_exit_code(status)
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    128 + status.signal().unwrap_or(0)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> i32 {
    1
}
