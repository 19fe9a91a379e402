// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchproc`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchproc",
    version,
    about = "Supervise a process and react to its output and to timers.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (YAML).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Path to the executable to supervise.
    #[arg(value_name = "PROGRAM")]
    pub program: PathBuf,

    /// Arguments passed through to the executable.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHPROC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
