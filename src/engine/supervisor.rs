// src/engine/supervisor.rs

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::process::Command;
use tracing::{error, info};

use crate::actions::ExecutionContext;
use crate::config::ConfigFile;
use crate::engine::scheduler::run_scheduler;
use crate::engine::watcher::watch_stream;
use crate::proc::ProcessHandle;
use crate::timers::TimerRegistry;
use crate::triggers::TriggerRegistry;

/// Owns the compiled rule registries and the shared timer registry, spawns
/// the supervised process and drives the three concurrent tasks (stdout
/// watcher, stderr watcher, timer scheduler) to completion.
pub struct Supervisor {
    stdout_rules: TriggerRegistry,
    stderr_rules: TriggerRegistry,
    timers: TimerRegistry,
}

impl Supervisor {
    /// Compile all registries from a loaded config. Autostarted timers begin
    /// running here.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Ok(Self {
            stdout_rules: TriggerRegistry::compile(&cfg.stdout).context("in `stdout` rules")?,
            stderr_rules: TriggerRegistry::compile(&cfg.stderr).context("in `stderr` rules")?,
            timers: TimerRegistry::from_config(&cfg.timers).context("in `timers`")?,
        })
    }

    /// Spawn `program` with `args` and supervise it until it exits.
    ///
    /// The three tasks are joined as futures on the current task, so they
    /// interleave cooperatively: each matched line's action list and each
    /// expiry pass runs to its next suspension point without interference
    /// from the other two. The run winds down naturally: the watchers end at
    /// end-of-stream (the pipes close when the process exits) and the
    /// scheduler ends when it observes the exit. If any task fails (a
    /// reference to an unknown timer), the others are dropped, the child is
    /// killed and the error is returned.
    pub async fn run(&self, program: &Path, args: &[String]) -> Result<ExitStatus> {
        info!(program = %program.display(), ?args, "spawning supervised process");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so terminate/kill reach forked descendants too;
        // otherwise an orphan can hold the pipe write ends open and stall the
        // watchers long after the direct child is gone.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning {}", program.display()))?;

        let stdout = child
            .stdout
            .take()
            .context("child stdout pipe was not captured")?;
        let stderr = child
            .stderr
            .take()
            .context("child stderr pipe was not captured")?;

        let process = ProcessHandle::new(child);
        let ctx = ExecutionContext {
            process: &process,
            timers: &self.timers,
        };

        let result = tokio::try_join!(
            watch_stream(BufReader::new(stdout), "stdout", &self.stdout_rules, &ctx),
            watch_stream(BufReader::new(stderr), "stderr", &self.stderr_rules, &ctx),
            run_scheduler(&ctx),
        );

        if let Err(err) = result {
            error!(error = %err, "supervision task failed, killing process");
            process.kill().await?;
            let _ = process.wait().await;
            return Err(err);
        }

        let status = process.wait().await?;
        info!(%status, "supervised process exited");
        Ok(status)
    }

    /// The run's shared timer registry.
    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn stdout_rules(&self) -> &TriggerRegistry {
        &self.stdout_rules
    }

    pub fn stderr_rules(&self) -> &TriggerRegistry {
        &self.stderr_rules
    }
}
