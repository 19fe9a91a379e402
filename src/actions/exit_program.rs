// src/actions/exit_program.rs

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::actions::{Action, ActionObject, ExecutionContext, parse_kwargs};
use crate::errors::WatchprocError;

pub const NAME: &str = "exit_program";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Kwargs {
    #[serde(default = "default_kill_timeout")]
    kind_kill_timeout: f64,
}

fn default_kill_timeout() -> f64 {
    5.0
}

/// Terminate the supervised process: graceful signal first, forceful kill if
/// it has not exited after `kill_timeout`.
///
/// The wait happens inline, so the calling watcher or scheduler dispatches
/// nothing else until it is over. Program exit is meant to be decisive.
#[derive(Debug)]
pub struct ExitProgramAction {
    kill_timeout: Duration,
}

impl ExitProgramAction {
    pub fn new(kill_timeout: Duration) -> Self {
        Self { kill_timeout }
    }
}

pub fn from_kwargs(kwargs: &serde_yaml::Value) -> Result<ActionObject> {
    let kwargs: Kwargs = parse_kwargs(NAME, kwargs)?;

    if !kwargs.kind_kill_timeout.is_finite() || kwargs.kind_kill_timeout < 0.0 {
        return Err(WatchprocError::Config(format!(
            "`kind_kill_timeout` for action \"{NAME}\" must be >= 0 (got {})",
            kwargs.kind_kill_timeout
        ))
        .into());
    }

    Ok(Box::new(ExitProgramAction::new(Duration::from_secs_f64(
        kwargs.kind_kill_timeout,
    ))))
}

#[async_trait]
impl Action for ExitProgramAction {
    async fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<()> {
        info!(timeout = ?self.kill_timeout, "exit_program: terminating supervised process");
        ctx.process.terminate().await?;

        if !self.kill_timeout.is_zero() {
            sleep(self.kill_timeout).await;
        }

        if ctx.process.has_exited().await? {
            debug!("exit_program: process exited after terminate");
        } else {
            info!("exit_program: process still alive, killing");
            ctx.process.kill().await?;
        }

        Ok(())
    }
}
