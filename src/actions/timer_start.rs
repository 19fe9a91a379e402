// src/actions/timer_start.rs

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::actions::{Action, ActionObject, ExecutionContext, parse_kwargs};

pub const NAME: &str = "timer_start";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Kwargs {
    name: String,
}

/// Start a named timer. No-op if the timer is already running; referencing an
/// unconfigured name is a runtime error.
#[derive(Debug)]
pub struct TimerStartAction {
    name: String,
}

impl TimerStartAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub fn from_kwargs(kwargs: &serde_yaml::Value) -> Result<ActionObject> {
    let kwargs: Kwargs = parse_kwargs(NAME, kwargs)?;
    Ok(Box::new(TimerStartAction::new(kwargs.name)))
}

#[async_trait]
impl Action for TimerStartAction {
    async fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<()> {
        ctx.timers.start_timer(&self.name).await
    }
}
