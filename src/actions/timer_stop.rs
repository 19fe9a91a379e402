// src/actions/timer_stop.rs

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::actions::{Action, ActionObject, ExecutionContext, parse_kwargs};

pub const NAME: &str = "timer_stop";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Kwargs {
    name: String,
}

/// Stop a named timer, returning it to the dormant state. No-op if already
/// dormant; referencing an unconfigured name is a runtime error.
#[derive(Debug)]
pub struct TimerStopAction {
    name: String,
}

impl TimerStopAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub fn from_kwargs(kwargs: &serde_yaml::Value) -> Result<ActionObject> {
    let kwargs: Kwargs = parse_kwargs(NAME, kwargs)?;
    Ok(Box::new(TimerStopAction::new(kwargs.name)))
}

#[async_trait]
impl Action for TimerStopAction {
    async fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<()> {
        ctx.timers.stop_timer(&self.name).await
    }
}
