// src/actions/print.rs

use std::io::{self, Write};

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::actions::{Action, ActionObject, ExecutionContext, parse_kwargs};

pub const NAME: &str = "print";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Kwargs {
    #[serde(default)]
    message: String,

    #[serde(default = "default_true")]
    flush: bool,

    #[serde(default = "default_true")]
    new_line: bool,
}

fn default_true() -> bool {
    true
}

/// Write a fixed message to stdout. Never fails.
#[derive(Debug)]
pub struct PrintAction {
    message: String,
    flush: bool,
    new_line: bool,
}

impl PrintAction {
    pub fn new(message: impl Into<String>, flush: bool, new_line: bool) -> Self {
        Self {
            message: message.into(),
            flush,
            new_line,
        }
    }
}

pub fn from_kwargs(kwargs: &serde_yaml::Value) -> Result<ActionObject> {
    let kwargs: Kwargs = parse_kwargs(NAME, kwargs)?;
    Ok(Box::new(PrintAction::new(
        kwargs.message,
        kwargs.flush,
        kwargs.new_line,
    )))
}

#[async_trait]
impl Action for PrintAction {
    async fn execute(&self, _ctx: &ExecutionContext<'_>) -> Result<()> {
        // Best-effort by contract: a closed stdout must not fail the run.
        let mut out = io::stdout().lock();
        let _ = if self.new_line {
            writeln!(out, "{}", self.message)
        } else {
            write!(out, "{}", self.message)
        };
        if self.flush {
            let _ = out.flush();
        }
        Ok(())
    }
}
