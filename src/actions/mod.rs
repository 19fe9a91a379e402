// src/actions/mod.rs

//! Action implementations and the identifier -> constructor registration
//! table.
//!
//! An action is a small value built once at config load from an
//! [`ActionInvocation`]; at run time it is executed against the shared
//! [`ExecutionContext`]. The table in [`build_action`] replaces the dynamic
//! plugin discovery of older designs: adding an action means adding a module
//! and one match arm.

pub mod exit_program;
pub mod print;
pub mod timer_start;
pub mod timer_stop;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::ActionInvocation;
use crate::errors::WatchprocError;
use crate::proc::ProcessHandle;
use crate::timers::TimerRegistry;

pub use exit_program::ExitProgramAction;
pub use print::PrintAction;
pub use timer_start::TimerStartAction;
pub use timer_stop::TimerStopAction;

/// Shared handles passed by reference to every action invocation.
///
/// Built once per run by the supervisor; actions never own it.
pub struct ExecutionContext<'a> {
    /// Handle to the supervised child process.
    pub process: &'a ProcessHandle,
    /// The run's shared timer registry.
    pub timers: &'a TimerRegistry,
}

/// Something invocable with an execution context.
///
/// Execution is a side effect and may fail (e.g. a reference to an unknown
/// timer). `exit_program` is the only action that suspends its calling task.
#[async_trait]
pub trait Action: fmt::Debug + Send + Sync {
    async fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<()>;
}

/// Boxed action as stored in rule and timer action lists.
pub type ActionObject = Box<dyn Action>;

/// Construct one action from its config invocation.
///
/// Unknown identifiers and malformed kwargs are rejected here, at load time.
pub fn build_action(invocation: &ActionInvocation) -> Result<ActionObject> {
    match invocation.action.as_str() {
        print::NAME => print::from_kwargs(&invocation.kwargs),
        exit_program::NAME => exit_program::from_kwargs(&invocation.kwargs),
        timer_start::NAME => timer_start::from_kwargs(&invocation.kwargs),
        timer_stop::NAME => timer_stop::from_kwargs(&invocation.kwargs),
        other => Err(WatchprocError::UnknownAction(other.to_string()).into()),
    }
}

/// Construct an ordered action list, preserving invocation order.
pub fn build_action_list(invocations: &[ActionInvocation]) -> Result<Vec<ActionObject>> {
    invocations.iter().map(build_action).collect()
}

/// Deserialize an action's kwargs mapping into its parameter struct.
///
/// An absent `kwargs` key is treated as an empty mapping so that per-field
/// defaults apply.
fn parse_kwargs<T: DeserializeOwned>(action: &str, kwargs: &serde_yaml::Value) -> Result<T> {
    let value = if kwargs.is_null() {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    } else {
        kwargs.clone()
    };

    serde_yaml::from_value(value).map_err(|e| {
        WatchprocError::Config(format!("invalid kwargs for action \"{action}\": {e}")).into()
    })
}
