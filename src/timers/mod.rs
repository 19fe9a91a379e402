// src/timers/mod.rs

//! Named countdown timers shared between the stream watchers and the timer
//! scheduler.
//!
//! The registry is structurally append-only after load: the set of timers
//! never changes during a run, only each timer's `start` field does. All
//! mutation happens in short, non-suspending critical sections; expired
//! action lists are handed back to the caller and executed outside the lock.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::actions::{self, ActionObject};
use crate::config::{OrderedMap, TimerConfig};
use crate::errors::WatchprocError;

/// One named timer: a countdown duration, the actions fired on expiry, and
/// the mutable running state.
///
/// `start == None` means dormant; `start == Some(t)` means running since `t`.
#[derive(Debug)]
struct TimerDefinition {
    name: String,
    duration: Duration,
    actions: Arc<Vec<ActionObject>>,
    start: Option<Instant>,
}

/// Read-only view of one timer's state, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStatus {
    pub duration: Duration,
    pub started_at: Option<Instant>,
}

impl TimerStatus {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

/// An expired timer as collected by the scheduler: the registry has already
/// returned it to dormant, the actions are still to be executed.
#[derive(Debug)]
pub struct ExpiredTimer {
    pub name: String,
    pub actions: Arc<Vec<ActionObject>>,
}

/// The shared, mutable list of timer definitions, in configured order.
#[derive(Debug)]
pub struct TimerRegistry {
    timers: Mutex<Vec<TimerDefinition>>,
}

impl TimerRegistry {
    /// Build the registry from the `timers` config section.
    ///
    /// Autostarted timers begin running immediately. Duplicate names and
    /// invalid durations or actions are configuration errors.
    pub fn from_config(timers: &OrderedMap<TimerConfig>) -> Result<Self> {
        let mut definitions: Vec<TimerDefinition> = Vec::with_capacity(timers.len());

        for (name, cfg) in timers.iter() {
            if definitions.iter().any(|t| t.name == name) {
                return Err(WatchprocError::Config(format!(
                    "duplicate timer name \"{name}\""
                ))
                .into());
            }

            let duration = cfg
                .duration
                .to_duration()
                .with_context(|| format!("in timer \"{name}\""))?;
            let action_list = actions::build_action_list(&cfg.actions)
                .with_context(|| format!("in actions for timer \"{name}\""))?;

            definitions.push(TimerDefinition {
                name: name.to_string(),
                duration,
                actions: Arc::new(action_list),
                start: cfg.autostart.then(Instant::now),
            });
        }

        Ok(Self {
            timers: Mutex::new(definitions),
        })
    }

    /// Start a timer. No-op if it is already running.
    pub async fn start_timer(&self, name: &str) -> Result<()> {
        let mut timers = self.timers.lock().await;
        let timer = find_timer(&mut timers, name)?;
        if timer.start.is_none() {
            timer.start = Some(Instant::now());
            debug!(timer = %name, "timer started");
        }
        Ok(())
    }

    /// Stop a timer, returning it to dormant. No-op if already dormant.
    pub async fn stop_timer(&self, name: &str) -> Result<()> {
        let mut timers = self.timers.lock().await;
        let timer = find_timer(&mut timers, name)?;
        if timer.start.take().is_some() {
            debug!(timer = %name, "timer stopped");
        }
        Ok(())
    }

    /// Collect every running timer whose duration has elapsed at `now`, in
    /// registry order.
    ///
    /// `start` is cleared at detection, so one threshold crossing fires
    /// exactly once; the timer fires again only after a fresh `timer_start`.
    pub async fn collect_expired(&self, now: Instant) -> Vec<ExpiredTimer> {
        let mut timers = self.timers.lock().await;
        let mut expired = Vec::new();

        for timer in timers.iter_mut() {
            let Some(start) = timer.start else { continue };
            if now.saturating_duration_since(start) >= timer.duration {
                timer.start = None;
                expired.push(ExpiredTimer {
                    name: timer.name.clone(),
                    actions: Arc::clone(&timer.actions),
                });
            }
        }

        expired
    }

    /// Current state of one timer, or `None` if no such timer exists.
    pub async fn status(&self, name: &str) -> Option<TimerStatus> {
        let timers = self.timers.lock().await;
        timers.iter().find(|t| t.name == name).map(|t| TimerStatus {
            duration: t.duration,
            started_at: t.start,
        })
    }

    /// Timer names in registry (= configured) order.
    pub async fn names(&self) -> Vec<String> {
        let timers = self.timers.lock().await;
        timers.iter().map(|t| t.name.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.timers.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.timers.lock().await.is_empty()
    }
}

fn find_timer<'a>(
    timers: &'a mut [TimerDefinition],
    name: &str,
) -> Result<&'a mut TimerDefinition> {
    timers
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| WatchprocError::UnknownTimer(name.to_string()).into())
}
