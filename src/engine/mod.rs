// src/engine/mod.rs

//! The concurrent monitoring-and-dispatch engine.
//!
//! Three tasks share one `ExecutionContext`: two stream watchers
//! (`watcher.rs`) and the timer scheduler (`scheduler.rs`), all driven by the
//! supervisor (`supervisor.rs`).

pub mod scheduler;
pub mod supervisor;
pub mod watcher;

pub use scheduler::{POLL_INTERVAL, run_scheduler};
pub use supervisor::Supervisor;
pub use watcher::watch_stream;
