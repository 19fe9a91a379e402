// src/proc/mod.rs

//! Shared handle to the supervised child process.
//!
//! The handle is referenced by both stream watchers, the timer scheduler and
//! any `exit_program` action; all access goes through short lock-guarded
//! calls. Sending a signal to a process that has already exited is always a
//! no-op, never an error.

use std::io;
use std::process::ExitStatus;

use anyhow::{Context, Result};
use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::debug;

pub struct ProcessHandle {
    child: Mutex<Child>,
    pid: Option<u32>,
}

impl ProcessHandle {
    pub fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: Mutex::new(child),
            pid,
        }
    }

    /// OS pid at spawn time.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking exit check. Reaps the child if it has exited; repeated
    /// calls keep returning the cached status.
    pub async fn try_wait(&self) -> Result<Option<ExitStatus>> {
        let mut child = self.child.lock().await;
        child.try_wait().context("checking supervised process state")
    }

    pub async fn has_exited(&self) -> Result<bool> {
        Ok(self.try_wait().await?.is_some())
    }

    /// Ask the process to exit gracefully (SIGTERM on unix).
    ///
    /// The child is spawned in its own process group, and the signal goes to
    /// the whole group: forked descendants share the pipe write ends, and a
    /// surviving orphan would stall the watchers long after the direct child
    /// is gone.
    pub async fn terminate(&self) -> Result<()> {
        let child = self.child.lock().await;
        // `id()` is `None` once the child has been reaped.
        let Some(pid) = child.id() else {
            return Ok(());
        };

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            debug!(pid, "sending SIGTERM to process group");
            // Negative pid: signal the whole group.
            match signal::kill(Pid::from_raw(-(pid as i32)), Signal::SIGTERM) {
                // ESRCH: the group is already gone.
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(err) => Err(anyhow::anyhow!("sending SIGTERM to pgid {pid}: {err}")),
            }
        }

        #[cfg(not(unix))]
        {
            // No graceful signal available; fall through to a forceful kill.
            drop(child);
            debug!(pid, "no graceful termination on this platform, killing");
            self.kill().await
        }
    }

    /// Kill the process outright. No-op if it has already exited.
    pub async fn kill(&self) -> Result<()> {
        let mut child = self.child.lock().await;
        if child
            .try_wait()
            .context("checking supervised process state")?
            .is_some()
        {
            return Ok(());
        }

        // Forked descendants first, same reasoning as `terminate`.
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            debug!(pid, "sending SIGKILL to process group");
            let _ = signal::kill(Pid::from_raw(-(pid as i32)), Signal::SIGKILL);
        }

        match child.start_kill() {
            Ok(()) => Ok(()),
            // InvalidInput: the child was reaped between the check and the
            // kill.
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(err) => Err(err).context("killing supervised process"),
        }
    }

    /// Wait for the process to exit and return its status.
    ///
    /// Holds the handle lock until the child exits; the supervisor calls this
    /// only after the watcher and scheduler tasks have finished.
    pub async fn wait(&self) -> Result<ExitStatus> {
        let mut child = self.child.lock().await;
        child.wait().await.context("waiting for supervised process")
    }
}
