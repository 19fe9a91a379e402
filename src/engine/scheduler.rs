// src/engine/scheduler.rs

use std::time::Duration;

use anyhow::Result;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::actions::ExecutionContext;

/// Fixed polling interval between timer expiry passes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll the timer registry while the supervised process is alive.
///
/// Each pass: stop if the process has exited; otherwise collect every expired
/// timer (in registry order, each returned to dormant at detection) and run
/// its actions in order, synchronously; then sleep. A zero-duration
/// autostarted timer fires on the very first pass.
pub async fn run_scheduler(ctx: &ExecutionContext<'_>) -> Result<()> {
    loop {
        if ctx.process.has_exited().await? {
            info!("supervised process exited, timer scheduler stopping");
            return Ok(());
        }

        for expired in ctx.timers.collect_expired(Instant::now()).await {
            debug!(timer = %expired.name, "timer expired, dispatching actions");
            for action in expired.actions.iter() {
                action.execute(ctx).await?;
            }
        }

        sleep(POLL_INTERVAL).await;
    }
}
