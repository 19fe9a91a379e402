// src/engine/watcher.rs

use std::io::{self, Write};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::actions::ExecutionContext;
use crate::triggers::TriggerRegistry;

/// Drain one output stream line by line until end-of-stream.
///
/// Every line is echoed verbatim to stdout for operator visibility, then
/// matched against the registry; matched actions run in order, synchronously,
/// before the next line is read. A read error ends this watcher only, as if
/// the stream had closed.
pub async fn watch_stream<R>(
    reader: R,
    stream_name: &str,
    registry: &TriggerRegistry,
    ctx: &ExecutionContext<'_>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(stream = stream_name, error = %err, "read error, treating as end of stream");
                break;
            }
        };

        // Pass-through echo, the original line unmodified. Best-effort, like
        // the print action: a closed stdout must not take the run down.
        // Flushed per line: stdout may be a block-buffered pipe and main
        // exits via `process::exit`, which skips the final flush.
        {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }

        for action in registry.matched_actions(&line) {
            debug!(stream = stream_name, ?action, "dispatching matched action");
            action.execute(ctx).await?;
        }
    }

    debug!(stream = stream_name, "stream closed, watcher finished");
    Ok(())
}
