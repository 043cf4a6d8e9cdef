use super::config::ExecConfig;
use super::security::check_command;
use crate::error::Result;
use crate::process::spawn_merged;
use futures::stream::{self, BoxStream, StreamExt};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Lazily produced output lines of a spawned command
pub type LineStream = BoxStream<'static, String>;

/// Spawn an allowlisted command in `cwd` and stream its merged stdout/stderr.
///
/// Allowlist violations are returned before anything is spawned. Both streams
/// share one pipe, so lines keep the order the command printed them in. Lines
/// are yielded without their trailing newline as they arrive; at end-of-stream
/// the child is reaped and the stream ends.
pub fn run_command(config: &ExecConfig, tokens: &[String], cwd: &Path) -> Result<LineStream> {
    let program = check_command(config, tokens)?;

    let mut cmd = Command::new(program);
    cmd.args(&tokens[1..])
        .current_dir(cwd)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    let (mut child, output) = spawn_merged(cmd)?;

    debug!(command = %program, args = ?&tokens[1..], pid = ?child.id(), "Command spawned");

    let command = program.to_string();
    let reap = stream::once(async move {
        match child.wait().await {
            Ok(status) => debug!(command = %command, status = %status, "Command exited"),
            Err(e) => warn!(command = %command, error = %e, "Failed to wait for command"),
        }
    })
    .filter_map(|()| async { None::<String> });

    Ok(lines(output).chain(reap).boxed())
}

/// Decode a stream into lines, replacing invalid UTF-8.
fn lines<R>(reader: R) -> LineStream
where
    R: AsyncRead + Send + Unpin + 'static,
{
    stream::unfold(BufReader::new(reader), |mut reader| async move {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                Some((String::from_utf8_lossy(&buf).into_owned(), reader))
            }
        }
    })
    .boxed()
}
