//! PTY backend

use super::{shutdown_child, BackendKind, ProcessControl, SpawnedProcess};
use crate::config::TerminalConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use pty_process::{OwnedWritePty, Size};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Child;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

pub(super) fn spawn(config: &TerminalConfig) -> Result<SpawnedProcess> {
    let program = config.program();

    let (pty, pts) = pty_process::open().map_err(|e| Error::PtyUnavailable(e.to_string()))?;
    if let Err(e) = pty.resize(Size::new(config.rows, config.cols)) {
        warn!(error = %e, "Failed to set initial PTY size");
    }

    // Builder methods consume self
    let mut cmd = pty_process::Command::new(&program)
        .args(&config.args)
        .env_clear();
    for (key, value) in config.env_vars() {
        cmd = cmd.env(key, value);
    }
    cmd = cmd.env("TERM", &config.term);
    if let Some(dir) = &config.cwd {
        cmd = cmd.current_dir(dir);
    }

    let child = cmd.spawn(pts).map_err(|e| Error::Spawn {
        program: program.clone(),
        reason: e.to_string(),
    })?;

    info!(
        shell = %program,
        pid = ?child.id(),
        cols = config.cols,
        rows = config.rows,
        backend = "pty",
        "Shell spawned"
    );

    let (reader, writer) = pty.into_split();
    // Linux reports EIO once the child side closes; the reader treats it as EOF.
    let output = ReaderStream::new(reader)
        .map(|r| r.map(|b| b.to_vec()))
        .boxed();

    Ok(SpawnedProcess {
        output,
        control: Box::new(PtyControl {
            writer: Some(writer),
            child,
        }),
    })
}

struct PtyControl {
    writer: Option<OwnedWritePty>,
    child: Child,
}

#[async_trait]
impl ProcessControl for PtyControl {
    fn kind(&self) -> BackendKind {
        BackendKind::Pty
    }

    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::ProcessGone("pty closed".to_string()))?;
        writer
            .write_all(data)
            .await
            .map_err(|e| Error::ProcessGone(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| Error::ProcessGone(e.to_string()))
    }

    fn supports_resize(&self) -> bool {
        true
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        if cols == 0 || rows == 0 {
            return Err(Error::TerminalResizeFailed(format!(
                "invalid size {}x{}",
                cols, rows
            )));
        }
        let writer = self
            .writer
            .as_ref()
            .ok_or_else(|| Error::TerminalResizeFailed("pty closed".to_string()))?;
        writer
            .resize(Size::new(rows, cols))
            .map_err(|e| Error::TerminalResizeFailed(e.to_string()))?;
        debug!(cols, rows, "PTY resized");
        Ok(())
    }

    async fn terminate(&mut self, grace: Duration) -> Result<()> {
        self.writer.take();
        shutdown_child(&mut self.child, grace).await
    }
}

impl Drop for PtyControl {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}
