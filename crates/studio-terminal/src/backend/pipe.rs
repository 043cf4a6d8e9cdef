//! Piped subprocess backend

use super::{shutdown_child, BackendKind, OutputStream, ProcessControl, SpawnedProcess};
use crate::config::TerminalConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use std::process::Stdio;
use std::time::Duration;
use studio_tools::spawn_merged;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin};
use tokio_util::io::ReaderStream;
use tracing::info;

pub(super) fn spawn(config: &TerminalConfig) -> Result<SpawnedProcess> {
    let program = config.program();

    let mut cmd = tokio::process::Command::new(&program);
    cmd.args(&config.args)
        .env_clear()
        .envs(config.env_vars())
        .env("TERM", "dumb")
        .stdin(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &config.cwd {
        cmd.current_dir(dir);
    }

    // One pipe for stdout and stderr keeps their relative order
    let (mut child, output) = spawn_merged(cmd).map_err(|e| Error::Spawn {
        program: program.clone(),
        reason: e.to_string(),
    })?;

    let stdin = child.stdin.take();
    let output: OutputStream = ReaderStream::new(output)
        .map(|r| r.map(|b| b.to_vec()))
        .boxed();

    info!(shell = %program, pid = ?child.id(), backend = "pipe", "Shell spawned");

    Ok(SpawnedProcess {
        output,
        control: Box::new(PipeControl { stdin, child }),
    })
}

struct PipeControl {
    stdin: Option<ChildStdin>,
    child: Child,
}

#[async_trait]
impl ProcessControl for PipeControl {
    fn kind(&self) -> BackendKind {
        BackendKind::Pipe
    }

    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::ProcessGone("stdin closed".to_string()))?;
        stdin
            .write_all(data)
            .await
            .map_err(|e| Error::ProcessGone(e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| Error::ProcessGone(e.to_string()))
    }

    async fn terminate(&mut self, grace: Duration) -> Result<()> {
        // EOF on stdin lets a well-behaved shell exit on its own
        self.stdin.take();
        shutdown_child(&mut self.child, grace).await
    }
}

impl Drop for PipeControl {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}
