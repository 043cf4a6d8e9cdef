//! Shell backends
//!
//! Two ways to run an interactive shell:
//! - [`pty`]: pseudo-terminal, so full-screen programs and line editing work
//! - [`pipe`]: plain piped subprocess, used where no PTY can be allocated
//!
//! Both hand back a [`SpawnedProcess`]: an output stream for the reader side
//! and a [`ProcessControl`] handle for input, resize and termination.

mod pipe;
#[cfg(unix)]
mod pty;

use crate::config::TerminalConfig;
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use std::time::Duration;
use tokio::process::Child;
use tracing::{debug, info, warn};

/// Raw output chunks from the shell. Ends when the process closes its output.
pub type OutputStream = BoxStream<'static, std::io::Result<Vec<u8>>>;

/// Which backend a shell runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Pseudo-terminal
    Pty,
    /// Piped stdin/stdout/stderr
    Pipe,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pty => write!(f, "pty"),
            Self::Pipe => write!(f, "pipe"),
        }
    }
}

/// Write/resize/terminate handle for a running shell.
#[async_trait]
pub trait ProcessControl: Send {
    /// Backend this handle drives
    fn kind(&self) -> BackendKind;

    /// OS process id, if still known
    fn pid(&self) -> Option<u32>;

    /// Write raw bytes to the shell's input.
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Whether [`resize`](Self::resize) has any effect
    fn supports_resize(&self) -> bool {
        false
    }

    /// Apply new terminal dimensions. A no-op for backends without a terminal.
    fn resize(&mut self, _cols: u16, _rows: u16) -> Result<()> {
        Ok(())
    }

    /// Close input, signal the process, wait up to `grace`, then kill.
    ///
    /// Safe to call more than once.
    async fn terminate(&mut self, grace: Duration) -> Result<()>;
}

/// A freshly started shell
pub struct SpawnedProcess {
    /// Output for the reader task
    pub output: OutputStream,
    /// Control handle for the session loop
    pub control: Box<dyn ProcessControl>,
}

impl SpawnedProcess {
    /// Backend the shell is running on
    pub fn kind(&self) -> BackendKind {
        self.control.kind()
    }
}

impl fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("kind", &self.control.kind())
            .field("pid", &self.control.pid())
            .finish_non_exhaustive()
    }
}

/// Start a shell, preferring a PTY and falling back to pipes.
pub fn spawn_shell(config: &TerminalConfig) -> Result<SpawnedProcess> {
    #[cfg(unix)]
    match pty::spawn(config) {
        Ok(process) => return Ok(process),
        Err(crate::Error::PtyUnavailable(reason)) => {
            warn!(reason = %reason, "PTY unavailable, falling back to pipe backend");
        }
        Err(e) => return Err(e),
    }

    pipe::spawn(config)
}

/// Start a shell on the pipe backend only.
pub fn spawn_piped(config: &TerminalConfig) -> Result<SpawnedProcess> {
    pipe::spawn(config)
}

/// Stop `child`: SIGTERM (Unix), wait up to `grace`, then kill and reap.
pub(crate) async fn shutdown_child(child: &mut Child, grace: Duration) -> Result<()> {
    if let Ok(Some(status)) = child.try_wait() {
        debug!(status = %status, "Shell already exited");
        return Ok(());
    }

    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            warn!(pid, "PID out of range, skipping SIGTERM");
            child.kill().await?;
            return Ok(());
        };
        if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
            debug!(pid, error = %e, "SIGTERM failed");
        }
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(status = %status, "Shell exited after termination signal");
            return Ok(());
        }
        Ok(Err(e)) => warn!(error = %e, "Failed to wait for shell"),
        Err(_) => info!(grace_ms = grace.as_millis() as u64, "Shell ignored termination, killing"),
    }

    child.kill().await?;
    Ok(())
}
