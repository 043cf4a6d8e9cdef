//! Assistant adapter - stream replies from an external assistant CLI
//!
//! The configured command line is spawned once per prompt. The prompt is
//! written to the child's stdin, stdin is closed, and every line the child
//! prints (stdout and stderr merged) becomes one fragment of the reply.
//!
//! Without a configured command the adapter runs in mock mode and replays
//! [`MOCK_FRAGMENTS`] with a short delay between them, which keeps the rest of
//! the server usable without any external tool installed.

use crate::error::{Error, Result};
use crate::process::spawn_merged;
use futures::stream::{self, BoxStream, StreamExt};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Fragments replayed in mock mode
pub const MOCK_FRAGMENTS: [&str; 5] = ["Thinking ", "about ", "your ", "request...\n", "Done!\n"];

/// Default delay before each mock fragment (milliseconds)
pub const DEFAULT_MOCK_DELAY_MS: u64 = 150;

/// Lazily produced reply fragments
pub type FragmentStream = BoxStream<'static, String>;

/// Assistant adapter configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Command line of the external tool, split on whitespace. Empty means mock mode.
    pub command: String,
    /// Delay before each mock fragment
    pub mock_delay: Duration,
    /// Working directory for the external tool
    pub working_dir: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            mock_delay: Duration::from_millis(DEFAULT_MOCK_DELAY_MS),
            working_dir: None,
        }
    }
}

/// Spawns the assistant CLI per prompt and streams its output.
#[derive(Debug, Clone)]
pub struct AssistantAdapter {
    config: AssistantConfig,
}

impl AssistantAdapter {
    /// Create an adapter from config
    #[must_use]
    pub fn new(config: AssistantConfig) -> Self {
        Self { config }
    }

    /// Create a mock-mode adapter
    #[must_use]
    pub fn mock(mock_delay: Duration) -> Self {
        Self::new(AssistantConfig {
            mock_delay,
            ..AssistantConfig::default()
        })
    }

    /// Whether no external command is configured
    pub fn is_mock(&self) -> bool {
        self.config.command.trim().is_empty()
    }

    /// Stream the reply to `prompt`.
    ///
    /// Fails with [`Error::AdapterUnavailable`] if the external command cannot
    /// be spawned; nothing is yielded in that case.
    pub fn stream(&self, prompt: &str) -> Result<FragmentStream> {
        let mut argv = self.config.command.split_whitespace();
        let Some(program) = argv.next() else {
            debug!("No assistant command configured, using mock stream");
            return Ok(mock_stream(self.config.mock_delay));
        };

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(argv)
            .stdin(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let (mut child, output) = spawn_merged(cmd).map_err(|e| {
            warn!(command = %program, error = %e, "Failed to spawn assistant");
            Error::AdapterUnavailable(format!("{}: {}", program, e))
        })?;

        info!(command = %program, pid = ?child.id(), prompt_len = prompt.len(), "Assistant spawned");

        if let Some(mut stdin) = child.stdin.take() {
            let prompt = prompt.to_string();
            // Written off-stream so a chatty child cannot deadlock on a full stdout pipe.
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                    warn!(error = %e, "Failed to write prompt to assistant");
                }
                let _ = stdin.shutdown().await;
            });
        }

        let reap = stream::once(async move {
            match child.wait().await {
                Ok(status) => debug!(status = %status, "Assistant exited"),
                Err(e) => warn!(error = %e, "Failed to wait for assistant"),
            }
        })
        .filter_map(|()| async { None::<String> });

        Ok(fragments(output).chain(reap).boxed())
    }
}

fn mock_stream(delay: Duration) -> FragmentStream {
    stream::iter(MOCK_FRAGMENTS)
        .then(move |fragment| async move {
            tokio::time::sleep(delay).await;
            fragment.to_string()
        })
        .boxed()
}

/// Split a stream into newline-terminated fragments, replacing invalid UTF-8.
fn fragments<R>(reader: R) -> FragmentStream
where
    R: AsyncRead + Send + Unpin + 'static,
{
    stream::unfold(BufReader::new(reader), |mut reader| async move {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => None,
            Ok(_) => Some((String::from_utf8_lossy(&buf).into_owned(), reader)),
        }
    })
    .boxed()
}
