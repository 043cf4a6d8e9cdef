//! Terminal proxy - one client channel attached to one shell
//!
//! Three concurrent activities per session:
//! - a reader task forwarding shell output to the client sink, in order
//! - a writer task owning the process handle, applying input and resizes
//! - the control loop parsing client messages into the writer's queue
//!
//! The control loop never awaits the process, so a shell that stops reading
//! its input cannot hide a client disconnect. Either side ending (client
//! disconnect, process exit, failed write) cancels a shared token;
//! [`TerminalProxy::close`] then joins both tasks, closes the shell's input,
//! signals the process and reaps it. Teardown runs at most once.

use crate::backend::{spawn_shell, BackendKind, OutputStream, ProcessControl, SpawnedProcess};
use crate::config::TerminalConfig;
use crate::error::Result;
use crate::protocol::{ClientMessage, OutboundEvent, Utf8Decoder};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Upper bound on flushing the client sink during teardown
const SINK_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Client messages waiting for the writer task. Input arriving while the
/// queue is full is dropped, like a terminal discarding typeahead.
pub const INPUT_QUEUE_DEPTH: usize = 256;

/// Proxy lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    /// Created, no process yet
    Idle,
    /// Process started, not yet attached to a channel
    Spawning,
    /// Forwarding in both directions
    Attached,
    /// Teardown in progress
    Draining,
    /// Resources released
    Closed,
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Spawning => "spawning",
            Self::Attached => "attached",
            Self::Draining => "draining",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Client stream ended
    ClientDisconnected,
    /// Shell output ended or the client sink stopped accepting events
    ProcessExited,
    /// Writing client input to the shell failed
    InputFailed,
    /// `run` was called without a spawned process
    NotStarted,
}

/// Bridges a client channel to a shell process.
pub struct TerminalProxy {
    session_id: String,
    state: ProxyState,
    grace_period: Duration,
    backend: Option<BackendKind>,
    output: Option<OutputStream>,
    control: Option<Box<dyn ProcessControl>>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<Box<dyn ProcessControl>>>,
    stop: CancellationToken,
    input_failed: CancellationToken,
}

impl TerminalProxy {
    /// Create an idle proxy
    pub fn new(session_id: impl Into<String>, grace_period: Duration) -> Self {
        Self {
            session_id: session_id.into(),
            state: ProxyState::Idle,
            grace_period,
            backend: None,
            output: None,
            control: None,
            reader: None,
            writer: None,
            stop: CancellationToken::new(),
            input_failed: CancellationToken::new(),
        }
    }

    /// Create a proxy around an already started process
    pub fn with_process(
        session_id: impl Into<String>,
        process: SpawnedProcess,
        grace_period: Duration,
    ) -> Self {
        let mut proxy = Self::new(session_id, grace_period);
        proxy.install(process);
        proxy
    }

    /// Session identifier used in logs
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current state
    pub fn state(&self) -> ProxyState {
        self.state
    }

    /// Backend of the attached process, if any
    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }

    fn transition(&mut self, to: ProxyState) {
        debug!(session_id = %self.session_id, from = %self.state, to = %to, "Proxy state change");
        self.state = to;
    }

    fn install(&mut self, process: SpawnedProcess) {
        self.transition(ProxyState::Spawning);
        self.backend = Some(process.kind());
        self.output = Some(process.output);
        self.control = Some(process.control);
    }

    /// Start the shell described by `config`.
    pub fn spawn(&mut self, config: &TerminalConfig) -> Result<BackendKind> {
        if self.state != ProxyState::Idle {
            warn!(session_id = %self.session_id, state = %self.state, "Spawn ignored, proxy not idle");
            return self.backend().ok_or_else(|| {
                crate::Error::ProcessGone(format!("proxy is {}", self.state))
            });
        }
        match spawn_shell(config) {
            Ok(process) => {
                let kind = process.kind();
                self.install(process);
                Ok(kind)
            }
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Failed to spawn shell");
                self.transition(ProxyState::Closed);
                Err(e)
            }
        }
    }

    /// Forward until either side ends, then tear down.
    ///
    /// `outbound` is moved into the reader task; `inbound` yields raw client
    /// payloads and is polled by the control loop.
    pub async fn run<Tx, Rx>(&mut self, outbound: Tx, mut inbound: Rx) -> CloseReason
    where
        Tx: Sink<OutboundEvent> + Send + Unpin + 'static,
        Rx: Stream<Item = String> + Unpin,
    {
        let (Some(output), Some(control)) = (self.output.take(), self.control.take()) else {
            warn!(session_id = %self.session_id, state = %self.state, "Run called without a process");
            return CloseReason::NotStarted;
        };

        self.transition(ProxyState::Attached);
        self.reader = Some(tokio::spawn(pump_output(
            output,
            outbound,
            self.stop.clone(),
            self.session_id.clone(),
        )));

        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE_DEPTH);
        self.writer = Some(tokio::spawn(pump_input(
            control,
            input_rx,
            self.stop.clone(),
            self.input_failed.clone(),
            self.session_id.clone(),
        )));

        let reason = loop {
            let frame = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break self.stopped_reason(),
                frame = inbound.next() => frame,
            };
            let Some(raw) = frame else {
                break CloseReason::ClientDisconnected;
            };
            if let Err(reason) = self.dispatch(&input_tx, &raw) {
                break reason;
            }
        };
        drop(input_tx);

        info!(session_id = %self.session_id, reason = ?reason, "Terminal session ending");
        self.close().await;
        reason
    }

    fn stopped_reason(&self) -> CloseReason {
        if self.input_failed.is_cancelled() {
            CloseReason::InputFailed
        } else {
            CloseReason::ProcessExited
        }
    }

    fn dispatch(
        &self,
        input: &mpsc::Sender<ClientMessage>,
        raw: &str,
    ) -> std::result::Result<(), CloseReason> {
        match input.try_send(ClientMessage::parse(raw)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(message)) => {
                warn!(session_id = %self.session_id, kind = message_kind(&message), "Shell not reading input, message dropped");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(self.stopped_reason()),
        }
    }

    /// Release every resource held by the session. Idempotent.
    pub async fn close(&mut self) {
        if matches!(self.state, ProxyState::Closed | ProxyState::Draining) {
            return;
        }
        self.transition(ProxyState::Draining);
        self.stop.cancel();

        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.await {
                warn!(session_id = %self.session_id, error = %e, "Reader task failed");
            }
        }
        self.output.take();

        if let Some(writer) = self.writer.take() {
            match writer.await {
                Ok(control) => self.control = Some(control),
                // The handle was dropped with the task, which kills the child
                Err(e) => warn!(session_id = %self.session_id, error = %e, "Writer task failed"),
            }
        }

        if let Some(mut control) = self.control.take() {
            if let Err(e) = control.terminate(self.grace_period).await {
                warn!(session_id = %self.session_id, error = %e, "Failed to terminate shell");
            }
        }

        self.backend = None;
        self.transition(ProxyState::Closed);
        info!(session_id = %self.session_id, "Terminal session closed");
    }
}

impl Drop for TerminalProxy {
    fn drop(&mut self) {
        if self.state != ProxyState::Closed {
            self.stop.cancel();
            if let Some(reader) = self.reader.take() {
                reader.abort();
            }
            if let Some(writer) = self.writer.take() {
                writer.abort();
            }
            // Controls kill their child on drop
        }
    }
}

impl fmt::Debug for TerminalProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalProxy")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("backend", &self.backend())
            .finish_non_exhaustive()
    }
}

/// Forward shell output to the client until EOF, a send failure, or cancel.
async fn pump_output<Tx>(
    mut output: OutputStream,
    mut outbound: Tx,
    stop: CancellationToken,
    session_id: String,
) where
    Tx: Sink<OutboundEvent> + Unpin,
{
    let mut decoder = Utf8Decoder::new();
    let mut forwarded = 0usize;

    loop {
        let chunk = tokio::select! {
            _ = stop.cancelled() => break,
            chunk = output.next() => chunk,
        };
        let text = match chunk {
            Some(Ok(bytes)) => decoder.decode(&bytes),
            Some(Err(e)) => {
                debug!(session_id = %session_id, error = %e, "Shell output ended");
                break;
            }
            None => break,
        };
        if text.is_empty() {
            continue;
        }

        forwarded += text.len();
        let sent = tokio::select! {
            _ = stop.cancelled() => break,
            sent = outbound.send(OutboundEvent::output(text)) => sent,
        };
        if sent.is_err() {
            debug!(session_id = %session_id, "Client sink closed");
            break;
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() && !stop.is_cancelled() {
        let _ = outbound.send(OutboundEvent::output(rest)).await;
    }

    debug!(session_id = %session_id, bytes = forwarded, "Reader finished");
    stop.cancel();
    let _ = tokio::time::timeout(SINK_CLOSE_TIMEOUT, outbound.close()).await;
}

/// Apply client messages to the shell in arrival order until the queue
/// closes, a write fails, or the session stops. Hands the process back.
async fn pump_input(
    mut control: Box<dyn ProcessControl>,
    mut input: mpsc::Receiver<ClientMessage>,
    stop: CancellationToken,
    input_failed: CancellationToken,
    session_id: String,
) -> Box<dyn ProcessControl> {
    loop {
        let message = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            message = input.recv() => message,
        };
        let Some(message) = message else {
            break;
        };

        match message {
            ClientMessage::Input(data) => {
                // A shell that stops reading blocks this write until teardown
                let written = tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    written = control.write(data.as_bytes()) => written,
                };
                if let Err(e) = written {
                    warn!(session_id = %session_id, error = %e, "Failed to write to shell");
                    input_failed.cancel();
                    stop.cancel();
                    break;
                }
            }
            ClientMessage::Resize { cols, rows } => {
                if !control.supports_resize() {
                    debug!(session_id = %session_id, cols, rows, "Resize ignored by backend");
                } else if let Err(e) = control.resize(cols, rows) {
                    warn!(session_id = %session_id, error = %e, "Resize failed");
                }
            }
        }
    }

    debug!(session_id = %session_id, "Writer finished");
    control
}

fn message_kind(message: &ClientMessage) -> &'static str {
    match message {
        ClientMessage::Input(_) => "input",
        ClientMessage::Resize { .. } => "resize",
    }
}
