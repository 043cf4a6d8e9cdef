//! Terminal WebSocket handler
//!
//! Attaches each connection to its own shell through a [`TerminalProxy`].
//! Text frames carry control messages; binary frames are treated as input.

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use futures_util::{future, SinkExt, StreamExt};
use studio_terminal::{OutboundEvent, TerminalConfig, TerminalProxy};
use tracing::{info, warn};
use uuid::Uuid;

use super::ShutdownToken;

/// WebSocket upgrade handler
pub async fn terminal_handler(
    ws: WebSocketUpgrade,
    Extension(config): Extension<Arc<TerminalConfig>>,
    Extension(ShutdownToken(shutdown)): Extension<ShutdownToken>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, config, shutdown))
}

/// Handle WebSocket connection
async fn handle_socket(
    mut socket: WebSocket,
    config: Arc<TerminalConfig>,
    shutdown: tokio_util::sync::CancellationToken,
) {
    let session_id = Uuid::new_v4().to_string();
    info!(session_id = %session_id, "Terminal connection established");

    let mut proxy = TerminalProxy::new(session_id.clone(), config.grace_period);
    match proxy.spawn(&config) {
        Ok(backend) => info!(session_id = %session_id, backend = %backend, "Shell attached"),
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Closing terminal connection, shell unavailable");
            let _ = socket.close().await;
            return;
        }
    }

    let (sender, receiver) = socket.split();

    let outbound = sender.with(|event: OutboundEvent| {
        future::ready(Ok::<_, axum::Error>(Message::Text(event.to_json())))
    });

    let inbound = receiver
        .take_while(|msg| future::ready(matches!(msg, Ok(m) if !matches!(m, Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(text),
                Ok(Message::Binary(bytes)) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                _ => None,
            })
        })
        .take_until(shutdown.cancelled_owned());

    let reason = proxy.run(outbound, Box::pin(inbound)).await;
    info!(session_id = %session_id, reason = ?reason, "Terminal connection ended");
}
