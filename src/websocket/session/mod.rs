//! Assistant session WebSocket handler
//!
//! Each text frame is one prompt. The reply is streamed back as `partial`
//! events followed by exactly one `final`, all sharing one `messageId`.
//! Prompts on one connection are answered in order.

mod protocol;
#[cfg(test)]
mod tests;

pub use protocol::{PromptRequest, SessionEvent};

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::Path,
    response::IntoResponse,
    Extension,
};
use futures_util::{future, Sink, SinkExt, StreamExt};
use studio_tools::AssistantAdapter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ShutdownToken;

/// WebSocket upgrade handler
pub async fn session_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    Extension(assistant): Extension<Arc<AssistantAdapter>>,
    Extension(ShutdownToken(shutdown)): Extension<ShutdownToken>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, assistant, shutdown))
}

/// Handle WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    session_id: String,
    assistant: Arc<AssistantAdapter>,
    shutdown: CancellationToken,
) {
    info!(session_id = %session_id, "Assistant session established");

    let (sender, mut receiver) = socket.split();
    let mut events = sender.with(|event: SessionEvent| {
        future::ready(Ok::<_, axum::Error>(Message::Text(event.to_json())))
    });

    loop {
        let msg = tokio::select! {
            _ = shutdown.cancelled() => break,
            msg = receiver.next() => msg,
        };
        match msg {
            Some(Ok(Message::Text(text))) => {
                if answer(&mut events, &session_id, &assistant, &text).await.is_err() {
                    debug!(session_id = %session_id, "Client went away mid-reply");
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                warn!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    info!(session_id = %session_id, "Assistant session ended");
}

/// Stream the reply to one raw prompt payload into `sink`.
///
/// Fails only when the sink does; a dropped fragment stream stops the
/// assistant process.
pub async fn answer<S>(
    sink: &mut S,
    session_id: &str,
    assistant: &AssistantAdapter,
    raw: &str,
) -> Result<(), S::Error>
where
    S: Sink<SessionEvent> + Unpin,
{
    let request = PromptRequest::parse(raw);
    let message_id = request
        .message_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    debug!(session_id = %session_id, message_id = %message_id, "Prompt received");

    match assistant.stream(&request.text) {
        Ok(mut fragments) => {
            let mut count = 0usize;
            while let Some(fragment) = fragments.next().await {
                sink.send(SessionEvent::partial(session_id, &message_id, fragment))
                    .await?;
                count += 1;
            }
            debug!(session_id = %session_id, message_id = %message_id, fragments = count, "Reply complete");
        }
        Err(e) => {
            warn!(session_id = %session_id, message_id = %message_id, error = %e, "Assistant unavailable");
        }
    }

    sink.send(SessionEvent::final_event(session_id, &message_id))
        .await
}
