//! WebSocket module for Studio
//!
//! Provides real-time communication endpoints:
//! - /ws/terminal - Interactive shell session
//! - /ws/session/{session_id} - Assistant conversation stream

pub mod session;
pub mod terminal;

pub use session::session_handler;
pub use terminal::terminal_handler;

use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;

/// Server-wide shutdown token; open sessions end when it is cancelled
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken(pub CancellationToken);

/// Create the WebSocket router
pub fn websocket_router() -> Router {
    Router::new()
        .route("/ws/terminal", get(terminal_handler))
        .route("/ws/session/:session_id", get(session_handler))
}
