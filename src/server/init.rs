//! Server initialization
//!
//! Builds the router from configuration and runs it until a shutdown signal.

use super::config::AppConfig;
use super::loader::load_config;
use super::shutdown::shutdown_signal_with_token;
use super::validation::validate_config;
use crate::api::{api_router, health_routes};
use crate::websocket::{websocket_router, ShutdownToken};
use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use studio_tools::AssistantAdapter;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router with all shared state attached
pub fn build_router(config: &AppConfig, shutdown: CancellationToken) -> Result<Router> {
    let workspace = Arc::new(config.workspace.to_workspace());
    let root = workspace.root().to_path_buf();
    let assistant = Arc::new(AssistantAdapter::new(config.assistant.to_config(&root)));
    let terminal = Arc::new(config.terminal.to_config(&root));

    if assistant.is_mock() {
        info!("No assistant command configured, assistant channel runs in mock mode");
    }

    let cors = cors_layer(&config.server.cors_origin)?;

    Ok(Router::new()
        .merge(health_routes())
        .merge(api_router())
        .merge(websocket_router())
        .layer(Extension(workspace))
        .layer(Extension(assistant))
        .layer(Extension(terminal))
        .layer(Extension(ShutdownToken(shutdown)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        ))
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {}", origin))?;
    Ok(layer.allow_origin(origin).allow_credentials(true))
}

/// Run the server
pub async fn run() -> Result<()> {
    let config = load_config()?;
    validate_config(&config);

    info!(
        root = %config.workspace.root.display(),
        allowed = ?config.exec.allowed_commands,
        "Workspace configured"
    );

    let shutdown = CancellationToken::new();
    let app = build_router(&config, shutdown.clone())?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_with_token(shutdown))
        .await
        .context("HTTP server error")?;

    info!("Studio shutdown complete");
    Ok(())
}
