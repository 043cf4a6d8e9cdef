//! Health check endpoints
//!
//! Provides:
//! - `/health` — simple "healthy" + version (for load balancers)
//! - `/health/detailed` — per-component status (workspace, assistant, terminal)

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use studio_terminal::TerminalConfig;
use studio_tools::{AssistantAdapter, Workspace};

/// Simple health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health response with per-component checks
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

/// All component health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub workspace: ComponentHealth,
    pub assistant: ComponentHealth,
    pub terminal: ComponentHealth,
}

/// Individual component health status
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    fn healthy_with_details(details: serde_json::Value) -> Self {
        Self {
            status: "healthy",
            error: None,
            details: Some(details),
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy",
            error: Some(error),
            details: None,
        }
    }
}

/// Simple health check (for load balancers)
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Detailed health check with all component statuses
async fn detailed_health_check(
    Extension(workspace): Extension<Arc<Workspace>>,
    Extension(assistant): Extension<Arc<AssistantAdapter>>,
    Extension(terminal): Extension<Arc<TerminalConfig>>,
) -> Json<DetailedHealthResponse> {
    let workspace_health = check_workspace(&workspace).await;

    let assistant_health = ComponentHealth::healthy_with_details(serde_json::json!({
        "mode": if assistant.is_mock() { "mock" } else { "command" },
    }));

    let terminal_health = ComponentHealth::healthy_with_details(serde_json::json!({
        "shell": terminal.program(),
        "pty": cfg!(unix),
    }));

    let status = if workspace_health.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            workspace: workspace_health,
            assistant: assistant_health,
            terminal: terminal_health,
        },
    })
}

async fn check_workspace(workspace: &Workspace) -> ComponentHealth {
    match tokio::fs::metadata(workspace.root()).await {
        Ok(meta) if meta.is_dir() => ComponentHealth::healthy_with_details(serde_json::json!({
            "root": workspace.root().display().to_string(),
            "max_text_bytes": workspace.max_text_bytes(),
        })),
        Ok(_) => ComponentHealth::unhealthy("workspace root is not a directory".to_string()),
        Err(e) => ComponentHealth::unhealthy(format!("workspace root unavailable: {}", e)),
    }
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
}
