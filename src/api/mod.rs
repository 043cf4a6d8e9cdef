//! Web API module for Studio
//!
//! Provides REST API endpoints for:
//! - Health checks
//! - Workspace file tree operations

pub mod error;
pub mod fs;
pub mod health;

use axum::Router;

pub use error::ApiError;
pub use fs::fs_routes;
pub use health::health_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new().merge(fs_routes())
}
