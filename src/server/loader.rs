//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let env_name = std::env::var("STUDIO_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables
        // prefix_separator("_") makes STUDIO_SERVER__PORT work (single _ after prefix).
        .add_source(
            Environment::with_prefix("STUDIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        // 4. Legacy deployment variables (highest priority)
        .set_override_option("workspace.root", std::env::var("PROJECT_ROOT").ok())
        .context("Invalid PROJECT_ROOT")?
        .set_override_option("assistant.command", std::env::var("CODEX_COMMAND").ok())
        .context("Invalid CODEX_COMMAND")?
        .set_override_option("server.port", legacy_port()?)
        .context("Invalid API_PORT")?
        .set_override_option("server.cors_origin", std::env::var("CORS_ORIGIN").ok())
        .context("Invalid CORS_ORIGIN")?
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

fn legacy_port() -> Result<Option<i64>> {
    match std::env::var("API_PORT") {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .map(|port| Some(i64::from(port)))
            .with_context(|| format!("API_PORT is not a valid port: {}", raw)),
        Err(_) => Ok(None),
    }
}
