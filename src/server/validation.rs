//! Configuration validation
//!
//! Security and sanity checks run once at startup. Problems are logged, not fatal.

use super::config::AppConfig;
use tracing::warn;

/// Interpreters that turn the allowlist into arbitrary command execution
const SHELL_PROGRAMS: &[&str] = &["sh", "bash", "zsh", "fish", "dash", "cmd", "powershell", "pwsh"];

/// Validate configuration, returning the warnings that were logged
pub fn validate_config(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let host = config.server.host.as_str();
    if host != "127.0.0.1" && host != "localhost" && host != "::1" {
        warnings.push(format!(
            "Server is binding to {} without authentication. \
             Anyone who can reach it gets a shell in the workspace.",
            host
        ));
    }

    if !config.workspace.root.is_dir() {
        warnings.push(format!(
            "Workspace root {} does not exist or is not a directory",
            config.workspace.root.display()
        ));
    }

    for cmd in &config.exec.allowed_commands {
        if SHELL_PROGRAMS.contains(&cmd.as_str()) {
            warnings.push(format!("Command allowlist contains the shell '{}'", cmd));
        }
    }

    if config.server.cors_origin == "*" {
        warnings.push("CORS allows any origin".to_string());
    }

    for warning in &warnings {
        warn!("SECURITY WARNING: {}", warning);
    }
    warnings
}
