//! Server configuration types
//!
//! Contains all configuration structures for the Studio server, plus the
//! conversions into the library crates' own config types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use studio_terminal::TerminalConfig;
use studio_tools::fs::DEFAULT_MAX_TEXT_BYTES;
use studio_tools::{AssistantConfig, ExecConfig, Workspace, SAFE_COMMANDS};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub terminal: TerminalSettings,
    #[serde(default)]
    pub exec: ExecSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed browser origin (`*` allows any origin without credentials)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5050,
            cors_origin: default_cors_origin(),
        }
    }
}

/// Workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: u64,
}

fn default_max_text_bytes() -> u64 {
    DEFAULT_MAX_TEXT_BYTES
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

impl WorkspaceConfig {
    pub fn to_workspace(&self) -> Workspace {
        Workspace::with_limit(self.root.clone(), self.max_text_bytes)
    }
}

/// Assistant adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSettings {
    /// External command line; empty means mock mode
    #[serde(default)]
    pub command: String,
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
}

fn default_mock_delay_ms() -> u64 {
    studio_tools::assistant::DEFAULT_MOCK_DELAY_MS
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            command: String::new(),
            mock_delay_ms: default_mock_delay_ms(),
        }
    }
}

impl AssistantSettings {
    pub fn to_config(&self, workspace_root: &Path) -> AssistantConfig {
        AssistantConfig {
            command: self.command.clone(),
            mock_delay: Duration::from_millis(self.mock_delay_ms),
            working_dir: Some(workspace_root.to_path_buf()),
        }
    }
}

/// Interactive terminal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// Shell program; empty means `$SHELL` or the platform default
    #[serde(default)]
    pub shell: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_cols")]
    pub cols: u16,
    #[serde(default = "default_rows")]
    pub rows: u16,
    #[serde(default = "default_term")]
    pub term: String,
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

fn default_cols() -> u16 {
    studio_terminal::config::DEFAULT_COLS
}

fn default_rows() -> u16 {
    studio_terminal::config::DEFAULT_ROWS
}

fn default_term() -> String {
    "xterm-256color".to_string()
}

fn default_grace_period_ms() -> u64 {
    studio_terminal::config::DEFAULT_GRACE_PERIOD_MS
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            shell: String::new(),
            args: Vec::new(),
            cols: default_cols(),
            rows: default_rows(),
            term: default_term(),
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

impl TerminalSettings {
    pub fn to_config(&self, workspace_root: &Path) -> TerminalConfig {
        TerminalConfig {
            shell: self.shell.clone(),
            args: self.args.clone(),
            cwd: Some(workspace_root.to_path_buf()),
            cols: self.cols,
            rows: self.rows,
            term: self.term.clone(),
            grace_period: Duration::from_millis(self.grace_period_ms),
            ..TerminalConfig::default()
        }
    }
}

/// Command allowlist configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecSettings {
    #[serde(default = "default_allowed_commands")]
    pub allowed_commands: Vec<String>,
}

fn default_allowed_commands() -> Vec<String> {
    SAFE_COMMANDS.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            allowed_commands: default_allowed_commands(),
        }
    }
}

impl ExecSettings {
    pub fn to_config(&self) -> ExecConfig {
        ExecConfig::with_allowed(self.allowed_commands.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::loader::DEFAULT_CONFIG;
    use config::{Config, File, FileFormat};

    fn embedded_defaults() -> AppConfig {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_embedded_defaults_match_struct_defaults() {
        let embedded = embedded_defaults();
        let defaults = AppConfig::default();

        assert_eq!(embedded.server.host, defaults.server.host);
        assert_eq!(embedded.server.port, 5050);
        assert_eq!(embedded.server.cors_origin, "http://localhost:3000");
        assert_eq!(embedded.workspace.root, PathBuf::from("."));
        assert_eq!(embedded.workspace.max_text_bytes, 2 * 1024 * 1024);
        assert_eq!(embedded.assistant.mock_delay_ms, 150);
        assert!(embedded.assistant.command.is_empty());
        assert_eq!(embedded.terminal.cols, 80);
        assert_eq!(embedded.terminal.rows, 24);
        assert_eq!(embedded.terminal.grace_period_ms, 2000);
        assert_eq!(embedded.exec.allowed_commands, defaults.exec.allowed_commands);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str("[server]\nhost = \"0.0.0.0\"\nport = 9000\n", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origin, "http://localhost:3000");
        assert_eq!(config.exec.allowed_commands.len(), SAFE_COMMANDS.len());
        assert_eq!(config.terminal.term, "xterm-256color");
    }

    #[test]
    fn test_conversions_use_workspace_root() {
        let config = AppConfig::default();
        let root = Path::new("/srv/project");

        let terminal = config.terminal.to_config(root);
        assert_eq!(terminal.cwd.as_deref(), Some(root));
        assert_eq!(terminal.grace_period, Duration::from_millis(2000));

        let assistant = config.assistant.to_config(root);
        assert_eq!(assistant.working_dir.as_deref(), Some(root));
        assert_eq!(assistant.mock_delay, Duration::from_millis(150));

        let exec = config.exec.to_config();
        assert!(exec.allowed_commands.iter().any(|c| c == "git"));
    }
}
