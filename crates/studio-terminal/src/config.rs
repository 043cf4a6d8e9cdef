//! Terminal session configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default terminal width in columns
pub const DEFAULT_COLS: u16 = 80;

/// Default terminal height in rows
pub const DEFAULT_ROWS: u16 = 24;

/// Default wait between the termination signal and a forced kill
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 2000;

/// Environment variables passed through to the shell.
const ENV_WHITELIST: &[&str] = &[
    "PATH", "HOME", "USER", "LANG", "LC_ALL", "TMPDIR", "XDG_RUNTIME_DIR", "SHELL",
    // Windows shells refuse to start without these
    "SYSTEMROOT", "COMSPEC", "USERPROFILE", "TEMP", "TMP", "PATHEXT",
];

/// Configuration for a spawned shell.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Shell program. Empty means `$SHELL`, falling back to the platform shell.
    pub shell: String,
    /// Arguments passed to the shell
    pub args: Vec<String>,
    /// Working directory
    pub cwd: Option<PathBuf>,
    /// Initial width (PTY only)
    pub cols: u16,
    /// Initial height (PTY only)
    pub rows: u16,
    /// Value of `TERM` for the shell
    pub term: String,
    /// Wait after the termination signal before killing
    pub grace_period: Duration,
    /// Environment variables inherited from the server
    pub env_whitelist: Vec<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            shell: String::new(),
            args: Vec::new(),
            cwd: None,
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            term: "xterm-256color".to_string(),
            grace_period: Duration::from_millis(DEFAULT_GRACE_PERIOD_MS),
            env_whitelist: ENV_WHITELIST.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl TerminalConfig {
    /// Config running `program` with `args` instead of the login shell
    #[must_use]
    pub fn command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shell: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Program to launch
    pub fn program(&self) -> String {
        if !self.shell.trim().is_empty() {
            return self.shell.clone();
        }
        if let Ok(shell) = std::env::var("SHELL") {
            if !shell.is_empty() {
                return shell;
            }
        }
        if cfg!(windows) {
            std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
        } else {
            "/bin/bash".to_string()
        }
    }

    /// Whitelisted variables present in the server environment
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.env_whitelist
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|val| (key.clone(), val)))
            .collect()
    }
}
