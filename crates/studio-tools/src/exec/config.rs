/// Executables that may be run through the command runner
pub const SAFE_COMMANDS: &[&str] = &[
    "ls", "dir", "git", "npm", "pnpm", "pip", "pytest", "python", "node",
];

/// Configuration for the command runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecConfig {
    /// Executable names accepted as the first command token (exact match)
    pub allowed_commands: Vec<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            allowed_commands: SAFE_COMMANDS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl ExecConfig {
    /// Build a config from an explicit list of executable names
    #[must_use]
    pub fn with_allowed<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_commands: commands.into_iter().map(Into::into).collect(),
        }
    }
}
