use super::config::ExecConfig;
use crate::error::{Error, Result};
use tracing::warn;

/// Check command tokens against the allowlist, returning the program name.
///
/// The first token must match an allowed name exactly; paths such as
/// `/usr/bin/ls` are not reduced to their basename.
pub fn check_command<'a>(config: &ExecConfig, tokens: &'a [String]) -> Result<&'a str> {
    let program = tokens.first().ok_or(Error::EmptyCommand)?;

    if !config.allowed_commands.iter().any(|allowed| allowed == program) {
        warn!(command = %program, "Blocked command outside allowlist");
        return Err(Error::CommandNotAllowed(program.clone()));
    }

    Ok(program)
}
