//! `studio exec` - run an allowlisted command

use crate::server::load_config;
use anyhow::{Context, Result};
use futures_util::StreamExt;
use std::path::PathBuf;
use studio_tools::run_command;

/// Run `command` in `cwd` (or the workspace root), printing each output line
pub async fn run(cwd: Option<PathBuf>, command: Vec<String>) -> Result<()> {
    let config = load_config()?;
    let exec = config.exec.to_config();
    let cwd = cwd.unwrap_or_else(|| config.workspace.root.clone());

    let mut lines = run_command(&exec, &command, &cwd)
        .with_context(|| format!("Cannot run {:?}", command))?;
    while let Some(line) = lines.next().await {
        println!("{}", line);
    }
    Ok(())
}
