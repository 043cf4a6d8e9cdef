//! `studio ask` - one-shot assistant prompt

use crate::server::load_config;
use anyhow::{Context, Result};
use futures_util::StreamExt;
use std::io::Write;
use studio_tools::AssistantAdapter;

/// Stream the assistant's reply to `prompt` on stdout
pub async fn run(prompt: String) -> Result<()> {
    let config = load_config()?;
    let adapter = AssistantAdapter::new(config.assistant.to_config(&config.workspace.root));

    let mut fragments = adapter.stream(&prompt).context("Assistant unavailable")?;
    let mut stdout = std::io::stdout();
    while let Some(fragment) = fragments.next().await {
        stdout.write_all(fragment.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}
