//! CLI module for Studio
//!
//! Provides commands:
//! - `serve`: Start the HTTP/WebSocket server
//! - `exec`: Run an allowlisted command in the workspace
//! - `ask`: Stream an assistant reply to stdout

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod ask;
pub mod exec;

/// Studio workspace server CLI
#[derive(Parser, Debug)]
#[command(name = "studio")]
#[command(about = "Remote workspace server: files, terminal and assistant over HTTP/WebSocket")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve,
    /// Run an allowlisted command and print its output
    Exec {
        /// Working directory (defaults to the workspace root)
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Command and arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
    /// Ask the assistant and stream its reply
    Ask {
        /// Prompt text
        #[arg(required = true)]
        prompt: Vec<String>,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Exec { cwd, command }) => exec::run(cwd, command).await,
        Some(Commands::Ask { prompt }) => ask::run(prompt.join(" ")).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
