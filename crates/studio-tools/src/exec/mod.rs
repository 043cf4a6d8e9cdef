//! Exec - allowlisted command execution with streamed output

pub mod config;
pub mod runner;
pub mod security;

#[cfg(test)]
mod tests;

pub use config::{ExecConfig, SAFE_COMMANDS};
pub use runner::{run_command, LineStream};
