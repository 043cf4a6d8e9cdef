//! Studio Tools - workspace-side building blocks
//!
//! This crate provides the pieces of Studio that touch the local machine
//! outside of the interactive terminal:
//! - Path guard: confines every filesystem path to the workspace root
//! - Workspace: guarded file-tree operations used by the REST layer
//! - Exec: allowlisted command runner producing output lines lazily
//! - Assistant: external assistant CLI adapter (with a scripted mock mode)
//! - Process: child processes with stdout and stderr on a single pipe

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assistant;
pub mod error;
pub mod exec;
pub mod fs;
pub mod process;

pub use assistant::{AssistantAdapter, AssistantConfig, FragmentStream, MOCK_FRAGMENTS};
pub use error::{Error, Result};
pub use exec::{run_command, ExecConfig, LineStream, SAFE_COMMANDS};
pub use fs::{check_relative, resolve, FsItem, Workspace};
pub use process::{spawn_merged, MergedOutput};
