//! File tree - path guard and workspace-rooted file operations

pub mod guard;
#[cfg(test)]
mod tests;
pub mod workspace;

pub use guard::{check_relative, resolve};
pub use workspace::{FsItem, Workspace, DEFAULT_MAX_TEXT_BYTES};
