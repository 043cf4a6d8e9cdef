//! Path guard - confines paths to the workspace root

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Reject relative paths that are absolute or contain a `..` segment.
///
/// The file-tree layer runs this before [`resolve`] so that obviously hostile
/// input never reaches the filesystem.
pub fn check_relative(rel: &str) -> Result<()> {
    let path = Path::new(rel);

    if path.is_absolute() || path.has_root() {
        warn!(path = %rel, "Absolute path rejected");
        return Err(Error::PathEscape(rel.to_string()));
    }

    if path.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_))) {
        warn!(path = %rel, "Path traversal attempt detected");
        return Err(Error::PathEscape(rel.to_string()));
    }

    Ok(())
}

/// Resolve `rel` under `root` to a canonical absolute path.
///
/// Existing prefixes are canonicalized (following symlinks); components that
/// do not exist yet are appended lexically. Fails with [`Error::PathEscape`]
/// unless the result is `root` itself or a descendant of it.
pub fn resolve(root: &Path, rel: &str) -> Result<PathBuf> {
    let root = root.canonicalize().map_err(|e| {
        warn!(root = %root.display(), error = %e, "Failed to canonicalize workspace root");
        Error::Io(e)
    })?;

    let joined = normalize(&root.join(rel));
    let resolved = canonicalize_existing_prefix(&joined)?;

    if resolved != root && !resolved.starts_with(&root) {
        warn!(
            path = %rel,
            resolved = %resolved.display(),
            root = %root.display(),
            "Path escape blocked"
        );
        return Err(Error::PathEscape(rel.to_string()));
    }

    debug!(path = %rel, resolved = %resolved.display(), "Path resolved");
    Ok(resolved)
}

/// Lexically fold `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the longest existing ancestor of `path` and re-attach the rest.
fn canonicalize_existing_prefix(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut tail = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(canonical) => {
                let mut out = canonical;
                for name in tail.iter().rev() {
                    out.push(name);
                }
                return Ok(out);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Dangling symlink: its target cannot be checked against the root.
                if existing.symlink_metadata().is_ok() {
                    return Err(Error::PathEscape(path.display().to_string()));
                }
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(Error::Io(e));
                };
                tail.push(name.to_os_string());
                existing = parent;
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }
}
