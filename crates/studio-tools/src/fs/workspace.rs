//! Guarded file-tree operations rooted at the workspace directory

use super::guard::{check_relative, resolve};
use crate::error::{Error, Result};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Default maximum size of a text file served or written (2 MiB)
pub const DEFAULT_MAX_TEXT_BYTES: u64 = 2 * 1024 * 1024;

/// Directory entry returned by [`Workspace::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FsItem {
    /// File name
    pub name: String,
    /// Path relative to the workspace root, `/`-separated
    pub path: String,
    /// Whether the entry is a directory
    pub dir: bool,
}

/// File-tree operations confined to a single root directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    max_text_bytes: u64,
}

impl Workspace {
    /// Create a workspace with the default text size limit
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_limit(root, DEFAULT_MAX_TEXT_BYTES)
    }

    /// Create a workspace with a custom text size limit
    #[must_use]
    pub fn with_limit(root: impl Into<PathBuf>, max_text_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_text_bytes,
        }
    }

    /// Workspace root as configured
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maximum text size in bytes
    pub fn max_text_bytes(&self) -> u64 {
        self.max_text_bytes
    }

    /// Resolve a client-supplied relative path (empty means the root).
    pub fn abs_path(&self, rel: &str) -> Result<PathBuf> {
        check_relative(rel)?;
        let rel = if rel.is_empty() { "." } else { rel };
        resolve(&self.root, rel)
    }

    fn rel_path(&self, abs: &Path) -> Result<String> {
        let root = self.root.canonicalize()?;
        let rel = abs
            .strip_prefix(&root)
            .map_err(|_| Error::PathEscape(abs.display().to_string()))?;
        Ok(rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// List a directory; a file path lists its parent directory.
    ///
    /// Directories come first, then files, each group ordered by
    /// case-insensitive name.
    pub async fn list(&self, rel: &str) -> Result<Vec<FsItem>> {
        let mut target = self.abs_path(rel)?;
        let meta = match tokio::fs::metadata(&target).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(rel.to_string()))
            }
            Err(e) => return Err(Error::Io(e)),
        };
        if meta.is_file() {
            if let Some(parent) = target.parent() {
                target = parent.to_path_buf();
            }
        }

        let mut items = Vec::new();
        let mut entries = tokio::fs::read_dir(&target).await?;
        while let Some(entry) = entries.next_entry().await? {
            let dir = entry.file_type().await?.is_dir();
            items.push(FsItem {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: self.rel_path(&entry.path())?,
                dir,
            });
        }
        items.sort_by(|a, b| {
            b.dir
                .cmp(&a.dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        debug!(path = %rel, count = items.len(), "Listed directory");
        Ok(items)
    }

    /// All files below `rel`, as sorted root-relative paths.
    pub async fn tree(&self, rel: &str) -> Result<Vec<String>> {
        let start = self.abs_path(rel)?;
        match tokio::fs::metadata(&start).await {
            Ok(meta) if meta.is_file() => return Ok(vec![self.rel_path(&start)?]),
            Ok(_) => {}
            Err(_) => return Err(Error::NotFound(rel.to_string())),
        }

        let mut files = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(self.rel_path(&entry.path())?);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read a UTF-8 text file.
    pub async fn read(&self, rel: &str) -> Result<String> {
        let path = self.abs_path(rel)?;
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(Error::NotFound(rel.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(rel.to_string()))
            }
            Err(e) => return Err(Error::Io(e)),
        };
        if meta.len() > self.max_text_bytes {
            return Err(Error::TooLarge {
                size: meta.len(),
                limit: self.max_text_bytes,
            });
        }

        let bytes = tokio::fs::read(&path).await?;
        if bytes.contains(&0) {
            return Err(Error::NotText(rel.to_string()));
        }
        String::from_utf8(bytes).map_err(|_| Error::NotText(rel.to_string()))
    }

    /// Write a text file, creating parent directories and overwriting.
    pub async fn write(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.abs_path(rel)?;
        self.check_size(content)?;
        if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
            return Err(Error::InvalidInput(format!("cannot write a directory: {}", rel)));
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;

        info!(path = %rel, bytes = content.len(), "File written");
        Ok(())
    }

    /// Create a new text file; fails if anything already exists at `rel`.
    pub async fn create(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.abs_path(rel)?;
        self.check_size(content)?;
        if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
            return Err(Error::InvalidInput(format!("a directory exists at {}", rel)));
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::Conflict(rel.to_string()))
            }
            Err(e) => return Err(Error::Io(e)),
        };
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        info!(path = %rel, bytes = content.len(), "File created");
        Ok(())
    }

    /// Create a directory and any missing parents.
    pub async fn mkdir(&self, rel: &str) -> Result<()> {
        if rel.trim().is_empty() {
            return Err(Error::InvalidInput("path must not be empty".to_string()));
        }
        let path = self.abs_path(rel)?;
        match tokio::fs::create_dir_all(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::Conflict(rel.to_string()))
            }
            Err(e) => return Err(Error::Io(e)),
        }

        info!(path = %rel, "Directory created");
        Ok(())
    }

    /// Delete a file or an empty directory. Missing paths are not an error.
    pub async fn delete(&self, rel: &str) -> Result<()> {
        if rel.trim().is_empty() {
            return Err(Error::InvalidInput("path must not be empty".to_string()));
        }
        let path = self.abs_path(rel)?;
        if path == self.root.canonicalize()? {
            return Err(Error::InvalidInput("cannot delete the workspace root".to_string()));
        }
        let meta = match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::Io(e)),
        };

        if meta.is_dir() {
            let mut entries = tokio::fs::read_dir(&path).await?;
            if entries.next_entry().await?.is_some() {
                return Err(Error::InvalidInput(format!("directory not empty: {}", rel)));
            }
            tokio::fs::remove_dir(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }

        info!(path = %rel, "Path deleted");
        Ok(())
    }

    /// Move or rename `src` to `dst`, creating destination parents.
    pub async fn rename(&self, src: &str, dst: &str) -> Result<()> {
        if src.trim().is_empty() || dst.trim().is_empty() {
            return Err(Error::InvalidInput("paths must not be empty".to_string()));
        }
        let from = self.abs_path(src)?;
        let to = self.abs_path(dst)?;
        if tokio::fs::symlink_metadata(&from).await.is_err() {
            return Err(Error::NotFound(src.to_string()));
        }
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&from, &to).await?;

        info!(src = %src, dst = %dst, "Path moved");
        Ok(())
    }

    fn check_size(&self, content: &str) -> Result<()> {
        let size = content.len() as u64;
        if size > self.max_text_bytes {
            return Err(Error::TooLarge {
                size,
                limit: self.max_text_bytes,
            });
        }
        Ok(())
    }
}
