//! Workspace path containment
//!
//! [`PathGuard`] is the safety foundation every file-touching tool resolves
//! paths through. It rejects absolute inputs and `..` components outright,
//! then verifies containment on the *canonical* form of both sides, so
//! neither string games nor symlinked ancestors can route a write outside
//! the workspace root. String-prefix comparison on un-normalized paths is
//! never the sole check.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ToolError};

/// Resolves relative paths against a workspace root, rejecting escapes
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Create a guard for an existing workspace root.
    ///
    /// The root is canonicalized once here; it must exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().canonicalize()?;
        Ok(Self { root })
    }

    /// Canonical workspace root this guard contains paths to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` against the root, failing with
    /// [`ToolError::PathTraversal`] unless the canonical result stays
    /// inside the root.
    ///
    /// Works for paths that do not exist yet: the deepest existing ancestor
    /// is canonicalized and the remaining suffix re-attached before the
    /// containment check, so a symlinked parent directory cannot smuggle a
    /// new file outside the workspace.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let relative = relative.as_ref();

        if relative.as_os_str().is_empty() {
            return Err(ToolError::PathTraversal("empty path".to_string()));
        }
        if relative.is_absolute() {
            return Err(ToolError::PathTraversal(format!(
                "absolute path not allowed: {}",
                relative.display()
            )));
        }
        for component in relative.components() {
            match component {
                Component::ParentDir => {
                    return Err(ToolError::PathTraversal(format!(
                        "path contains '..': {}",
                        relative.display()
                    )));
                }
                Component::Prefix(_) | Component::RootDir => {
                    return Err(ToolError::PathTraversal(format!(
                        "path is not relative: {}",
                        relative.display()
                    )));
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }

        let resolved = self.canonicalize_allowing_missing(&self.root.join(relative))?;
        if !resolved.starts_with(&self.root) {
            return Err(ToolError::PathTraversal(format!(
                "{} resolves outside the workspace",
                relative.display()
            )));
        }

        debug!(path = %resolved.display(), "path resolved inside workspace");
        Ok(resolved)
    }

    /// Canonicalize the deepest existing ancestor of `path` and re-attach
    /// the missing suffix.
    fn canonicalize_allowing_missing(&self, path: &Path) -> Result<PathBuf> {
        let mut existing = path.to_path_buf();
        let mut missing: Vec<std::ffi::OsString> = Vec::new();

        // symlink_metadata, not exists(): a dangling symlink is present on
        // disk and must be canonicalized (and fail), not skipped over as a
        // missing suffix.
        while existing.symlink_metadata().is_err() {
            match (existing.file_name(), existing.parent()) {
                (Some(name), Some(parent)) => {
                    missing.push(name.to_os_string());
                    existing = parent.to_path_buf();
                }
                // Ran out of components without finding anything on disk;
                // the root always exists, so this cannot happen for paths
                // joined onto it.
                _ => break,
            }
        }

        let mut resolved = existing.canonicalize()?;
        for name in missing.iter().rev() {
            resolved.push(name);
        }
        Ok(resolved)
    }
}
