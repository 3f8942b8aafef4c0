//! Per-project workspace directories

use std::path::PathBuf;

use uuid::Uuid;

/// Maps project ids to their sandboxed workspace directories under one root
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Workspace directory for a project; not created
    pub fn dir(&self, project_id: Uuid) -> PathBuf {
        self.root.join(project_id.to_string())
    }

    /// Workspace directory for a project, created if missing
    pub fn ensure(&self, project_id: Uuid) -> std::io::Result<PathBuf> {
        let dir = self.dir(project_id);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
