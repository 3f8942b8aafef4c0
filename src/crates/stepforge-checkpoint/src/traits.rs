//! Checkpoint store abstraction

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Handle to one workspace snapshot archive on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHandle {
    pub project_id: Uuid,
    pub archive_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Snapshot and restore of whole project workspaces.
///
/// `snapshot` must not report success until the archive is fully written
/// and flushed - a partially written archive must never be visible to
/// `restore_latest`. `restore_latest` is destructive-and-replace: the
/// current workspace contents are wiped before extraction, never merged.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Archive the entire workspace subtree, preserving relative paths
    async fn snapshot(&self, project_id: Uuid, workspace: &Path) -> Result<CheckpointHandle>;

    /// Restore the most recent archive, replacing the workspace.
    ///
    /// Returns `false` without mutating anything when no archive exists.
    async fn restore_latest(&self, project_id: Uuid, workspace: &Path) -> Result<bool>;

    /// All archives for a project, oldest first
    async fn list(&self, project_id: Uuid) -> Result<Vec<CheckpointHandle>>;
}
