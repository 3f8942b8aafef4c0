//! Zip-backed checkpoint store
//!
//! One directory per project id under the store root, each archive named by
//! a zero-padded millisecond timestamp so lexical order is creation order.
//! Archives are written to a `.tmp` name and renamed into place only after
//! the bytes are flushed, so `restore_latest` can never see a partial
//! archive. Archives accumulate; nothing is garbage-collected here.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{CheckpointError, Result};
use crate::traits::{CheckpointHandle, CheckpointStore};

/// [`CheckpointStore`] writing deflate-compressed zip archives on disk
#[derive(Debug, Clone)]
pub struct ZipCheckpointStore {
    root: PathBuf,
}

impl ZipCheckpointStore {
    /// Store rooted at `root`; directories are created lazily per project
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one project's archives
    pub fn project_dir(&self, project_id: Uuid) -> PathBuf {
        self.root.join(project_id.to_string())
    }

    fn next_archive_path(&self, dir: &Path) -> PathBuf {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = dir.join(format!("{millis:013}.zip"));
            if !candidate.exists() {
                return candidate;
            }
            // Same-millisecond collision; bump until free
            millis += 1;
        }
    }

    fn archives(&self, project_id: Uuid) -> Result<Vec<PathBuf>> {
        let dir = self.project_dir(project_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut archives: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "zip"))
            .collect();
        archives.sort();
        Ok(archives)
    }

    fn created_at_from_name(path: &Path) -> DateTime<Utc> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<i64>().ok())
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .unwrap_or_else(Utc::now)
    }

    fn handle(&self, project_id: Uuid, archive_path: PathBuf) -> CheckpointHandle {
        let created_at = Self::created_at_from_name(&archive_path);
        CheckpointHandle {
            project_id,
            archive_path,
            created_at,
        }
    }

    fn write_archive(workspace: &Path, archive_path: &Path) -> Result<()> {
        let tmp_path = archive_path.with_extension("zip.tmp");
        let file = std::fs::File::create(&tmp_path)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(workspace).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(workspace)
                .map_err(|e| CheckpointError::Workspace(e.to_string()))?;
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            writer.start_file(name, options)?;
            let mut source = std::fs::File::open(entry.path())?;
            std::io::copy(&mut source, &mut writer)?;
        }

        let file = writer.finish()?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, archive_path)?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for ZipCheckpointStore {
    async fn snapshot(&self, project_id: Uuid, workspace: &Path) -> Result<CheckpointHandle> {
        if !workspace.is_dir() {
            return Err(CheckpointError::Workspace(format!(
                "not a directory: {}",
                workspace.display()
            )));
        }

        let dir = self.project_dir(project_id);
        std::fs::create_dir_all(&dir)?;
        let archive_path = self.next_archive_path(&dir);

        Self::write_archive(workspace, &archive_path)?;
        info!(
            project = %project_id,
            archive = %archive_path.display(),
            "workspace snapshot written"
        );
        Ok(self.handle(project_id, archive_path))
    }

    async fn restore_latest(&self, project_id: Uuid, workspace: &Path) -> Result<bool> {
        let Some(latest) = self.archives(project_id)?.pop() else {
            debug!(project = %project_id, "no archives to restore");
            return Ok(false);
        };

        if workspace.exists() {
            std::fs::remove_dir_all(workspace)?;
        }
        std::fs::create_dir_all(workspace)?;

        let file = std::fs::File::open(&latest)?;
        let mut archive = ZipArchive::new(file)?;
        archive.extract(workspace)?;

        info!(
            project = %project_id,
            archive = %latest.display(),
            "workspace restored from snapshot"
        );
        Ok(true)
    }

    async fn list(&self, project_id: Uuid) -> Result<Vec<CheckpointHandle>> {
        Ok(self
            .archives(project_id)?
            .into_iter()
            .map(|path| self.handle(project_id, path))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: ZipCheckpointStore,
        workspace: PathBuf,
        project_id: Uuid,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path().join("workspace");
        std::fs::create_dir(&workspace).unwrap();
        let store = ZipCheckpointStore::new(dir.path().join("checkpoints"));
        Fixture {
            store,
            workspace,
            project_id: Uuid::new_v4(),
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_snapshot_then_restore_is_byte_identical() {
        let fx = fixture();
        std::fs::create_dir_all(fx.workspace.join("site/css")).unwrap();
        std::fs::write(fx.workspace.join("README.md"), "# hello\n").unwrap();
        std::fs::write(fx.workspace.join("site/index.html"), "<h1>hi</h1>").unwrap();
        std::fs::write(fx.workspace.join("site/css/app.css"), "body{}").unwrap();

        fx.store
            .snapshot(fx.project_id, &fx.workspace)
            .await
            .unwrap();
        let restored = fx
            .store
            .restore_latest(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        assert!(restored);
        assert_eq!(
            std::fs::read_to_string(fx.workspace.join("README.md")).unwrap(),
            "# hello\n"
        );
        assert_eq!(
            std::fs::read_to_string(fx.workspace.join("site/index.html")).unwrap(),
            "<h1>hi</h1>"
        );
        assert_eq!(
            std::fs::read_to_string(fx.workspace.join("site/css/app.css")).unwrap(),
            "body{}"
        );
    }

    #[tokio::test]
    async fn test_restore_without_archives_is_a_noop() {
        let fx = fixture();
        std::fs::write(fx.workspace.join("keep.txt"), "kept").unwrap();

        let restored = fx
            .store
            .restore_latest(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        assert!(!restored);
        assert_eq!(
            std::fs::read_to_string(fx.workspace.join("keep.txt")).unwrap(),
            "kept"
        );
    }

    #[tokio::test]
    async fn test_restore_discards_changes_made_after_snapshot() {
        let fx = fixture();
        std::fs::write(fx.workspace.join("a.txt"), "original").unwrap();
        fx.store
            .snapshot(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        std::fs::write(fx.workspace.join("a.txt"), "mutated").unwrap();
        std::fs::write(fx.workspace.join("extra.txt"), "junk").unwrap();

        fx.store
            .restore_latest(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(fx.workspace.join("a.txt")).unwrap(),
            "original"
        );
        assert!(!fx.workspace.join("extra.txt").exists());
    }

    #[tokio::test]
    async fn test_restore_picks_most_recent_archive() {
        let fx = fixture();
        std::fs::write(fx.workspace.join("v.txt"), "one").unwrap();
        fx.store
            .snapshot(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        std::fs::write(fx.workspace.join("v.txt"), "two").unwrap();
        fx.store
            .snapshot(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        std::fs::write(fx.workspace.join("v.txt"), "scratch").unwrap();
        fx.store
            .restore_latest(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(fx.workspace.join("v.txt")).unwrap(),
            "two"
        );
    }

    #[tokio::test]
    async fn test_archives_accumulate_and_list_in_order() {
        let fx = fixture();
        std::fs::write(fx.workspace.join("f.txt"), "x").unwrap();

        for _ in 0..3 {
            fx.store
                .snapshot(fx.project_id, &fx.workspace)
                .await
                .unwrap();
        }

        let handles = fx.store.list(fx.project_id).await.unwrap();
        assert_eq!(handles.len(), 3);
        let mut paths: Vec<_> = handles.iter().map(|h| h.archive_path.clone()).collect();
        let sorted = {
            let mut p = paths.clone();
            p.sort();
            p
        };
        assert_eq!(paths, sorted);
        paths.dedup();
        assert_eq!(paths.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_workspace_roundtrip() {
        let fx = fixture();
        fx.store
            .snapshot(fx.project_id, &fx.workspace)
            .await
            .unwrap();
        let restored = fx
            .store
            .restore_latest(fx.project_id, &fx.workspace)
            .await
            .unwrap();
        assert!(restored);
        assert_eq!(std::fs::read_dir(&fx.workspace).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_requires_workspace_directory() {
        let fx = fixture();
        let missing = fx.workspace.join("nope");
        let err = fx.store.snapshot(fx.project_id, &missing).await.unwrap_err();
        assert!(matches!(err, CheckpointError::Workspace(_)));
    }

    #[tokio::test]
    async fn test_no_tmp_files_left_behind() {
        let fx = fixture();
        std::fs::write(fx.workspace.join("f.txt"), "x").unwrap();
        fx.store
            .snapshot(fx.project_id, &fx.workspace)
            .await
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(fx.store.project_dir(fx.project_id))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
