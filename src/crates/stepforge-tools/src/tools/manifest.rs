//! Dependency manifest merging
//!
//! The manifest is line-oriented (`requirements.txt` convention): one entry
//! per line, blank lines and `#` comments are not entries. Merging is
//! set-union with the existing entries, written back sorted and
//! de-duplicated.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::args::require_str_vec;
use crate::diff::unified_diff;
use crate::error::Result;
use crate::guard::PathGuard;
use crate::hash::sha256_hex;
use crate::tool::{ApplyOutcome, FileChange, Preview, SideEffects, Tool};

const MANIFEST: &str = "requirements.txt";

/// Merge package entries into the dependency manifest
pub struct MergeManifestTool;

impl MergeManifestTool {
    fn merged(existing: &str, packages: &[String]) -> String {
        let mut entries: BTreeSet<String> = existing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        entries.extend(packages.iter().map(|p| p.trim().to_string()));

        let mut out = entries.into_iter().collect::<Vec<_>>().join("\n");
        out.push('\n');
        out
    }

    async fn read_existing(&self, workspace: &Path) -> Result<(Option<String>, std::path::PathBuf)> {
        let target = PathGuard::new(workspace)?.resolve(MANIFEST)?;
        let existing = if target.exists() {
            Some(tokio::fs::read_to_string(&target).await?)
        } else {
            None
        };
        Ok((existing, target))
    }
}

#[async_trait]
impl Tool for MergeManifestTool {
    fn name(&self) -> &str {
        "merge_manifest"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["packages"],
            "properties": {
                "packages": {"type": "array", "items": {"type": "string"}}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        SideEffects::filesystem()
    }

    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview> {
        let packages = require_str_vec(self.name(), args, "packages")?;
        let (existing, _) = self.read_existing(workspace).await?;
        let before = existing.as_deref().unwrap_or("");
        let after = Self::merged(before, &packages);

        Ok(Preview::Diff {
            diff: unified_diff(before, &after, MANIFEST),
            files: vec![FileChange {
                path: MANIFEST.to_string(),
                existed_before: existing.is_some(),
            }],
        })
    }

    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let packages = require_str_vec(self.name(), args, "packages")?;
        let (existing, target) = self.read_existing(workspace).await?;
        let merged = Self::merged(existing.as_deref().unwrap_or(""), &packages);

        tokio::fs::write(&target, &merged).await?;
        debug!(entries = merged.lines().count(), "merged manifest");
        Ok(ApplyOutcome::file(MANIFEST, sha256_hex(merged.as_bytes())))
    }
}
