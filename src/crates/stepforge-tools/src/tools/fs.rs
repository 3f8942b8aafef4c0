//! Workspace file tools
//!
//! Every path in the argument set goes through [`PathGuard`] before any
//! read or write. Previews read but never write; applies report one file
//! artifact per touched path, hashed from the bytes on disk after the
//! write.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::args::{require_str, str_or};
use crate::diff::unified_diff;
use crate::error::{Result, ToolError};
use crate::guard::PathGuard;
use crate::hash::sha256_hex;
use crate::tool::{ApplyOutcome, FileChange, Preview, SideEffects, Tool};

async fn read_if_exists(path: &Path) -> Result<Option<String>> {
    if path.exists() {
        Ok(Some(tokio::fs::read_to_string(path).await?))
    } else {
        Ok(None)
    }
}

async fn write_with_parents(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}

async fn hash_on_disk(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(sha256_hex(&bytes))
}

/// Create or overwrite a file, auto-creating parent directories
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path"],
            "properties": {
                "path": {"type": "string"},
                "content": {"type": "string"}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        SideEffects::filesystem()
    }

    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview> {
        let rel = require_str(self.name(), args, "path")?;
        let content = str_or(args, "content", "");
        let target = PathGuard::new(workspace)?.resolve(rel)?;

        let before = read_if_exists(&target).await?;
        Ok(Preview::Diff {
            diff: unified_diff(before.as_deref().unwrap_or(""), content, rel),
            files: vec![FileChange {
                path: rel.to_string(),
                existed_before: before.is_some(),
            }],
        })
    }

    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let rel = require_str(self.name(), args, "path")?;
        let content = str_or(args, "content", "");
        let target = PathGuard::new(workspace)?.resolve(rel)?;

        write_with_parents(&target, content).await?;
        debug!(path = rel, bytes = content.len(), "wrote file");
        Ok(ApplyOutcome::file(rel, hash_on_disk(&target).await?))
    }
}

/// Literal substring substitution across a whole file
pub struct ReplaceTextTool;

impl ReplaceTextTool {
    fn parse<'a>(&self, args: &'a Value) -> Result<(&'a str, &'a str, &'a str)> {
        let rel = require_str(self.name(), args, "path")?;
        let search = require_str(self.name(), args, "search")?;
        if search.is_empty() {
            return Err(ToolError::failed(
                self.name(),
                "argument 'search' must not be empty",
            ));
        }
        Ok((rel, search, str_or(args, "replace", "")))
    }
}

#[async_trait]
impl Tool for ReplaceTextTool {
    fn name(&self) -> &str {
        "replace_text"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path", "search"],
            "properties": {
                "path": {"type": "string"},
                "search": {"type": "string"},
                "replace": {"type": "string"}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        SideEffects::filesystem()
    }

    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview> {
        let (rel, search, replace) = self.parse(args)?;
        let target = PathGuard::new(workspace)?.resolve(rel)?;

        let before = read_if_exists(&target)
            .await?
            .ok_or_else(|| ToolError::failed(self.name(), format!("File not found: {rel}")))?;
        let after = before.replace(search, replace);
        Ok(Preview::Diff {
            diff: unified_diff(&before, &after, rel),
            files: vec![FileChange {
                path: rel.to_string(),
                existed_before: true,
            }],
        })
    }

    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let (rel, search, replace) = self.parse(args)?;
        let target = PathGuard::new(workspace)?.resolve(rel)?;

        let before = read_if_exists(&target)
            .await?
            .ok_or_else(|| ToolError::failed(self.name(), format!("File not found: {rel}")))?;
        let after = before.replace(search, replace);
        tokio::fs::write(&target, &after).await?;
        debug!(path = rel, "replaced text");
        Ok(ApplyOutcome::file(rel, sha256_hex(after.as_bytes())))
    }
}

/// Append to a file, creating it (and parents) when absent
pub struct AppendFileTool;

#[async_trait]
impl Tool for AppendFileTool {
    fn name(&self) -> &str {
        "append_file"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path"],
            "properties": {
                "path": {"type": "string"},
                "content": {"type": "string"}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        SideEffects::filesystem()
    }

    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview> {
        let rel = require_str(self.name(), args, "path")?;
        let content = str_or(args, "content", "");
        let target = PathGuard::new(workspace)?.resolve(rel)?;

        let before = read_if_exists(&target).await?;
        let existing = before.as_deref().unwrap_or("");
        let after = format!("{existing}{content}");
        Ok(Preview::Diff {
            diff: unified_diff(existing, &after, rel),
            files: vec![FileChange {
                path: rel.to_string(),
                existed_before: before.is_some(),
            }],
        })
    }

    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let rel = require_str(self.name(), args, "path")?;
        let content = str_or(args, "content", "");
        let target = PathGuard::new(workspace)?.resolve(rel)?;

        let existing = read_if_exists(&target).await?.unwrap_or_default();
        write_with_parents(&target, &format!("{existing}{content}")).await?;
        debug!(path = rel, bytes = content.len(), "appended to file");
        Ok(ApplyOutcome::file(rel, hash_on_disk(&target).await?))
    }
}

/// Fixed starter page written by [`ScaffoldSiteTool`]
const SITE_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <script src="https://cdn.tailwindcss.com"></script>
    <title>__TITLE__</title>
  </head>
  <body class="min-h-screen bg-slate-950 text-slate-100 flex items-center justify-center">
    <main class="max-w-xl text-center space-y-4">
      <h1 class="text-4xl font-bold tracking-tight">__TITLE__</h1>
      <p class="opacity-75">Starter page. Replace the title and build from here.</p>
      <a class="px-4 py-2 rounded bg-white/10 hover:bg-white/20" href="#">Get started</a>
    </main>
  </body>
</html>
"##;

/// Write a minimal HTML starter page into `<dir>/index.html`
pub struct ScaffoldSiteTool;

impl ScaffoldSiteTool {
    fn index_rel(args: &Value) -> String {
        let dir = str_or(args, "dir", "site");
        format!("{}/index.html", dir.trim_end_matches('/'))
    }
}

#[async_trait]
impl Tool for ScaffoldSiteTool {
    fn name(&self) -> &str {
        "scaffold_site"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dir": {"type": "string"}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        SideEffects::filesystem()
    }

    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview> {
        let rel = Self::index_rel(args);
        let target = PathGuard::new(workspace)?.resolve(&rel)?;

        let before = read_if_exists(&target).await?;
        Ok(Preview::Diff {
            diff: unified_diff(before.as_deref().unwrap_or(""), SITE_TEMPLATE, &rel),
            files: vec![FileChange {
                path: rel,
                existed_before: before.is_some(),
            }],
        })
    }

    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let rel = Self::index_rel(args);
        let target = PathGuard::new(workspace)?.resolve(&rel)?;

        write_with_parents(&target, SITE_TEMPLATE).await?;
        debug!(path = %rel, "scaffolded site");
        Ok(ApplyOutcome::file(rel, hash_on_disk(&target).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256_file;
    use crate::tool::OutputKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        TempDir::new().unwrap()
    }

    #[tokio::test]
    async fn test_write_file_creates_file_with_exact_content() {
        let ws = workspace();
        let args = json!({"path": "README.md", "content": "# Project\nGoal: x\n"});

        let outcome = WriteFileTool.apply(ws.path(), &args).await.unwrap();

        let written = std::fs::read_to_string(ws.path().join("README.md")).unwrap();
        assert_eq!(written, "# Project\nGoal: x\n");
        assert_eq!(outcome.artifacts.len(), 1);
        assert_eq!(outcome.artifacts[0].kind, OutputKind::File);
        assert_eq!(outcome.artifacts[0].path, "README.md");
        assert_eq!(
            outcome.artifacts[0].hash,
            sha256_file(ws.path().join("README.md")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_write_file_creates_parent_directories() {
        let ws = workspace();
        let args = json!({"path": "deep/nested/file.txt", "content": "x"});
        WriteFileTool.apply(ws.path(), &args).await.unwrap();
        assert!(ws.path().join("deep/nested/file.txt").exists());
    }

    #[tokio::test]
    async fn test_write_file_preview_is_side_effect_free() {
        let ws = workspace();
        let args = json!({"path": "new.txt", "content": "hello\n"});

        let first = WriteFileTool.preview(ws.path(), &args).await.unwrap();
        assert!(!ws.path().join("new.txt").exists());

        let second = WriteFileTool.preview(ws.path(), &args).await.unwrap();
        match (first, second) {
            (Preview::Diff { diff: a, files: fa }, Preview::Diff { diff: b, files: fb }) => {
                assert_eq!(a, b);
                assert_eq!(fa, fb);
                assert!(!fa[0].existed_before);
                assert!(a.contains("+hello"));
            }
            _ => panic!("expected diff previews"),
        }
    }

    #[tokio::test]
    async fn test_write_file_rejects_traversal() {
        let ws = workspace();
        let args = json!({"path": "../../etc/passwd", "content": "x"});
        let err = WriteFileTool.apply(ws.path(), &args).await.unwrap_err();
        assert!(matches!(err, ToolError::PathTraversal(_)));
    }

    #[tokio::test]
    async fn test_replace_text_substitutes_every_occurrence() {
        let ws = workspace();
        std::fs::write(ws.path().join("page.html"), "__T__ and __T__").unwrap();
        let args = json!({"path": "page.html", "search": "__T__", "replace": "Hi"});

        ReplaceTextTool.apply(ws.path(), &args).await.unwrap();
        let content = std::fs::read_to_string(ws.path().join("page.html")).unwrap();
        assert_eq!(content, "Hi and Hi");
    }

    #[tokio::test]
    async fn test_replace_text_missing_file_fails_preview_and_apply() {
        let ws = workspace();
        let args = json!({"path": "site/index.html", "search": "__TITLE__", "replace": "Hello"});

        for err in [
            ReplaceTextTool.preview(ws.path(), &args).await.unwrap_err(),
            ReplaceTextTool.apply(ws.path(), &args).await.unwrap_err(),
        ] {
            match err {
                ToolError::Failed { message, .. } => {
                    assert!(message.contains("File not found"), "{message}")
                }
                other => panic!("expected tool failure, got {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_append_file_appends_and_creates() {
        let ws = workspace();
        let args = json!({"path": "log.txt", "content": "one\n"});

        AppendFileTool.apply(ws.path(), &args).await.unwrap();
        AppendFileTool.apply(ws.path(), &args).await.unwrap();

        let content = std::fs::read_to_string(ws.path().join("log.txt")).unwrap();
        assert_eq!(content, "one\none\n");
    }

    #[tokio::test]
    async fn test_scaffold_site_writes_template() {
        let ws = workspace();
        let outcome = ScaffoldSiteTool
            .apply(ws.path(), &json!({"dir": "site"}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(ws.path().join("site/index.html")).unwrap();
        assert!(content.contains("__TITLE__"));
        assert_eq!(outcome.artifacts[0].path, "site/index.html");
    }

    #[tokio::test]
    async fn test_scaffold_site_default_dir() {
        let ws = workspace();
        ScaffoldSiteTool.apply(ws.path(), &json!({})).await.unwrap();
        assert!(ws.path().join("site/index.html").exists());
    }
}
