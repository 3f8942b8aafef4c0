//! Tool contract and registry
//!
//! A [`Tool`] is a named unit of work with exactly two operations over a
//! workspace and an argument set:
//!
//! - [`Tool::preview`] - a dry run. MUST NOT mutate the workspace or any
//!   persistent state, and fails under the same conditions `apply` would,
//!   so previews are a true prediction of apply outcomes.
//! - [`Tool::apply`] - the mutation. Only safe to call after the executor
//!   has taken a checkpoint; that ordering is the executor's contract, not
//!   something tools enforce themselves.
//!
//! Tools also declare an informational argument schema (for UI and
//! validation hints) and a [`SideEffects`] record used for auditing and
//! future policy gating.
//!
//! [`ToolRegistry`] is the single name-to-tool mapping. It is constructed
//! explicitly at startup and threaded through the executor constructors;
//! there is no process-global tool table.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ToolError};
use crate::tools::{
    AppendFileTool, InstallDepsTool, MergeManifestTool, ReplaceTextTool, RunCommandTool,
    ScaffoldSiteTool, ShellEchoTool, WriteFileTool,
};

/// Declared side effects of a tool, for auditing and policy gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffects {
    pub filesystem: bool,
    pub network: bool,
    pub environment: bool,
}

impl SideEffects {
    /// No side effects at all
    pub const fn none() -> Self {
        Self {
            filesystem: false,
            network: false,
            environment: false,
        }
    }

    /// Touches the workspace filesystem only
    pub const fn filesystem() -> Self {
        Self {
            filesystem: true,
            network: false,
            environment: false,
        }
    }
}

/// One file a preview predicts the apply would touch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the workspace
    pub path: String,

    /// Whether the file already existed when the preview ran
    pub existed_before: bool,
}

/// What a dry run predicts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Preview {
    /// File-touching tools: a unified diff plus the affected paths
    Diff {
        diff: String,
        files: Vec<FileChange>,
    },

    /// Process tools: the rendered command line that would run
    Command { rendered: String },
}

/// Kind of output recorded in an [`ArtifactSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    File,
    Log,
}

/// A produced or modified output reported by a successful apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub kind: OutputKind,

    /// Path relative to the workspace
    pub path: String,

    /// Hex-encoded SHA-256 of the final bytes; empty for non-file outputs
    pub hash: String,
}

/// Captured output of a spawned process.
///
/// A non-zero exit status is not an error - the exit code is surfaced here
/// for the caller to inspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was killed (e.g. on timeout)
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

/// Result of a successful apply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyOutcome {
    /// One entry per produced file or output
    pub artifacts: Vec<ArtifactSpec>,

    /// Captured process output, for process tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessOutput>,
}

impl ApplyOutcome {
    /// Outcome carrying a single file artifact
    pub fn file(path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            artifacts: vec![ArtifactSpec {
                kind: OutputKind::File,
                path: path.into(),
                hash: hash.into(),
            }],
            process: None,
        }
    }

    /// Outcome carrying captured process output and no artifacts
    pub fn process(output: ProcessOutput) -> Self {
        Self {
            artifacts: Vec::new(),
            process: Some(output),
        }
    }
}

/// A named unit of work offering a dry run and a mutating apply
#[async_trait]
pub trait Tool: Send + Sync {
    /// Registered name
    fn name(&self) -> &str;

    /// Informational JSON Schema for the argument mapping
    fn args_schema(&self) -> Value;

    /// Declared side effects
    fn side_effects(&self) -> SideEffects;

    /// Dry run; must not mutate the workspace or any persistent state
    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview>;

    /// Perform the mutation and report produced artifacts or output
    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome>;
}

impl std::fmt::Debug for dyn Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool").field("name", &self.name()).finish()
    }
}

/// Name-to-tool mapping, built once at startup
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with all built-in tools registered.
    ///
    /// `command_timeout` bounds every spawned process (`run_command`,
    /// `install_deps`); the child is killed on expiry.
    pub fn builtin(command_timeout: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WriteFileTool));
        registry.register(Arc::new(ReplaceTextTool));
        registry.register(Arc::new(AppendFileTool));
        registry.register(Arc::new(ScaffoldSiteTool));
        registry.register(Arc::new(ShellEchoTool));
        registry.register(Arc::new(RunCommandTool::new(command_timeout)));
        registry.register(Arc::new(InstallDepsTool::new(command_timeout)));
        registry.register(Arc::new(MergeManifestTool));
        registry
    }

    /// Register a tool under its own name; later registrations win
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Resolve a tool by name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_string(),
                available: self.tool_names().join(", "),
            })
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Sorted registered names
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_contents() {
        let registry = ToolRegistry::builtin(Duration::from_secs(30));
        for name in [
            "write_file",
            "replace_text",
            "append_file",
            "scaffold_site",
            "shell_echo",
            "run_command",
            "install_deps",
            "merge_manifest",
        ] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
    }

    #[test]
    fn test_resolve_unknown_tool_lists_available() {
        let registry = ToolRegistry::builtin(Duration::from_secs(30));
        let err = registry.resolve("format_disk").unwrap_err();
        match err {
            ToolError::UnknownTool { name, available } => {
                assert_eq!(name, "format_disk");
                assert!(available.contains("write_file"));
            }
            other => panic!("expected UnknownTool, got {other}"),
        }
    }

    #[test]
    fn test_tool_names_sorted() {
        let registry = ToolRegistry::builtin(Duration::from_secs(30));
        let names = registry.tool_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_side_effect_declarations() {
        let registry = ToolRegistry::builtin(Duration::from_secs(30));
        assert!(!registry
            .resolve("shell_echo")
            .unwrap()
            .side_effects()
            .filesystem);
        assert!(registry
            .resolve("write_file")
            .unwrap()
            .side_effects()
            .filesystem);
        assert!(registry
            .resolve("run_command")
            .unwrap()
            .side_effects()
            .environment);
    }
}
