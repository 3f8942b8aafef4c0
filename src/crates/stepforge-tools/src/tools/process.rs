//! Process tools
//!
//! Spawned commands run inside the workspace, are bounded by a timeout and
//! are killed on expiry (`kill_on_drop`). A non-zero exit is captured as
//! structured output, never raised; only failure to spawn is a tool error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::args::{require_str_vec, str_or, str_vec_or, u64_opt};
use crate::error::{Result, ToolError};
use crate::guard::PathGuard;
use crate::tool::{ApplyOutcome, ArtifactSpec, OutputKind, Preview, ProcessOutput, SideEffects, Tool};

async fn run_captured(
    tool: &str,
    program: &str,
    args: &[String],
    cwd: &Path,
    limit: Duration,
) -> Result<ProcessOutput> {
    let mut command = Command::new(program);
    command.args(args).current_dir(cwd).kill_on_drop(true);

    match timeout(limit, command.output()).await {
        Ok(Ok(output)) => Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
        }),
        Ok(Err(e)) => Err(ToolError::failed(
            tool,
            format!("failed to spawn '{program}': {e}"),
        )),
        Err(_) => {
            warn!(tool, program, "command timed out after {:?}", limit);
            Ok(ProcessOutput {
                exit_code: None,
                stdout: String::new(),
                stderr: format!("command timed out after {}s", limit.as_secs()),
                timed_out: true,
            })
        }
    }
}

/// Echo text back as captured output; no filesystem mutation
pub struct ShellEchoTool;

#[async_trait]
impl Tool for ShellEchoTool {
    fn name(&self) -> &str {
        "shell_echo"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string"}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        SideEffects::none()
    }

    async fn preview(&self, _workspace: &Path, args: &Value) -> Result<Preview> {
        let text = str_or(args, "text", "");
        Ok(Preview::Command {
            rendered: format!("$ echo {text:?}\n{text}\n"),
        })
    }

    async fn apply(&self, _workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let text = str_or(args, "text", "");
        Ok(ApplyOutcome {
            artifacts: vec![ArtifactSpec {
                kind: OutputKind::Log,
                path: "echo.log".to_string(),
                hash: String::new(),
            }],
            process: Some(ProcessOutput {
                exit_code: Some(0),
                stdout: text.to_string(),
                stderr: String::new(),
                timed_out: false,
            }),
        })
    }
}

/// Spawn an argument vector inside the workspace and capture its output
pub struct RunCommandTool {
    default_timeout: Duration,
}

impl RunCommandTool {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    fn parse(&self, args: &Value) -> Result<(Vec<String>, String, Duration)> {
        let argv = require_str_vec(self.name(), args, "argv")?;
        let cwd = str_or(args, "cwd", ".").to_string();
        let limit = u64_opt(args, "timeout_secs")
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);
        Ok((argv, cwd, limit))
    }

    fn resolve_cwd(&self, workspace: &Path, cwd: &str) -> Result<PathBuf> {
        let dir = PathGuard::new(workspace)?.resolve(cwd)?;
        if !dir.is_dir() {
            return Err(ToolError::failed(
                self.name(),
                format!("working directory not found: {cwd}"),
            ));
        }
        Ok(dir)
    }

    fn render(argv: &[String], cwd: &str) -> String {
        let mut rendered = format!("$ {}", argv.join(" "));
        if cwd != "." {
            rendered.push_str(&format!("  (cwd: {cwd})"));
        }
        rendered
    }
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["argv"],
            "properties": {
                "argv": {"type": "array", "items": {"type": "string"}},
                "cwd": {"type": "string"},
                "timeout_secs": {"type": "integer"}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        // An arbitrary command can touch anything
        SideEffects {
            filesystem: true,
            network: true,
            environment: true,
        }
    }

    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview> {
        let (argv, cwd, _) = self.parse(args)?;
        self.resolve_cwd(workspace, &cwd)?;
        Ok(Preview::Command {
            rendered: Self::render(&argv, &cwd),
        })
    }

    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let (argv, cwd, limit) = self.parse(args)?;
        let dir = self.resolve_cwd(workspace, &cwd)?;

        debug!(command = %argv.join(" "), cwd = %cwd, "running command");
        let output = run_captured(self.name(), &argv[0], &argv[1..], &dir, limit).await?;
        Ok(ApplyOutcome::process(output))
    }
}

/// Invoke the project virtualenv's pip against the dependency manifest
pub struct InstallDepsTool {
    default_timeout: Duration,
}

impl InstallDepsTool {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    fn pip_rel() -> &'static str {
        if cfg!(windows) {
            ".venv\\Scripts\\pip.exe"
        } else {
            ".venv/bin/pip"
        }
    }

    fn extra_args(args: &Value) -> Vec<String> {
        str_vec_or(args, "args", &["-r", "requirements.txt"])
    }
}

#[async_trait]
impl Tool for InstallDepsTool {
    fn name(&self) -> &str {
        "install_deps"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "args": {"type": "array", "items": {"type": "string"}}
            }
        })
    }

    fn side_effects(&self) -> SideEffects {
        SideEffects {
            filesystem: true,
            network: true,
            environment: true,
        }
    }

    async fn preview(&self, workspace: &Path, args: &Value) -> Result<Preview> {
        if !workspace.join(Self::pip_rel()).exists() {
            return Err(ToolError::failed(
                self.name(),
                format!("installer not found: {}", Self::pip_rel()),
            ));
        }
        Ok(Preview::Command {
            rendered: format!("$ {} install {}", Self::pip_rel(), Self::extra_args(args).join(" ")),
        })
    }

    async fn apply(&self, workspace: &Path, args: &Value) -> Result<ApplyOutcome> {
        let pip = workspace.join(Self::pip_rel());
        if !pip.exists() {
            return Err(ToolError::failed(
                self.name(),
                format!("installer not found: {}", Self::pip_rel()),
            ));
        }

        let mut install_args = vec!["install".to_string()];
        install_args.extend(Self::extra_args(args));

        let output = run_captured(
            self.name(),
            &pip.to_string_lossy(),
            &install_args,
            workspace,
            self.default_timeout,
        )
        .await?;

        if output.timed_out {
            return Err(ToolError::failed(self.name(), "installer timed out"));
        }
        if output.exit_code != Some(0) {
            return Err(ToolError::failed(self.name(), output.stderr));
        }
        Ok(ApplyOutcome::process(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        TempDir::new().unwrap()
    }

    #[tokio::test]
    async fn test_shell_echo_returns_text() {
        let ws = workspace();
        let outcome = ShellEchoTool
            .apply(ws.path(), &json!({"text": "hello"}))
            .await
            .unwrap();

        let process = outcome.process.unwrap();
        assert_eq!(process.stdout, "hello");
        assert_eq!(process.exit_code, Some(0));
        assert_eq!(outcome.artifacts[0].kind, OutputKind::Log);
        // Nothing written to the workspace
        assert_eq!(std::fs::read_dir(ws.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_shell_echo_preview_renders_command() {
        let ws = workspace();
        let preview = ShellEchoTool
            .preview(ws.path(), &json!({"text": "hi"}))
            .await
            .unwrap();
        match preview {
            Preview::Command { rendered } => assert!(rendered.starts_with("$ echo")),
            _ => panic!("expected command preview"),
        }
    }

    #[tokio::test]
    async fn test_run_command_captures_stdout_and_exit_code() {
        let ws = workspace();
        let tool = RunCommandTool::new(Duration::from_secs(30));
        let outcome = tool
            .apply(ws.path(), &json!({"argv": ["echo", "out"]}))
            .await
            .unwrap();

        let process = outcome.process.unwrap();
        assert_eq!(process.exit_code, Some(0));
        assert_eq!(process.stdout.trim(), "out");
        assert!(!process.timed_out);
    }

    #[tokio::test]
    async fn test_run_command_surfaces_nonzero_exit_without_error() {
        let ws = workspace();
        let tool = RunCommandTool::new(Duration::from_secs(30));
        let outcome = tool
            .apply(ws.path(), &json!({"argv": ["sh", "-c", "echo oops >&2; exit 3"]}))
            .await
            .unwrap();

        let process = outcome.process.unwrap();
        assert_eq!(process.exit_code, Some(3));
        assert!(process.stderr.contains("oops"));
    }

    #[tokio::test]
    async fn test_run_command_times_out() {
        let ws = workspace();
        let tool = RunCommandTool::new(Duration::from_secs(30));
        let outcome = tool
            .apply(
                ws.path(),
                &json!({"argv": ["sleep", "30"], "timeout_secs": 1}),
            )
            .await
            .unwrap();

        let process = outcome.process.unwrap();
        assert!(process.timed_out);
        assert_eq!(process.exit_code, None);
    }

    #[tokio::test]
    async fn test_run_command_spawn_failure_is_tool_error() {
        let ws = workspace();
        let tool = RunCommandTool::new(Duration::from_secs(5));
        let err = tool
            .apply(ws.path(), &json!({"argv": ["no-such-binary-xyzzy"]}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_run_command_missing_argv_fails_preview_too() {
        let ws = workspace();
        let tool = RunCommandTool::new(Duration::from_secs(5));
        assert!(tool.preview(ws.path(), &json!({})).await.is_err());
        assert!(tool.apply(ws.path(), &json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_run_command_cwd_must_exist() {
        let ws = workspace();
        let tool = RunCommandTool::new(Duration::from_secs(5));
        let err = tool
            .apply(ws.path(), &json!({"argv": ["pwd"], "cwd": "missing"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_run_command_runs_in_subdirectory() {
        let ws = workspace();
        std::fs::create_dir(ws.path().join("sub")).unwrap();
        let tool = RunCommandTool::new(Duration::from_secs(30));
        let outcome = tool
            .apply(ws.path(), &json!({"argv": ["pwd"], "cwd": "sub"}))
            .await
            .unwrap();
        let stdout = outcome.process.unwrap().stdout;
        assert!(stdout.trim().ends_with("sub"));
    }

    #[tokio::test]
    async fn test_install_deps_requires_virtualenv() {
        let ws = workspace();
        let tool = InstallDepsTool::new(Duration::from_secs(5));
        let err = tool.apply(ws.path(), &json!({})).await.unwrap_err();
        match err {
            ToolError::Failed { message, .. } => assert!(message.contains("installer not found")),
            other => panic!("expected tool failure, got {other}"),
        }
        assert!(tool.preview(ws.path(), &json!({})).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_deps_fails_with_installer_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let ws = workspace();
        let bin = ws.path().join(".venv/bin");
        std::fs::create_dir_all(&bin).unwrap();
        let pip = bin.join("pip");
        std::fs::write(&pip, "#!/bin/sh\necho 'resolution failed' >&2\nexit 1\n").unwrap();
        let mut perms = std::fs::metadata(&pip).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&pip, perms).unwrap();

        let tool = InstallDepsTool::new(Duration::from_secs(10));
        let err = tool.apply(ws.path(), &json!({})).await.unwrap_err();
        match err {
            ToolError::Failed { message, .. } => assert!(message.contains("resolution failed")),
            other => panic!("expected tool failure, got {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_deps_succeeds_on_zero_exit() {
        use std::os::unix::fs::PermissionsExt;

        let ws = workspace();
        let bin = ws.path().join(".venv/bin");
        std::fs::create_dir_all(&bin).unwrap();
        let pip = bin.join("pip");
        std::fs::write(&pip, "#!/bin/sh\necho 'installed 2 packages'\n").unwrap();
        let mut perms = std::fs::metadata(&pip).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&pip, perms).unwrap();

        let tool = InstallDepsTool::new(Duration::from_secs(10));
        let outcome = tool.apply(ws.path(), &json!({})).await.unwrap();
        assert!(outcome.process.unwrap().stdout.contains("installed"));
    }
}
