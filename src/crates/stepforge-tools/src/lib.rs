//! # stepforge-tools - Tool Contract, Registry and Built-ins
//!
//! Tools are the only code allowed to touch a project workspace. Every tool
//! offers exactly two operations:
//!
//! - **preview** - a dry run that predicts what apply would do (unified diff
//!   for file tools, rendered command line for process tools) and fails
//!   under the same conditions apply would fail. Never mutates anything.
//! - **apply** - the mutation, reporting produced artifacts (path + SHA-256
//!   content hash) or captured process output.
//!
//! ## Safety layers
//!
//! Two independent gates stand between untrusted arguments and the
//! filesystem:
//!
//! 1. [`ArgumentValidator`] - a coarse deny-list scan over the whole
//!    argument set, run by the executor before any tool code.
//! 2. [`PathGuard`] - canonical-path containment inside the workspace root,
//!    applied by every tool to every path it touches. This is the
//!    authoritative check; the deny-list is defense in depth on top of it.
//!
//! ## Built-in tools
//!
//! | Name | Side effects | Behavior |
//! |---|---|---|
//! | `write_file` | fs | create/overwrite a file, parents auto-created |
//! | `replace_text` | fs | literal substring substitution across a file |
//! | `append_file` | fs | append, creating the file when absent |
//! | `scaffold_site` | fs | write a starter page into `<dir>/index.html` |
//! | `shell_echo` | none | return the text as captured output |
//! | `run_command` | fs/net/env | spawn an argv with timeout, capture output |
//! | `install_deps` | fs/net/env | run the virtualenv installer |
//! | `merge_manifest` | fs | merge entries into `requirements.txt` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use serde_json::json;
//! use stepforge_tools::{ArgumentValidator, ToolRegistry};
//!
//! # async fn demo(workspace: &std::path::Path) -> stepforge_tools::Result<()> {
//! let registry = ToolRegistry::builtin(Duration::from_secs(60));
//! let validator = ArgumentValidator::new();
//!
//! let args = json!({"path": "README.md", "content": "# Hello\n"});
//! validator.check(&args)?;
//!
//! let tool = registry.resolve("write_file")?;
//! let preview = tool.preview(workspace, &args).await?;
//! let outcome = tool.apply(workspace, &args).await?;
//! # Ok(())
//! # }
//! ```

mod args;

pub mod diff;
pub mod error;
pub mod guard;
pub mod hash;
pub mod tool;
pub mod tools;
pub mod validate;

pub use diff::unified_diff;
pub use error::{Result, ToolError};
pub use guard::PathGuard;
pub use hash::{sha256_file, sha256_hex};
pub use tool::{
    ApplyOutcome, ArtifactSpec, FileChange, OutputKind, Preview, ProcessOutput, SideEffects, Tool,
    ToolRegistry,
};
pub use validate::{ArgumentValidator, DENIED_FRAGMENTS};
