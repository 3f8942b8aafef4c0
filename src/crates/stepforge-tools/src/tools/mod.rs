//! Built-in tool implementations
//!
//! - `fs` - workspace file tools (write, replace, append, scaffold)
//! - `process` - process tools (echo, arbitrary commands, dependency install)
//! - `manifest` - line-oriented dependency manifest merging

pub mod fs;
pub mod manifest;
pub mod process;

pub use fs::{AppendFileTool, ReplaceTextTool, ScaffoldSiteTool, WriteFileTool};
pub use manifest::MergeManifestTool;
pub use process::{InstallDepsTool, RunCommandTool, ShellEchoTool};
