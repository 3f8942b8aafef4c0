//! Error types for tool resolution, validation and execution

use thiserror::Error;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors that can occur while resolving or running tools
#[derive(Error, Debug)]
pub enum ToolError {
    /// Requested tool name is not registered
    #[error("Tool '{name}' not found. Available tools: {available}")]
    UnknownTool { name: String, available: String },

    /// Argument set matched the deny-list; security rejection
    #[error("Unsafe argument detected: {0}")]
    UnsafeArgument(String),

    /// Path escaped the workspace root; security rejection
    #[error("Path traversal blocked: {0}")]
    PathTraversal(String),

    /// Tool-specific failure with a tool-supplied message
    #[error("Tool '{tool}' failed: {message}")]
    Failed { tool: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Shorthand for a tool-specific failure
    pub fn failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::Failed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a security rejection rather than an
    /// operational failure
    pub fn is_security_rejection(&self) -> bool {
        matches!(
            self,
            ToolError::UnsafeArgument(_) | ToolError::PathTraversal(_)
        )
    }
}
