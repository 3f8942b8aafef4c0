//! Error types for engine orchestration

use thiserror::Error;
use uuid::Uuid;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the executor and mirror runner.
///
/// Tool, checkpoint and store errors pass through transparently so callers
/// can match on the underlying taxonomy (`UnknownTool`, `UnsafeArgument`,
/// `PathTraversal`, tool-specific failures, ...).
#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced step does not exist in the store
    #[error("Step not found: {0}")]
    StepNotFound(Uuid),

    #[error(transparent)]
    Tool(#[from] stepforge_tools::ToolError),

    #[error(transparent)]
    Checkpoint(#[from] stepforge_checkpoint::CheckpointError),

    #[error(transparent)]
    Core(#[from] stepforge_core::CoreError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
