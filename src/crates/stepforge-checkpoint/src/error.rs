//! Error types for checkpoint operations

use thiserror::Error;

/// Result type for checkpoint operations
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors that can occur while snapshotting or restoring a workspace
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Workspace directory missing or unreadable
    #[error("Workspace unavailable: {0}")]
    Workspace(String),

    /// Archive read/write error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Workspace walk error
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
