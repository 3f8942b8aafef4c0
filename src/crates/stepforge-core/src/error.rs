//! Error types for core domain operations

use crate::model::StepStatus;
use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in the core domain layer
#[derive(Error, Debug)]
pub enum CoreError {
    /// Entity lookup failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// Step status transition violates the state machine
    #[error("Invalid step transition: {from} -> {to}")]
    InvalidTransition { from: StepStatus, to: StepStatus },

    /// Store backend error
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
