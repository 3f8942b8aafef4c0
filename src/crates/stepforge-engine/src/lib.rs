//! # stepforge-engine - Apply, Mirror and Rollback Orchestration
//!
//! Ties the tool registry, the checkpoint store and the state store into
//! the step lifecycle:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  caller (CLI / web layer)                                │
//! └───────┬──────────────────────────────┬───────────────────┘
//!         │ preview(step)                │ apply(step) / rollback(project)
//!         ▼                              ▼
//! ┌───────────────┐              ┌───────────────┐
//! │  MirrorRunner │              │  StepExecutor │──── per-project lock
//! └───────┬───────┘              └───────┬───────┘
//!         │ resolve + validate           │ resolve + validate
//!         │ Tool::preview                │ snapshot → Tool::apply
//!         ▼                              ▼
//!   no state touched            status + events + artifacts
//! ```
//!
//! Mutating operations (apply, explicit checkpoint, rollback) are
//! serialized per project through [`ProjectLocks`]; previews run without
//! the lock. Every outcome lands in the audit event log; every apply is
//! preceded by a workspace snapshot that rollback can restore.

pub mod error;
pub mod executor;
pub mod layout;
pub mod locks;
pub mod mirror;

pub use error::{EngineError, Result};
pub use executor::{ApplyReport, StepExecutor};
pub use layout::WorkspaceLayout;
pub use locks::ProjectLocks;
pub use mirror::{MirrorRunner, PreviewReport};
