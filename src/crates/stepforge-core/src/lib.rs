//! # stepforge-core - Domain Model and Store Abstractions
//!
//! Core entities and persistence traits for the stepforge engine: projects,
//! their planned **steps**, the **artifacts** steps produce, the append-only
//! **event** audit log, and **checkpoint records** pointing at workspace
//! snapshot archives.
//!
//! ## Overview
//!
//! A [`Project`] owns a plan of [`Step`]s. Each step names a tool and carries
//! its frozen argument mapping; only the step's [`StepStatus`] changes after
//! plan time, and only along the state machine edges:
//!
//! - `pending -> done` (successful apply)
//! - `pending -> error` (failed apply)
//! - `pending -> skipped` (plan marked the step skippable)
//! - `error -> pending` (project-wide rollback)
//!
//! `done` and `skipped` are terminal. [`Step::transition`] rejects every
//! other edge, and [`MemoryStateStore`] re-checks it on status writes so a
//! buggy caller cannot corrupt history.
//!
//! ## Persistence
//!
//! The engine reads and writes exclusively through the [`StateStore`] trait;
//! what backs it is a deployment decision. This crate bundles
//! [`MemoryStateStore`], a thread-safe in-memory reference implementation
//! that can snapshot itself into a serializable [`StateDump`] and be rebuilt
//! from one.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepforge_core::{MemoryStateStore, Project, StateStore, Step, StepStatus};
//! use serde_json::json;
//!
//! # async fn demo() -> stepforge_core::Result<()> {
//! let store = MemoryStateStore::new();
//!
//! let project = Project::new("Landing page", "ship a minimal landing page");
//! let step = Step::new(
//!     project.id,
//!     0,
//!     "Create README",
//!     "write_file",
//!     json!({"path": "README.md", "content": "# Landing page\n"}),
//! );
//!
//! let step_id = step.id;
//! store.insert_project(project).await?;
//! store.insert_step(step).await?;
//! store.set_step_status(step_id, StepStatus::Done).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{CoreError, Result};
pub use memory::{MemoryStateStore, StateDump};
pub use model::{
    Artifact, ArtifactKind, CheckpointRecord, Event, EventKind, Project, Step, StepStatus,
};
pub use store::StateStore;
