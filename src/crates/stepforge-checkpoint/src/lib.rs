//! # stepforge-checkpoint - Workspace Snapshot and Restore
//!
//! Trait-based snapshot abstraction and the zip-backed implementation that
//! protects every applied step. The executor snapshots the whole workspace
//! *before* invoking a tool's apply, so any step - including one that fails
//! halfway through mutating files - can be undone by restoring the
//! immediately preceding state.
//!
//! ## Layout on disk
//!
//! ```text
//! <checkpoints root>/
//!   <project id>/
//!     0001757424000123.zip   (zero-padded millisecond timestamps;
//!     0001757424007456.zip    lexical order == creation order)
//! ```
//!
//! Restore is **destructive-and-replace**: the workspace subtree is deleted,
//! recreated empty, and the most recent archive extracted into it verbatim.
//! Changes made since that snapshot are gone. Older archives are retained
//! on disk for manual recovery but are never restored automatically.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepforge_checkpoint::{CheckpointStore, ZipCheckpointStore};
//! use uuid::Uuid;
//!
//! # async fn demo() -> stepforge_checkpoint::Result<()> {
//! let store = ZipCheckpointStore::new("checkpoints");
//! let project_id = Uuid::new_v4();
//!
//! let handle = store.snapshot(project_id, "workspace".as_ref()).await?;
//! println!("archived to {}", handle.archive_path.display());
//!
//! // ... a tool mutates the workspace, something goes wrong ...
//!
//! let restored = store.restore_latest(project_id, "workspace".as_ref()).await?;
//! assert!(restored);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod error;
pub mod traits;

pub use archive::ZipCheckpointStore;
pub use error::{CheckpointError, Result};
pub use traits::{CheckpointHandle, CheckpointStore};
