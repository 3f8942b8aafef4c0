//! Domain entities and the step state machine
//!
//! Everything the engine persists through a [`StateStore`](crate::store::StateStore)
//! lives here: [`Project`], [`Step`], [`Artifact`], [`Event`] and
//! [`CheckpointRecord`]. All entities are plain serde-friendly data; the only
//! behavior is [`Step::transition`], which enforces the status state machine:
//!
//! ```text
//!   pending ──apply ok──▶ done        (terminal)
//!   pending ──apply err─▶ error ──rollback──▶ pending
//!   pending ──skip──────▶ skipped     (terminal)
//! ```
//!
//! A step never leaves `done`. Only a project-wide rollback moves `error`
//! back to `pending`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// A project owning a workspace, a plan of steps and their audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project id; also names the workspace and checkpoint directories
    pub id: Uuid,

    /// Human-readable title
    pub title: String,

    /// Free-text goal the plan was generated from
    pub goal: String,

    /// Coarse lifecycle marker ("new", "active", ...)
    pub status: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with a fresh id
    pub fn new(title: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            goal: goal.into(),
            status: "new".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Lifecycle status of a [`Step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Done,
    Skipped,
    Error,
}

impl StepStatus {
    /// Whether the state machine permits moving from `self` to `next`
    pub fn can_transition(self, next: StepStatus) -> bool {
        matches!(
            (self, next),
            (StepStatus::Pending, StepStatus::Done)
                | (StepStatus::Pending, StepStatus::Error)
                | (StepStatus::Pending, StepStatus::Skipped)
                | (StepStatus::Error, StepStatus::Pending)
        )
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Done => "done",
            StepStatus::Skipped => "skipped",
            StepStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// One planned unit of work bound to a tool and its arguments.
///
/// Steps are created at plan time and only their `status` is mutated
/// afterwards; title, tool and arguments are frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: Uuid,
    pub project_id: Uuid,

    /// Stable ordering within the project's plan
    pub position: u32,

    pub title: String,
    pub description: String,

    /// Whether the plan considers this step mandatory
    pub required: bool,

    pub status: StepStatus,

    /// Registered tool name this step invokes
    pub tool: String,

    /// String-keyed tool arguments
    pub args: Value,

    /// Ids of steps that should complete first
    pub depends_on: Vec<Uuid>,
}

impl Step {
    /// Create a pending step
    pub fn new(
        project_id: Uuid,
        position: u32,
        title: impl Into<String>,
        tool: impl Into<String>,
        args: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            position,
            title: title.into(),
            description: String::new(),
            required: true,
            status: StepStatus::Pending,
            tool: tool.into(),
            args,
            depends_on: Vec::new(),
        }
    }

    /// Set the free-text description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the step optional or required
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Declare dependency step ids
    pub fn with_depends_on(mut self, depends_on: Vec<Uuid>) -> Self {
        self.depends_on = depends_on;
        self
    }

    /// Move the step to `next`, enforcing the state machine
    pub fn transition(&mut self, next: StepStatus) -> Result<()> {
        if !self.status.can_transition(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Kind of output a step produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    File,
    Log,
}

/// A file or output produced by a successfully applied step.
///
/// Immutable history record; the hash is a hex-encoded SHA-256 digest of the
/// final bytes, usable to verify a later download against what was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub project_id: Uuid,
    pub step_id: Uuid,
    pub kind: ArtifactKind,

    /// Path relative to the project workspace
    pub path: String,

    /// Hex-encoded SHA-256 of the final bytes; empty for non-file outputs
    pub hash: String,

    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(
        project_id: Uuid,
        step_id: Uuid,
        kind: ArtifactKind,
        path: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            step_id,
            kind,
            path: path.into(),
            hash: hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// What an [`Event`] records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Planned,
    Mirror,
    Applied,
    Error,
    Checkpoint,
    RolledBack,
}

/// Append-only audit log entry.
///
/// Events are write-only: never mutated, never deleted. They are the sole
/// source of "what happened and when" for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub project_id: Uuid,
    pub step_id: Option<Uuid>,
    pub kind: EventKind,
    pub payload: Value,
    pub at: DateTime<Utc>,
}

impl Event {
    pub fn new(project_id: Uuid, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            step_id: None,
            kind,
            payload: Value::Null,
            at: Utc::now(),
        }
    }

    /// Attach the step this event refers to
    pub fn with_step(mut self, step_id: Uuid) -> Self {
        self.step_id = Some(step_id);
        self
    }

    /// Attach a structured payload
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Pointer to one workspace snapshot archive on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub id: Uuid,
    pub project_id: Uuid,

    /// Absolute path of the zip archive
    pub archive_path: String,

    pub created_at: DateTime<Utc>,
}

impl CheckpointRecord {
    pub fn new(project_id: Uuid, archive_path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            archive_path: archive_path.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_to_done() {
        let mut step = Step::new(Uuid::new_v4(), 0, "write readme", "write_file", json!({}));
        assert_eq!(step.status, StepStatus::Pending);
        step.transition(StepStatus::Done).unwrap();
        assert_eq!(step.status, StepStatus::Done);
    }

    #[test]
    fn test_pending_to_error_and_back() {
        let mut step = Step::new(Uuid::new_v4(), 0, "step", "write_file", json!({}));
        step.transition(StepStatus::Error).unwrap();
        step.transition(StepStatus::Pending).unwrap();
        assert_eq!(step.status, StepStatus::Pending);
    }

    #[test]
    fn test_done_is_terminal() {
        let mut step = Step::new(Uuid::new_v4(), 0, "step", "write_file", json!({}));
        step.transition(StepStatus::Done).unwrap();

        for next in [StepStatus::Pending, StepStatus::Error, StepStatus::Skipped] {
            let err = step.transition(next).unwrap_err();
            assert!(matches!(err, CoreError::InvalidTransition { .. }));
        }
        assert_eq!(step.status, StepStatus::Done);
    }

    #[test]
    fn test_error_cannot_jump_to_done() {
        let mut step = Step::new(Uuid::new_v4(), 0, "step", "write_file", json!({}));
        step.transition(StepStatus::Error).unwrap();
        assert!(step.transition(StepStatus::Done).is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&StepStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&EventKind::RolledBack).unwrap(),
            "\"rolled_back\""
        );
    }

    #[test]
    fn test_step_roundtrip() {
        let step = Step::new(
            Uuid::new_v4(),
            3,
            "scaffold",
            "scaffold_site",
            json!({"dir": "site"}),
        )
        .with_description("scaffold the landing page")
        .with_required(false);

        let encoded = serde_json::to_string(&step).unwrap();
        let decoded: Step = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, step.id);
        assert_eq!(decoded.position, 3);
        assert_eq!(decoded.args["dir"], "site");
        assert!(!decoded.required);
    }
}
