//! Step application, explicit checkpointing and rollback
//!
//! The apply sequence is fixed:
//!
//! 1. resolve the step's tool - fail fast, no checkpoint taken
//! 2. run the argument deny-list - fail fast, no checkpoint taken
//! 3. snapshot the workspace, record the checkpoint event
//! 4. invoke the tool's apply; mark the step `done` or `error` and record
//!    the outcome
//!
//! Checkpointing always happens before apply, never after, so a tool that
//! fails after partially mutating the workspace can still be undone by
//! restoring the snapshot from step 3.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use stepforge_checkpoint::{CheckpointHandle, CheckpointStore};
use stepforge_core::{
    Artifact, ArtifactKind, CheckpointRecord, Event, EventKind, StateStore, Step, StepStatus,
};
use stepforge_tools::{ApplyOutcome, ArgumentValidator, OutputKind, ToolError, ToolRegistry};

use crate::error::{EngineError, Result};
use crate::layout::WorkspaceLayout;
use crate::locks::ProjectLocks;

/// Result of a successful apply
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub step_id: Uuid,
    pub checkpoint: CheckpointHandle,
    pub outcome: ApplyOutcome,

    /// Persisted artifact records, one per produced output
    pub artifacts: Vec<Artifact>,
}

/// Orchestrates validate → checkpoint → apply → record for one step at a
/// time per project.
///
/// All collaborators are passed in at construction; the executor holds no
/// global state.
pub struct StepExecutor {
    registry: Arc<ToolRegistry>,
    validator: ArgumentValidator,
    checkpoints: Arc<dyn CheckpointStore>,
    store: Arc<dyn StateStore>,
    layout: WorkspaceLayout,
    locks: ProjectLocks,
}

impl StepExecutor {
    pub fn new(
        registry: Arc<ToolRegistry>,
        validator: ArgumentValidator,
        checkpoints: Arc<dyn CheckpointStore>,
        store: Arc<dyn StateStore>,
        layout: WorkspaceLayout,
    ) -> Self {
        Self {
            registry,
            validator,
            checkpoints,
            store,
            layout,
            locks: ProjectLocks::new(),
        }
    }

    /// Apply one pending step.
    ///
    /// Safety rejections (`UnknownTool`, `UnsafeArgument`, `PathTraversal`)
    /// happen before any checkpoint is taken and leave the step's status
    /// untouched; they are still recorded as `error` events. Failures after
    /// the checkpoint mark the step `error` and leave the snapshot in place
    /// for rollback.
    pub async fn apply(&self, step_id: Uuid) -> Result<ApplyReport> {
        let step = self
            .store
            .step(step_id)
            .await?
            .ok_or(EngineError::StepNotFound(step_id))?;
        let _guard = self.locks.acquire(step.project_id).await;

        // Only pending steps are appliable; error steps go through rollback
        // first and done steps never run again.
        if step.status != StepStatus::Pending {
            return Err(stepforge_core::CoreError::InvalidTransition {
                from: step.status,
                to: StepStatus::Done,
            }
            .into());
        }

        let tool = match self.registry.resolve(&step.tool) {
            Ok(tool) => tool,
            Err(e) => return self.reject_before_checkpoint(&step, e).await,
        };
        if let Err(e) = self.validator.check(&step.args) {
            return self.reject_before_checkpoint(&step, e).await;
        }

        let workspace = self.layout.ensure(step.project_id)?;
        let handle = self
            .checkpoints
            .snapshot(step.project_id, &workspace)
            .await?;
        self.store
            .insert_checkpoint(CheckpointRecord::new(
                step.project_id,
                handle.archive_path.to_string_lossy(),
            ))
            .await?;
        self.store
            .record_event(
                Event::new(step.project_id, EventKind::Checkpoint)
                    .with_step(step.id)
                    .with_payload(json!({
                        "archive": handle.archive_path.to_string_lossy(),
                    })),
            )
            .await?;

        match tool.apply(&workspace, &step.args).await {
            Ok(outcome) => {
                self.store.set_step_status(step.id, StepStatus::Done).await?;
                self.store
                    .record_event(
                        Event::new(step.project_id, EventKind::Applied)
                            .with_step(step.id)
                            .with_payload(serde_json::to_value(&outcome)?),
                    )
                    .await?;

                let mut artifacts = Vec::new();
                for spec in &outcome.artifacts {
                    let artifact = Artifact::new(
                        step.project_id,
                        step.id,
                        artifact_kind(spec.kind),
                        &spec.path,
                        &spec.hash,
                    );
                    self.store.insert_artifact(artifact.clone()).await?;
                    artifacts.push(artifact);
                }

                info!(step = %step.id, tool = %step.tool, "step applied");
                Ok(ApplyReport {
                    step_id: step.id,
                    checkpoint: handle,
                    outcome,
                    artifacts,
                })
            }
            Err(e) => {
                self.store
                    .set_step_status(step.id, StepStatus::Error)
                    .await?;
                self.store
                    .record_event(
                        Event::new(step.project_id, EventKind::Error)
                            .with_step(step.id)
                            .with_payload(json!({"error": e.to_string()})),
                    )
                    .await?;
                warn!(
                    step = %step.id,
                    tool = %step.tool,
                    error = %e,
                    "step apply failed; checkpoint retained for rollback"
                );
                Err(e.into())
            }
        }
    }

    /// Snapshot a project's workspace outside the apply cycle
    pub async fn checkpoint(&self, project_id: Uuid) -> Result<CheckpointHandle> {
        let _guard = self.locks.acquire(project_id).await;

        let workspace = self.layout.ensure(project_id)?;
        let handle = self.checkpoints.snapshot(project_id, &workspace).await?;
        self.store
            .insert_checkpoint(CheckpointRecord::new(
                project_id,
                handle.archive_path.to_string_lossy(),
            ))
            .await?;
        self.store
            .record_event(
                Event::new(project_id, EventKind::Checkpoint).with_payload(json!({
                    "archive": handle.archive_path.to_string_lossy(),
                })),
            )
            .await?;
        Ok(handle)
    }

    /// Restore the most recent snapshot, wiping the workspace, and reset
    /// every step currently in `error` back to `pending`.
    ///
    /// Returns whether a restore actually occurred; with no snapshots the
    /// workspace is left untouched and `false` is returned (the step reset
    /// and audit event still happen).
    pub async fn rollback(&self, project_id: Uuid) -> Result<bool> {
        let _guard = self.locks.acquire(project_id).await;

        let workspace = self.layout.dir(project_id);
        let restored = self
            .checkpoints
            .restore_latest(project_id, &workspace)
            .await?;
        self.store
            .record_event(
                Event::new(project_id, EventKind::RolledBack)
                    .with_payload(json!({"restored": restored})),
            )
            .await?;

        for step in self.store.steps_for_project(project_id).await? {
            if step.status == StepStatus::Error {
                self.store
                    .set_step_status(step.id, StepStatus::Pending)
                    .await?;
            }
        }

        info!(project = %project_id, restored, "rollback completed");
        Ok(restored)
    }

    /// Record the audit event for a pre-checkpoint rejection and bubble the
    /// error up. The step's status is deliberately left unchanged.
    async fn reject_before_checkpoint(&self, step: &Step, error: ToolError) -> Result<ApplyReport> {
        warn!(step = %step.id, error = %error, "step rejected before checkpoint");
        self.store
            .record_event(
                Event::new(step.project_id, EventKind::Error)
                    .with_step(step.id)
                    .with_payload(json!({"error": error.to_string()})),
            )
            .await?;
        Err(error.into())
    }
}

fn artifact_kind(kind: OutputKind) -> ArtifactKind {
    match kind {
        OutputKind::File => ArtifactKind::File,
        OutputKind::Log => ArtifactKind::Log,
    }
}
