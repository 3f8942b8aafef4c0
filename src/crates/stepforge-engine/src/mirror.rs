//! Non-destructive step previews
//!
//! Same resolution and validation gates as the executor, but the tool's
//! dry run is invoked instead of apply: no checkpoint, no status change, no
//! artifacts. Previews do not take the per-project lock - they are
//! read-only and may run alongside a mutating operation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use stepforge_core::{Event, EventKind, StateStore};
use stepforge_tools::{ArgumentValidator, Preview, ToolRegistry};

use crate::error::{EngineError, Result};
use crate::layout::WorkspaceLayout;

/// Result of a preview
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub step_id: Uuid,
    pub preview: Preview,
}

/// Runs tool dry runs against a project workspace
pub struct MirrorRunner {
    registry: Arc<ToolRegistry>,
    validator: ArgumentValidator,
    store: Arc<dyn StateStore>,
    layout: WorkspaceLayout,
}

impl MirrorRunner {
    pub fn new(
        registry: Arc<ToolRegistry>,
        validator: ArgumentValidator,
        store: Arc<dyn StateStore>,
        layout: WorkspaceLayout,
    ) -> Self {
        Self {
            registry,
            validator,
            store,
            layout,
        }
    }

    /// Preview one step.
    ///
    /// Fails with the same `UnknownTool` / `UnsafeArgument` / tool-specific
    /// errors an apply would, without touching step status, checkpoints or
    /// artifacts.
    pub async fn preview(&self, step_id: Uuid) -> Result<PreviewReport> {
        let step = self
            .store
            .step(step_id)
            .await?
            .ok_or(EngineError::StepNotFound(step_id))?;

        let tool = self.registry.resolve(&step.tool)?;
        self.validator.check(&step.args)?;

        let workspace = self.layout.ensure(step.project_id)?;
        let preview = tool.preview(&workspace, &step.args).await?;
        debug!(step = %step.id, tool = %step.tool, "step mirrored");

        let payload = match &preview {
            Preview::Diff { files, .. } => json!({"files": files}),
            Preview::Command { rendered } => json!({"rendered": rendered}),
        };
        self.store
            .record_event(
                Event::new(step.project_id, EventKind::Mirror)
                    .with_step(step.id)
                    .with_payload(payload),
            )
            .await?;

        Ok(PreviewReport {
            step_id: step.id,
            preview,
        })
    }
}
