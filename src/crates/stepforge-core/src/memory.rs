//! In-memory reference implementation of [`StateStore`]
//!
//! Thread-safe via `Arc<RwLock<…>>`, ephemeral. Suitable for tests,
//! development and the single-process CLI, which snapshots the whole store
//! to a JSON file between invocations through [`StateDump`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::model::{Artifact, CheckpointRecord, Event, Project, Step, StepStatus};
use crate::store::StateStore;

#[derive(Debug, Default)]
struct Inner {
    projects: HashMap<Uuid, Project>,
    steps: HashMap<Uuid, Step>,
    artifacts: Vec<Artifact>,
    events: Vec<Event>,
    checkpoints: Vec<CheckpointRecord>,
}

/// Serializable snapshot of the whole store contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDump {
    pub projects: Vec<Project>,
    pub steps: Vec<Step>,
    pub artifacts: Vec<Artifact>,
    pub events: Vec<Event>,
    pub checkpoints: Vec<CheckpointRecord>,
}

/// In-memory [`StateStore`] implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a previously taken [`StateDump`]
    pub fn from_dump(dump: StateDump) -> Self {
        let inner = Inner {
            projects: dump.projects.into_iter().map(|p| (p.id, p)).collect(),
            steps: dump.steps.into_iter().map(|s| (s.id, s)).collect(),
            artifacts: dump.artifacts,
            events: dump.events,
            checkpoints: dump.checkpoints,
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Snapshot the full store contents for external persistence
    pub async fn dump(&self) -> StateDump {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by_key(|p| p.created_at);
        let mut steps: Vec<Step> = inner.steps.values().cloned().collect();
        steps.sort_by_key(|s| (s.project_id, s.position));
        StateDump {
            projects,
            steps,
            artifacts: inner.artifacts.clone(),
            events: inner.events.clone(),
            checkpoints: inner.checkpoints.clone(),
        }
    }

    /// Drop all contents; test isolation helper
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        *inner = Inner::default();
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn insert_project(&self, project: Project) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.projects.insert(project.id, project);
        Ok(())
    }

    async fn project(&self, id: Uuid) -> Result<Option<Project>> {
        let inner = self.inner.read().await;
        Ok(inner.projects.get(&id).cloned())
    }

    async fn projects(&self) -> Result<Vec<Project>> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }

    async fn insert_step(&self, step: Step) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.steps.insert(step.id, step);
        Ok(())
    }

    async fn step(&self, id: Uuid) -> Result<Option<Step>> {
        let inner = self.inner.read().await;
        Ok(inner.steps.get(&id).cloned())
    }

    async fn steps_for_project(&self, project_id: Uuid) -> Result<Vec<Step>> {
        let inner = self.inner.read().await;
        let mut steps: Vec<Step> = inner
            .steps
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.position);
        Ok(steps)
    }

    async fn set_step_status(&self, id: Uuid, status: StepStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        let step = inner
            .steps
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("step {id}")))?;
        step.transition(status)
    }

    async fn insert_artifact(&self, artifact: Artifact) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.artifacts.push(artifact);
        Ok(())
    }

    async fn artifacts_for_project(&self, project_id: Uuid) -> Result<Vec<Artifact>> {
        let inner = self.inner.read().await;
        Ok(inner
            .artifacts
            .iter()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn record_event(&self, event: Event) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.events.push(event);
        Ok(())
    }

    async fn events_for_project(&self, project_id: Uuid) -> Result<Vec<Event>> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_checkpoint(&self, record: CheckpointRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.checkpoints.push(record);
        Ok(())
    }

    async fn checkpoints_for_project(&self, project_id: Uuid) -> Result<Vec<CheckpointRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .checkpoints
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactKind, EventKind};
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_fetch_project() {
        let store = MemoryStateStore::new();
        let project = Project::new("Landing page", "ship a landing page");
        let id = project.id;
        store.insert_project(project).await.unwrap();

        let fetched = store.project(id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Landing page");
        assert_eq!(fetched.status, "new");
    }

    #[tokio::test]
    async fn test_steps_ordered_by_position() {
        let store = MemoryStateStore::new();
        let project_id = Uuid::new_v4();

        for (position, title) in [(2u32, "third"), (0, "first"), (1, "second")] {
            let step = Step::new(project_id, position, title, "shell_echo", json!({}));
            store.insert_step(step).await.unwrap();
        }

        let steps = store.steps_for_project(project_id).await.unwrap();
        let titles: Vec<&str> = steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_set_step_status_enforces_state_machine() {
        let store = MemoryStateStore::new();
        let step = Step::new(Uuid::new_v4(), 0, "step", "write_file", json!({}));
        let id = step.id;
        store.insert_step(step).await.unwrap();

        store.set_step_status(id, StepStatus::Done).await.unwrap();
        let err = store.set_step_status(id, StepStatus::Pending).await;
        assert!(matches!(
            err,
            Err(CoreError::InvalidTransition { from: StepStatus::Done, .. })
        ));
    }

    #[tokio::test]
    async fn test_set_step_status_unknown_step() {
        let store = MemoryStateStore::new();
        let err = store
            .set_step_status(Uuid::new_v4(), StepStatus::Done)
            .await;
        assert!(matches!(err, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_events_are_append_only_per_project() {
        let store = MemoryStateStore::new();
        let project_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        store
            .record_event(Event::new(project_id, EventKind::Planned))
            .await
            .unwrap();
        store
            .record_event(Event::new(project_id, EventKind::Checkpoint))
            .await
            .unwrap();
        store
            .record_event(Event::new(other, EventKind::Planned))
            .await
            .unwrap();

        let events = store.events_for_project(project_id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Planned);
        assert_eq!(events[1].kind, EventKind::Checkpoint);
    }

    #[tokio::test]
    async fn test_dump_roundtrip() {
        let store = MemoryStateStore::new();
        let project = Project::new("p", "goal");
        let project_id = project.id;
        store.insert_project(project).await.unwrap();

        let step = Step::new(project_id, 0, "step", "write_file", json!({"path": "a.txt"}));
        let step_id = step.id;
        store.insert_step(step).await.unwrap();
        store
            .insert_artifact(Artifact::new(
                project_id,
                step_id,
                ArtifactKind::File,
                "a.txt",
                "deadbeef",
            ))
            .await
            .unwrap();

        let dump = store.dump().await;
        let restored = MemoryStateStore::from_dump(dump);

        let steps = restored.steps_for_project(project_id).await.unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].id, step_id);
        let artifacts = restored.artifacts_for_project(project_id).await.unwrap();
        assert_eq!(artifacts[0].hash, "deadbeef");
    }
}
