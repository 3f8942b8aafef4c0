//! Abstract persistence for projects, steps, artifacts, events and
//! checkpoint records
//!
//! The engine never talks to a database directly; it reads and writes
//! through [`StateStore`]. Implementors can back the trait with any
//! technology - the bundled [`MemoryStateStore`](crate::memory::MemoryStateStore)
//! keeps everything in memory and is what tests and the CLI use.
//!
//! Write operations are intentionally narrow: steps only ever change status
//! (titles, tools and arguments are frozen at plan time), events and
//! artifacts are append-only.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Artifact, CheckpointRecord, Event, Project, Step, StepStatus};

/// Read/write operations the engine needs from a persistence backend
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn insert_project(&self, project: Project) -> Result<()>;
    async fn project(&self, id: Uuid) -> Result<Option<Project>>;
    async fn projects(&self) -> Result<Vec<Project>>;

    async fn insert_step(&self, step: Step) -> Result<()>;
    async fn step(&self, id: Uuid) -> Result<Option<Step>>;

    /// Steps of a project ordered by plan position
    async fn steps_for_project(&self, project_id: Uuid) -> Result<Vec<Step>>;

    /// Update a step's status, enforcing the state machine
    async fn set_step_status(&self, id: Uuid, status: StepStatus) -> Result<()>;

    async fn insert_artifact(&self, artifact: Artifact) -> Result<()>;
    async fn artifacts_for_project(&self, project_id: Uuid) -> Result<Vec<Artifact>>;

    async fn record_event(&self, event: Event) -> Result<()>;

    /// Events of a project in recording order
    async fn events_for_project(&self, project_id: Uuid) -> Result<Vec<Event>>;

    async fn insert_checkpoint(&self, record: CheckpointRecord) -> Result<()>;
    async fn checkpoints_for_project(&self, project_id: Uuid) -> Result<Vec<CheckpointRecord>>;
}
