//! Per-project serialization of mutating operations
//!
//! Apply, rollback and explicit checkpoint must never interleave for the
//! same project: two concurrent applies would each take their own snapshot,
//! and a racing rollback could discard the other's unrelated work. Previews
//! are read-only and deliberately do not take this lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Lazily allocated per-project mutexes
#[derive(Debug, Clone, Default)]
pub struct ProjectLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for one project, waiting if another
    /// mutating operation holds it
    pub async fn acquire(&self, project_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(project_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
