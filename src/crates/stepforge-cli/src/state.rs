//! State persistence between CLI invocations
//!
//! The engine runs against the in-memory store; the CLI snapshots it to
//! `<root>/state.json` after every command and rebuilds it on the next run.

use std::path::Path;

use anyhow::Context;

use stepforge_core::{MemoryStateStore, StateDump};

const STATE_FILE: &str = "state.json";

/// Rebuild the store from `<root>/state.json`, or start empty
pub fn load(root: &Path) -> anyhow::Result<MemoryStateStore> {
    let path = root.join(STATE_FILE);
    if !path.exists() {
        return Ok(MemoryStateStore::new());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let dump: StateDump = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(MemoryStateStore::from_dump(dump))
}

/// Persist the store contents to `<root>/state.json`
pub async fn save(root: &Path, store: &MemoryStateStore) -> anyhow::Result<()> {
    let dump = store.dump().await;
    let raw = serde_json::to_string_pretty(&dump)?;
    let path = root.join(STATE_FILE);
    std::fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
