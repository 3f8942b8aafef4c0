//! CLI configuration
//!
//! Loaded from `<root>/stepforge.toml` when present, with defaults
//! otherwise; command-line flags override individual fields in `main`.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for the stepforge CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Timeout applied to every spawned process, in seconds
    pub command_timeout_secs: u64,

    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 120,
            log_level: "info".to_string(),
        }
    }
}

impl ForgeConfig {
    /// Load from `<root>/stepforge.toml`, falling back to defaults when the
    /// file does not exist
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join("stepforge.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}
