//! Plan file loading
//!
//! The CLI consumes plans as JSON arrays of step specifications; where they
//! come from (handwritten, generated, LLM-proposed) is outside this
//! binary's concern.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use stepforge_core::Step;

fn default_required() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// One step specification as written in a plan file
#[derive(Debug, Clone, Deserialize)]
pub struct PlanStep {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_required")]
    pub required: bool,

    pub tool: String,

    #[serde(default = "empty_object")]
    pub args: Value,
}

/// Parse a plan file into step specifications
pub fn load_plan(path: &Path) -> anyhow::Result<Vec<PlanStep>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    let specs: Vec<PlanStep> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse plan {}", path.display()))?;
    anyhow::ensure!(!specs.is_empty(), "plan {} has no steps", path.display());
    Ok(specs)
}

/// Materialize plan specifications into ordered project steps
pub fn into_steps(project_id: Uuid, specs: Vec<PlanStep>) -> Vec<Step> {
    specs
        .into_iter()
        .enumerate()
        .map(|(position, spec)| {
            Step::new(project_id, position as u32, spec.title, spec.tool, spec.args)
                .with_description(spec.description)
                .with_required(spec.required)
        })
        .collect()
}
