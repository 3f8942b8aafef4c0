//! Deny-list argument screening
//!
//! A coarse, fail-closed pre-filter that runs before any tool does, layered
//! in addition to [`PathGuard`](crate::guard::PathGuard) - never instead of
//! it. The fragments target traversal and well-known system locations. The
//! check is a known-imprecise heuristic: it can false-positive on legitimate
//! content, and PathGuard's canonical containment check remains the
//! authoritative guard.

use serde_json::Value;

use crate::error::{Result, ToolError};

/// Fragments no argument string may contain
pub const DENIED_FRAGMENTS: &[&str] = &["..", "~", "/etc/", "C:\\Windows"];

/// Rejects argument sets containing deny-listed path fragments
#[derive(Debug, Clone)]
pub struct ArgumentValidator {
    denied: Vec<String>,
}

impl Default for ArgumentValidator {
    fn default() -> Self {
        Self {
            denied: DENIED_FRAGMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ArgumentValidator {
    /// Validator with the default deny-list
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with a custom deny-list
    pub fn with_denied(denied: Vec<String>) -> Self {
        Self { denied }
    }

    /// Fail with [`ToolError::UnsafeArgument`] if any string in the
    /// argument set (keys included) contains a denied fragment.
    ///
    /// The scan runs over the decoded string values rather than the JSON
    /// encoding, so fragments containing backslashes still match.
    pub fn check(&self, args: &Value) -> Result<()> {
        self.scan(args)
    }

    fn scan(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.scan_str(s),
            Value::Array(items) => {
                for item in items {
                    self.scan(item)?;
                }
                Ok(())
            }
            Value::Object(map) => {
                for (key, item) in map {
                    self.scan_str(key)?;
                    self.scan(item)?;
                }
                Ok(())
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
        }
    }

    fn scan_str(&self, s: &str) -> Result<()> {
        for fragment in &self.denied {
            if s.contains(fragment.as_str()) {
                return Err(ToolError::UnsafeArgument(format!(
                    "argument contains '{fragment}'"
                )));
            }
        }
        Ok(())
    }
}
