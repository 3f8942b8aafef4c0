//! Argument extraction helpers shared by the built-in tools
//!
//! Missing or mistyped required arguments are tool-specific failures; the
//! same condition fails preview and apply alike.

use serde_json::Value;

use crate::error::{Result, ToolError};

/// Required string argument
pub(crate) fn require_str<'a>(tool: &str, args: &'a Value, key: &str) -> Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolError::failed(
            tool,
            format!("argument '{key}' must be a string"),
        )),
        None => Err(ToolError::failed(
            tool,
            format!("missing required argument '{key}'"),
        )),
    }
}

/// Optional string argument with a default
pub(crate) fn str_or<'a>(args: &'a Value, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Required non-empty array of strings
pub(crate) fn require_str_vec(tool: &str, args: &Value, key: &str) -> Result<Vec<String>> {
    let items = match args.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ToolError::failed(
                tool,
                format!("argument '{key}' must be an array of strings"),
            ))
        }
        None => {
            return Err(ToolError::failed(
                tool,
                format!("missing required argument '{key}'"),
            ))
        }
    };
    if items.is_empty() {
        return Err(ToolError::failed(
            tool,
            format!("argument '{key}' must not be empty"),
        ));
    }
    items
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                ToolError::failed(tool, format!("argument '{key}' must contain only strings"))
            })
        })
        .collect()
}

/// Optional array of strings with a default
pub(crate) fn str_vec_or(args: &Value, key: &str, default: &[&str]) -> Vec<String> {
    match args.get(key).and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Optional unsigned integer
pub(crate) fn u64_opt(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_str() {
        let args = json!({"path": "a.txt", "n": 3});
        assert_eq!(require_str("t", &args, "path").unwrap(), "a.txt");
        assert!(require_str("t", &args, "missing").is_err());
        assert!(require_str("t", &args, "n").is_err());
    }

    #[test]
    fn test_str_or_default() {
        let args = json!({"content": "x"});
        assert_eq!(str_or(&args, "content", ""), "x");
        assert_eq!(str_or(&args, "absent", "fallback"), "fallback");
    }

    #[test]
    fn test_require_str_vec() {
        let args = json!({"argv": ["echo", "hi"]});
        assert_eq!(
            require_str_vec("t", &args, "argv").unwrap(),
            vec!["echo", "hi"]
        );
        assert!(require_str_vec("t", &json!({"argv": []}), "argv").is_err());
        assert!(require_str_vec("t", &json!({"argv": [1]}), "argv").is_err());
        assert!(require_str_vec("t", &json!({}), "argv").is_err());
    }

    #[test]
    fn test_str_vec_or_default() {
        let args = json!({});
        assert_eq!(
            str_vec_or(&args, "args", &["-r", "requirements.txt"]),
            vec!["-r", "requirements.txt"]
        );
    }
}
