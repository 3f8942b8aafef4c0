//! Unified diff rendering for previews
//!
//! Preview-only: nothing here touches the filesystem. Output follows the
//! conventional `a/<path>` / `b/<path>` header form.

use similar::TextDiff;

/// Render a unified diff between two versions of a file's content.
///
/// Returns an empty string when the contents are identical.
pub fn unified_diff(before: &str, after: &str, rel_path: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    diff.unified_diff()
        .context_radius(3)
        .header(&format!("a/{rel_path}"), &format!("b/{rel_path}"))
        .to_string()
}
