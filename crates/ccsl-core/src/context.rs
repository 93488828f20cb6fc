//! Path resolution over the JSON context tree the assistant pipes in.
//!
//! The context is kept as a [`serde_json::Value`]: a tagged union of null,
//! bool, number, string, array, and object. These helpers are the only
//! place that descends into it by dotted path.

use serde_json::Value;

/// Parse the raw stdin payload. Anything unparseable becomes `Null`, which
/// resolves no paths.
pub fn parse(raw: &[u8]) -> Value {
    serde_json::from_slice(raw).unwrap_or(Value::Null)
}

/// Resolve a dotted path (`workspace.current_dir`) against `root`.
///
/// Returns `None` when any segment is missing or when an intermediate value
/// is not an object. Empty path segments never match.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let mut cur = root;
    for key in path.split('.') {
        if key.is_empty() {
            return None;
        }
        cur = cur.as_object()?.get(key)?;
    }
    Some(cur)
}

/// Resolve a path and return it as a string slice if it is a JSON string.
pub fn lookup_str<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    lookup(root, path).and_then(Value::as_str)
}

/// Resolve a path and return it as a number if it is numeric.
pub fn lookup_f64(root: &Value, path: &str) -> Option<f64> {
    lookup(root, path).and_then(Value::as_f64)
}

/// Textual form used by condition comparisons: null is `""`, booleans are
/// `true`/`false`, strings are verbatim, numbers go through
/// [`number_text`], everything else is its JSON text.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

/// Whole floats print without a fraction (`1.0` is `1`) below 1e21, so a
/// float field compares equal to an integer literal.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

/// Default cache key discriminator: `projectDir|currentDir`.
pub fn workspace_key(root: &Value) -> String {
    let project = lookup_str(root, "workspace.project_dir").unwrap_or_default();
    let current = lookup_str(root, "workspace.current_dir").unwrap_or_default();
    format!("{project}|{current}")
}
