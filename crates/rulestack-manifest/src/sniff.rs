use std::path::Path;

use serde_json::Value;

/// `true` if the JSON file at `path` looks like a project manifest
/// (has a `projectRoot` key). Never fails: any I/O or parse error is
/// treated as "not a project manifest".
#[must_use]
pub fn is_project_manifest(path: &Path) -> bool {
    sniff_object(path).is_some_and(|obj| obj.contains_key("projectRoot"))
}

/// `true` if the JSON file at `path` looks like a package manifest (has a
/// `files` key, or is an array whose first element does). Never fails.
#[must_use]
pub fn is_package_manifest(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<Value>(&content) else {
        return false;
    };
    match value {
        Value::Object(obj) => obj.contains_key("files"),
        Value::Array(items) => items
            .first()
            .and_then(Value::as_object)
            .is_some_and(|obj| obj.contains_key("files")),
        _ => false,
    }
}

fn sniff_object(path: &Path) -> Option<serde_json::Map<String, Value>> {
    let content = std::fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&content).ok()?;
    match value {
        Value::Object(obj) => Some(obj),
        _ => None,
    }
}
