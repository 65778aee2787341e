use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Copies `overrides` into `target`, replacing existing keys.
pub fn merge_object(target: &mut Map<String, Value>, overrides: &IndexMap<String, Value>) {
    for (key, value) in overrides {
        target.insert(key.clone(), value.clone());
    }
}

/// Short printable form of a JSON value for log lines and error messages.
pub fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
