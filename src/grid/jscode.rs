use serde_json::{Map, Value};

/// Key of the single-entry object that marks a JavaScript snippet inside grid
/// options.
pub const JS_CODE_MARKER: &str = "__jscode__";

/// JavaScript source to be evaluated by the grid, e.g. a cell renderer.
///
/// Grid options holding a `JsCode` are refused by every exchange unless the
/// caller opts in with `allow_unsafe_jscode`, in which case the snippets are
/// unwrapped to plain strings before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsCode {
    pub js_code: String,
}

impl JsCode {
    pub fn new(js_code: impl Into<String>) -> Self {
        Self { js_code: js_code.into() }
    }

    pub fn from_value(value: &Value) -> Option<JsCode> {
        match value {
            Value::Object(map) => Self::from_marker(map),
            _ => None,
        }
    }

    fn from_marker(map: &Map<String, Value>) -> Option<JsCode> {
        if map.len() != 1 {
            return None;
        }
        match map.get(JS_CODE_MARKER) {
            Some(Value::String(code)) => Some(JsCode::new(code.as_str())),
            _ => None,
        }
    }
}

impl From<JsCode> for Value {
    fn from(code: JsCode) -> Self {
        let mut map = Map::new();
        map.insert(JS_CODE_MARKER.to_string(), Value::String(code.js_code));
        Value::Object(map)
    }
}

/// Applies `func` to every leaf of the options tree. `JsCode` markers count as
/// leaves.
pub fn walk_grid_options<F>(value: &mut Value, func: &mut F)
where
    F: FnMut(&mut Value),
{
    match value {
        Value::Object(map) if JsCode::from_marker(map).is_none() => {
            for child in map.values_mut() {
                walk_grid_options(child, func);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                walk_grid_options(child, func);
            }
        }
        leaf => func(leaf),
    }
}

/// Replaces every `JsCode` marker with its raw source text.
pub fn unwrap_js_code(options: &mut Value) {
    walk_grid_options(options, &mut |leaf| {
        if let Some(code) = JsCode::from_value(leaf) {
            *leaf = Value::String(code.js_code);
        }
    });
}

/// Path of the first `JsCode` marker found, `/`-separated.
pub fn find_js_code(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if JsCode::from_marker(map).is_some() {
                return Some(String::new());
            }
            map.iter()
                .find_map(|(key, child)| find_js_code(child).map(|rest| join_path(key, &rest)))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, child)| find_js_code(child).map(|rest| join_path(&i.to_string(), &rest))),
        _ => None,
    }
}

fn join_path(head: &str, rest: &str) -> String {
    if rest.is_empty() {
        head.to_string()
    } else {
        format!("{}/{}", head, rest)
    }
}
