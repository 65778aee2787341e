use serde_json::Value;

use crate::frame::data::CellValue;

/// Maps a JSON scalar coming back from the grid onto a cell. Nested arrays and
/// objects are kept as their JSON text.
pub fn json_to_cell(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::None,
        Value::Bool(v) => CellValue::Bool(v),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                CellValue::UInt(u)
            } else {
                n.as_f64().map(CellValue::Float).unwrap_or(CellValue::None)
            }
        }
        Value::String(v) => CellValue::String(v),
        other => CellValue::String(other.to_string()),
    }
}
