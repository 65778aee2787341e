use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::error::Result;
use crate::frame::data::{CellValue, DataFrame};
use crate::frame::schema::{classify, ColumnTypeTag};
use crate::frame::WireRecord;

/// Rows ready for the wire plus the tags needed to restore them.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub rows: Vec<WireRecord>,
    pub frame_dtypes: IndexMap<String, ColumnTypeTag>,
}

impl EncodedFrame {
    /// JSON text of the rows. Never contains `NaN` or `Infinity` tokens.
    pub fn row_data(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }
}

/// Turns a cell into a JSON scalar the grid can render.
///
/// Date/time cells use their ISO text. Numbers pass through unless they are
/// not finite, in which case their string form is sent. Missing values become
/// `null` and anything else its string form.
pub fn encode_cell(value: &CellValue) -> Value {
    if let Some(text) = value.iso_format() {
        return Value::String(text);
    }

    match value {
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => Value::from(*i),
        CellValue::UInt(u) => Value::from(*u),
        CellValue::Float(f) => match Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            None => Value::String(f.to_string()),
        },
        CellValue::None => Value::Null,
        other => Value::String(other.to_string()),
    }
}

pub fn encode_rows(dataframe: &DataFrame) -> Vec<WireRecord> {
    (0..dataframe.count)
        .map(|i| {
            dataframe
                .columns
                .iter()
                .map(|(name, column)| {
                    let cell = column.values.get(i).unwrap_or(&CellValue::None);
                    (name.clone(), encode_cell(cell))
                })
                .collect()
        })
        .collect()
}

/// Classifies the frame, then encodes it. Tags are taken first since encoding
/// turns datetimes into plain strings.
pub fn encode(dataframe: &DataFrame) -> EncodedFrame {
    let frame_dtypes = classify(dataframe);
    let rows = encode_rows(dataframe);
    log::debug!("Encoded {} rows with dtypes {:?}", rows.len(), frame_dtypes);
    EncodedFrame { rows, frame_dtypes }
}
