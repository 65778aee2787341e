use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::frame::data::DataFrame;
use crate::frame::schema::ColumnTypeTag;
use crate::frame::WireRecord;
use crate::grid::options::{DataReturnMode, GridUpdateMode, Theme};
use crate::utils::json_text;

/// Arguments shipped to the grid component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundPayload {
    #[serde(rename = "gridOptions")]
    pub grid_options: Value,
    /// Row records as a JSON string, decoded by the component itself.
    pub row_data: String,
    pub height: u32,
    pub width: Option<u32>,
    pub fit_columns_on_grid_load: bool,
    pub update_mode: GridUpdateMode,
    pub data_return_mode: DataReturnMode,
    pub frame_dtypes: IndexMap<String, ColumnTypeTag>,
    pub allow_unsafe_jscode: bool,
    pub enable_enterprise_modules: bool,
    pub license_key: Option<String>,
    pub reload_data: bool,
    pub theme: Theme,
}

/// What the grid sends back after a user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundResponse {
    pub row_data: Vec<WireRecord>,
    /// Echo of `frame_dtypes`. Kept raw so one unknown tag does not reject the
    /// whole response.
    #[serde(default)]
    pub original_dtypes: IndexMap<String, Value>,
    #[serde(default)]
    pub selected_rows: Vec<WireRecord>,
}

impl InboundResponse {
    /// Component values may arrive as a document or as its JSON text.
    pub fn from_component_value(value: Value) -> Result<Self> {
        let response = match value {
            Value::String(text) => serde_json::from_str(&text)?,
            other => serde_json::from_value(other)?,
        };
        Ok(response)
    }

    /// Parsed column tags. Unrecognised entries are skipped.
    pub fn column_tags(&self) -> IndexMap<String, ColumnTypeTag> {
        let mut tags = IndexMap::with_capacity(self.original_dtypes.len());
        for (column, raw) in &self.original_dtypes {
            let parsed = match raw {
                Value::String(s) => s.parse::<ColumnTypeTag>().ok(),
                _ => None,
            };
            match parsed {
                Some(tag) => {
                    tags.insert(column.clone(), tag);
                }
                None => log::warn!(
                    "Ignoring unknown dtype {} for column '{}'",
                    json_text(raw),
                    column
                ),
            }
        }
        tags
    }
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResponse {
    /// Grid data including user edits, or the input frame before any
    /// interaction.
    pub data: DataFrame,
    pub selected_rows: Vec<WireRecord>,
}

impl GridResponse {
    pub fn unchanged(dataframe: &DataFrame) -> Self {
        Self {
            data: dataframe.clone(),
            selected_rows: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_may_be_string_wrapped() {
        let document = json!({
            "rowData": [{"a": 1}],
            "originalDtypes": {"a": "i"},
            "selectedRows": [{"a": 1}]
        });
        let from_text = InboundResponse::from_component_value(Value::String(document.to_string())).unwrap();
        let from_doc = InboundResponse::from_component_value(document).unwrap();
        assert_eq!(from_text, from_doc);
        assert_eq!(from_doc.selected_rows.len(), 1);
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let response = InboundResponse::from_component_value(json!({
            "rowData": [],
            "originalDtypes": {"a": "signed-int", "b": "c", "c": 3}
        }))
        .unwrap();

        let tags = response.column_tags();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["a"], ColumnTypeTag::SignedInt);
        assert!(response.selected_rows.is_empty());
    }

    #[test]
    fn malformed_response_is_an_error() {
        assert!(InboundResponse::from_component_value(json!({"selectedRows": []})).is_err());
        assert!(InboundResponse::from_component_value(json!("{not json")).is_err());
    }

    #[test]
    fn payload_uses_widget_field_names() {
        let payload = OutboundPayload {
            grid_options: json!({}),
            row_data: "[]".to_string(),
            height: 400,
            width: None,
            fit_columns_on_grid_load: false,
            update_mode: GridUpdateMode::VALUE_CHANGED,
            data_return_mode: DataReturnMode::AsInput,
            frame_dtypes: IndexMap::new(),
            allow_unsafe_jscode: false,
            enable_enterprise_modules: false,
            license_key: None,
            reload_data: false,
            theme: Theme::Light,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("gridOptions").is_some());
        assert_eq!(value["update_mode"], json!(2));
        assert_eq!(value["data_return_mode"], json!(0));
        assert_eq!(value["theme"], json!("light"));
    }
}
