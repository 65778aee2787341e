use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::frame::data::DataFrame;
use crate::frame::schema::{classify, ColumnTypeTag};
use crate::utils::merge_object;

/// Produces grid options for a frame when the caller did not supply any.
pub trait OptionsBuilder {
    fn build(&self, dataframe: &DataFrame, default_column_parameters: &IndexMap<String, Value>) -> Value;
}

/// Minimal default options: one column definition per frame column and a
/// shared `defaultColDef` that caller parameters override.
#[derive(Debug, Clone, Default)]
pub struct GridOptionsBuilder;

impl GridOptionsBuilder {
    fn default_col_def() -> Map<String, Value> {
        let mut def = Map::new();
        def.insert("editable".to_string(), json!(false));
        def.insert("filter".to_string(), json!(true));
        def.insert("resizable".to_string(), json!(true));
        def.insert("sortable".to_string(), json!(true));
        def
    }

    fn column_def(name: &str, tag: ColumnTypeTag) -> Value {
        let mut def = Map::new();
        def.insert("field".to_string(), json!(name));
        def.insert("headerName".to_string(), json!(name));

        match tag {
            ColumnTypeTag::SignedInt | ColumnTypeTag::UnsignedInt | ColumnTypeTag::Float => {
                def.insert("type".to_string(), json!(["numericColumn", "numberColumnFilter"]));
            }
            ColumnTypeTag::DateTime => {
                def.insert("type".to_string(), json!(["dateColumnFilter", "customDateTimeFormat"]));
            }
            _ => {}
        }
        Value::Object(def)
    }
}

impl OptionsBuilder for GridOptionsBuilder {
    fn build(&self, dataframe: &DataFrame, default_column_parameters: &IndexMap<String, Value>) -> Value {
        let mut default_col_def = Self::default_col_def();
        merge_object(&mut default_col_def, default_column_parameters);

        let column_defs: Vec<Value> = classify(dataframe)
            .into_iter()
            .map(|(name, tag)| Self::column_def(&name, tag))
            .collect();

        json!({
            "defaultColDef": Value::Object(default_col_def),
            "columnDefs": column_defs,
        })
    }
}
