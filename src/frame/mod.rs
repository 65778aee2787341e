pub mod data;
pub mod schema;
pub mod temporal;
pub mod trans;

use indexmap::IndexMap;

/// One encoded row: column name to JSON scalar, in column order.
pub type WireRecord = IndexMap<String, serde_json::Value>;
