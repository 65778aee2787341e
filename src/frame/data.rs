use std::collections::HashSet;
use std::fmt;
use std::fmt::Formatter;

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;

use crate::error::{GridError, Result};
use crate::frame::temporal::{format_datetime, format_duration};
use crate::frame::trans::json_to_cell;
use crate::frame::WireRecord;

/// A single cell. Every variant knows how to render itself, so the codec never
/// has to inspect values at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
    Duration(Duration),
    None,
}

/// Declared element type of a column.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum CellType {
    Bool,
    Int,
    UInt,
    Float,
    String,
    DateTime,
    Duration,
    Object,
}

impl CellType {
    /// The narrowest type able to hold values of both `self` and `other`.
    pub fn unify(self, other: CellType) -> CellType {
        use CellType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, UInt) | (UInt, Int) => Int,
            (Float, Int) | (Int, Float) | (Float, UInt) | (UInt, Float) => Float,
            _ => Object,
        }
    }
}

impl CellValue {
    /// Type of the cell, `None` for missing values.
    pub fn get_dtype(&self) -> Option<CellType> {
        match self {
            Self::Bool(_) => Some(CellType::Bool),
            Self::Int(_) => Some(CellType::Int),
            Self::UInt(_) => Some(CellType::UInt),
            Self::Float(_) => Some(CellType::Float),
            Self::String(_) => Some(CellType::String),
            Self::DateTime(_) => Some(CellType::DateTime),
            Self::Duration(_) => Some(CellType::Duration),
            Self::None => None,
        }
    }

    pub fn is_dtype(&self, dtype: CellType) -> bool {
        self.get_dtype() == Some(dtype)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Date/time text form, for the variants that have one.
    pub fn iso_format(&self) -> Option<String> {
        match self {
            Self::DateTime(d) => Some(format_datetime(d)),
            Self::Duration(d) => Some(format_duration(d)),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::UInt(u) => write!(f, "{}", u),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "{}", s),
            Self::DateTime(_) | Self::Duration(_) => {
                write!(f, "{}", self.iso_format().unwrap_or_default())
            }
            Self::None => write!(f, "None"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<u64> for CellValue {
    fn from(v: u64) -> Self {
        CellValue::UInt(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::DateTime(v)
    }
}

impl From<Duration> for CellValue {
    fn from(v: Duration) -> Self {
        CellValue::Duration(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::None)
    }
}

/// Infers a column type from its values, ignoring missing cells. A column with
/// no values at all is `Object`.
pub fn infer_dtype(values: &[CellValue]) -> CellType {
    values
        .iter()
        .filter_map(CellValue::get_dtype)
        .reduce(CellType::unify)
        .unwrap_or(CellType::Object)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub values: Vec<CellValue>,
    pub dtype: CellType,
}

impl Column {
    pub fn new(dtype: CellType, values: Vec<CellValue>) -> Self {
        Self { values, dtype }
    }

    /// Builds a column whose type is inferred from its values.
    pub fn infer(values: Vec<CellValue>) -> Self {
        let dtype = infer_dtype(&values);
        Self { values, dtype }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    pub columns: IndexMap<String, Column>,
    pub count: usize,
}

impl DataFrame {
    /// Instantiate an empty DataFrame.
    pub fn new() -> Self {
        Self {
            columns: IndexMap::new(),
            count: 0,
        }
    }

    /// Builds a frame from `(name, column)` pairs, checking that all columns
    /// have the same length and distinct names.
    pub fn from_columns<N: Into<String>>(columns: impl IntoIterator<Item = (N, Column)>) -> Result<Self> {
        let mut frame = Self::new();
        for (name, column) in columns {
            frame.add_column(name.into(), column)?;
        }
        Ok(frame)
    }

    /// Builds a frame out of wire records. The column set is the union of the
    /// record keys in first-seen order; records missing a key get `None`.
    pub fn from_records(records: Vec<WireRecord>) -> Self {
        let mut values: IndexMap<String, Vec<CellValue>> = IndexMap::new();
        let mut row_count: usize = 0;

        for record in records {
            let mut seen: HashSet<String> = HashSet::with_capacity(record.len());

            for (col, value) in record {
                // Pad new columns so they line up with the rows already read.
                let column = values
                    .entry(col.clone())
                    .or_insert_with(|| vec![CellValue::None; row_count]);
                column.push(json_to_cell(value));
                seen.insert(col);
            }

            for (col, column) in values.iter_mut() {
                if !seen.contains(col) {
                    column.push(CellValue::None);
                }
            }
            row_count += 1;
        }

        Self {
            columns: values.into_iter().map(|(k, v)| (k, Column::infer(v))).collect(),
            count: row_count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.columns.is_empty()
    }

    pub fn has_column(&self, column_name: &str) -> bool {
        self.columns.contains_key(column_name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn add_column(&mut self, name: String, column: Column) -> Result<()> {
        if self.has_column(&name) {
            return Err(GridError::DuplicateColumn { name });
        }
        if self.columns.is_empty() && self.count == 0 {
            self.count = column.len();
        } else if column.len() != self.count {
            return Err(GridError::LengthMismatch {
                name,
                len: column.len(),
                expected: self.count,
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Cells of row `index` in column order.
    pub fn row(&self, index: usize) -> Option<Vec<(&str, &CellValue)>> {
        if index >= self.count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|(name, column)| (name.as_str(), &column.values[index]))
                .collect(),
        )
    }
}
