use chrono::{DateTime, Duration};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{GridError, Result};
use crate::frame::data::{infer_dtype, CellType, CellValue, Column, DataFrame};
use crate::frame::schema::{ColumnTypeTag, TagGroup};
use crate::frame::temporal::{parse_datetime, parse_duration};
use crate::codec::payload::{GridResponse, InboundResponse};
use crate::grid::options::ConversionErrors;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Rebuilds the grid's data from a component value.
///
/// No value means the user has not interacted yet and `original` is returned
/// as is. Otherwise the rows are turned into a frame and, when
/// `convert_types` is set, every column is converted back according to the
/// tag echoed by the grid.
pub fn decode(
    original: &DataFrame,
    component_value: Option<Value>,
    convert_types: bool,
    errors: ConversionErrors,
) -> Result<GridResponse> {
    let value = match component_value {
        None | Some(Value::Null) => return Ok(GridResponse::unchanged(original)),
        Some(value) => value,
    };

    let response = InboundResponse::from_component_value(value)?;
    let tags = response.column_tags();
    let mut frame = DataFrame::from_records(response.row_data);

    // Zero rows say nothing about types.
    if !frame.is_empty() && convert_types {
        restore_types(&mut frame, &tags, errors)?;
    }

    Ok(GridResponse {
        data: frame,
        selected_rows: response.selected_rows,
    })
}

/// Converts columns group by group: numeric, text, datetime, then duration.
pub fn restore_types(
    frame: &mut DataFrame,
    tags: &IndexMap<String, ColumnTypeTag>,
    errors: ConversionErrors,
) -> Result<()> {
    for (name, tag) in tags {
        if !frame.has_column(name) {
            log::warn!("Column '{}' ({}) is missing from the grid response", name, tag);
        }
    }

    for group in [TagGroup::Numeric, TagGroup::Text, TagGroup::DateTime, TagGroup::Duration] {
        for (name, tag) in tags.iter().filter(|(_, tag)| tag.group() == group) {
            let column = match frame.get_mut(name) {
                Some(column) => column,
                None => continue,
            };

            match group {
                TagGroup::Numeric => {
                    if convert_column(name, column, errors, "number", parse_number)? {
                        narrow_numeric(column, *tag);
                    }
                }
                TagGroup::Text => to_text(column),
                TagGroup::DateTime => {
                    if convert_column(name, column, errors, "datetime", parse_datetime_cell)? {
                        column.dtype = CellType::DateTime;
                    }
                }
                TagGroup::Duration => convert_each(column, parse_duration_cell, CellType::Duration),
                TagGroup::Untouched => {}
            }
        }
    }
    Ok(())
}

/// Parses a whole column. On the first failure `errors` decides: `Raise`
/// returns it, `Coerce` turns failing cells into `None` and `Ignore` leaves the
/// column untouched. Returns whether the column was replaced.
fn convert_column<F>(
    name: &str,
    column: &mut Column,
    errors: ConversionErrors,
    target: &'static str,
    parse: F,
) -> Result<bool>
where
    F: Fn(&CellValue) -> Option<CellValue>,
{
    let mut converted = Vec::with_capacity(column.len());

    for cell in &column.values {
        if cell.is_none() {
            converted.push(CellValue::None);
            continue;
        }
        match parse(cell) {
            Some(value) => converted.push(value),
            None => match errors {
                ConversionErrors::Raise => {
                    return Err(GridError::Conversion {
                        column: name.to_string(),
                        value: cell.to_string(),
                        target,
                    })
                }
                ConversionErrors::Coerce => converted.push(CellValue::None),
                ConversionErrors::Ignore => {
                    log::debug!("Keeping column '{}' as returned, {} is not a {}", name, cell, target);
                    return Ok(false);
                }
            },
        }
    }

    column.values = converted;
    Ok(true)
}

/// Parses each cell on its own. Cells that fail keep their original value
/// whatever the error policy.
fn convert_each<F>(column: &mut Column, parse: F, target: CellType)
where
    F: Fn(&CellValue) -> Option<CellValue>,
{
    for cell in column.values.iter_mut() {
        if let Some(value) = parse(cell) {
            *cell = value;
        }
    }
    column.dtype = dtype_or(&column.values, target);
}

fn to_text(column: &mut Column) {
    for cell in column.values.iter_mut() {
        if !cell.is_none() && !cell.is_dtype(CellType::String) {
            *cell = CellValue::String(cell.to_string());
        }
    }
    column.dtype = CellType::String;
}

fn dtype_or(values: &[CellValue], fallback: CellType) -> CellType {
    if values.iter().all(CellValue::is_none) {
        fallback
    } else {
        infer_dtype(values)
    }
}

fn parse_number(cell: &CellValue) -> Option<CellValue> {
    match cell {
        CellValue::Int(_) | CellValue::UInt(_) | CellValue::Float(_) => Some(cell.clone()),
        CellValue::Bool(b) => Some(CellValue::Int(*b as i64)),
        CellValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(CellValue::None);
            }
            if let Ok(i) = s.parse::<i64>() {
                Some(CellValue::Int(i))
            } else if let Ok(u) = s.parse::<u64>() {
                Some(CellValue::UInt(u))
            } else {
                s.parse::<f64>().ok().map(CellValue::Float)
            }
        }
        _ => None,
    }
}

/// Lands the column on the tag's numeric type when no value is lost, else on
/// the first of `Int` or `Float` that holds every value.
fn narrow_numeric(column: &mut Column, tag: ColumnTypeTag) {
    for target in [tag.cell_type(), CellType::Int, CellType::Float] {
        let cast: Option<Vec<CellValue>> = column.values.iter().map(|cell| cast_numeric(cell, target)).collect();
        if let Some(values) = cast {
            column.values = values;
            column.dtype = target;
            return;
        }
    }
    column.dtype = dtype_or(&column.values, CellType::Float);
}

fn cast_numeric(cell: &CellValue, target: CellType) -> Option<CellValue> {
    match (cell, target) {
        (CellValue::None, _) => Some(CellValue::None),
        (CellValue::Int(i), CellType::Int) => Some(CellValue::Int(*i)),
        (CellValue::Int(i), CellType::UInt) => u64::try_from(*i).ok().map(CellValue::UInt),
        (CellValue::Int(i), CellType::Float) => Some(CellValue::Float(*i as f64)),
        (CellValue::UInt(u), CellType::Int) => i64::try_from(*u).ok().map(CellValue::Int),
        (CellValue::UInt(u), CellType::UInt) => Some(CellValue::UInt(*u)),
        (CellValue::UInt(u), CellType::Float) => Some(CellValue::Float(*u as f64)),
        (CellValue::Float(f), CellType::Float) => Some(CellValue::Float(*f)),
        (CellValue::Float(f), CellType::Int) if is_integral(*f, i64::MIN as f64, i64::MAX as f64) => {
            Some(CellValue::Int(*f as i64))
        }
        (CellValue::Float(f), CellType::UInt) if is_integral(*f, 0.0, u64::MAX as f64) => {
            Some(CellValue::UInt(*f as u64))
        }
        _ => None,
    }
}

fn is_integral(f: f64, min: f64, max: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= min && f < max
}

fn parse_datetime_cell(cell: &CellValue) -> Option<CellValue> {
    match cell {
        CellValue::DateTime(_) => Some(cell.clone()),
        CellValue::String(s) if s.trim().is_empty() => Some(CellValue::None),
        CellValue::String(s) => parse_datetime(s).map(CellValue::DateTime),
        // Bare integers are nanoseconds since the epoch.
        CellValue::Int(nanos) => DateTime::from_timestamp(
            nanos.div_euclid(NANOS_PER_SECOND),
            nanos.rem_euclid(NANOS_PER_SECOND) as u32,
        )
        .map(|dt| CellValue::DateTime(dt.naive_utc())),
        _ => None,
    }
}

fn parse_duration_cell(cell: &CellValue) -> Option<CellValue> {
    match cell {
        CellValue::Duration(_) | CellValue::None => Some(cell.clone()),
        CellValue::String(s) if s.trim().is_empty() => Some(CellValue::None),
        CellValue::String(s) => parse_duration(s).map(CellValue::Duration),
        // Bare integers are nanoseconds.
        CellValue::Int(nanos) => Some(CellValue::Duration(Duration::nanoseconds(*nanos))),
        _ => None,
    }
}
