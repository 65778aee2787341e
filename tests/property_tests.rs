//! Properties of whole-table encoding and the echo round trip.

use chrono::{DateTime, Duration, NaiveDateTime};
use proptest::prelude::*;
use serde_json::Value;

use gridbridge::codec::encoder::encode;
use gridbridge::{AgGrid, CellType, CellValue, Column, DataFrame, MemoryExchange, RenderOptions};

fn datetime_strategy() -> impl Strategy<Value = NaiveDateTime> {
    // 1900-01-01 .. 2199-12-31, any nanosecond.
    (-2_208_988_800i64..7_258_118_400, 0u32..1_000_000_000)
        .prop_filter_map("timestamp out of range", |(secs, nanos)| {
            DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
        })
}

fn duration_strategy() -> impl Strategy<Value = Duration> {
    (-1_000_000_000_000i64..1_000_000_000_000, 0i64..1_000_000_000)
        .prop_map(|(secs, nanos)| Duration::seconds(secs) + Duration::nanoseconds(if secs < 0 { -nanos } else { nanos }))
}

/// Any cell at all, non-finite floats and odd text included.
fn any_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::None),
        any::<bool>().prop_map(CellValue::Bool),
        any::<i64>().prop_map(CellValue::Int),
        any::<u64>().prop_map(CellValue::UInt),
        any::<f64>().prop_map(CellValue::Float),
        prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)].prop_map(CellValue::Float),
        "\\PC*".prop_map(CellValue::String),
        datetime_strategy().prop_map(CellValue::DateTime),
        duration_strategy().prop_map(CellValue::Duration),
    ]
}

fn any_frame() -> impl Strategy<Value = DataFrame> {
    (1usize..6, 0usize..8).prop_flat_map(|(width, rows)| {
        prop::collection::vec(prop::collection::vec(any_cell(), rows), width).prop_map(|columns| {
            DataFrame::from_columns(
                columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, values)| (format!("c{}", i), Column::infer(values))),
            )
            .unwrap()
        })
    })
}

fn maybe<T: Into<CellValue>>(value: impl Strategy<Value = T>) -> impl Strategy<Value = CellValue> {
    prop::option::weighted(0.8, value).prop_map(CellValue::from)
}

/// A column of one declared type, with missing cells, whose values survive
/// the wire unchanged. Floats are kept to quarter steps so their JSON text
/// reads back to the same bits.
fn typed_column(rows: usize) -> impl Strategy<Value = Column> {
    let column = move |dtype: CellType, cells: BoxedStrategy<CellValue>| {
        prop::collection::vec(cells, rows).prop_map(move |values| Column::new(dtype, values))
    };
    prop_oneof![
        column(CellType::Int, maybe(any::<i64>()).boxed()),
        column(CellType::UInt, maybe(any::<u64>()).boxed()),
        column(CellType::Float, maybe((-4_000_000i64..4_000_000).prop_map(|q| q as f64 / 4.0)).boxed()),
        column(CellType::String, maybe("\\PC{0,12}").boxed()),
        column(CellType::DateTime, maybe(datetime_strategy()).boxed()),
        column(CellType::Duration, maybe(duration_strategy()).boxed()),
        // A boolean column carries no type hint once every cell is missing.
        column(CellType::Bool, any::<bool>().prop_map(CellValue::Bool).boxed()),
    ]
}

fn nan_free_frame() -> impl Strategy<Value = DataFrame> {
    (1usize..6, 1usize..8).prop_flat_map(|(width, rows)| {
        prop::collection::vec(typed_column(rows), width).prop_map(|columns| {
            DataFrame::from_columns(columns.into_iter().enumerate().map(|(i, c)| (format!("c{}", i), c))).unwrap()
        })
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

proptest! {
    #[test]
    fn row_data_is_always_valid_json(frame in any_frame()) {
        let text = encode(&frame).row_data().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();

        let rows = parsed.as_array().unwrap();
        prop_assert_eq!(rows.len(), frame.len());
        for row in rows {
            prop_assert_eq!(row.as_object().unwrap().len(), frame.columns.len());
        }
    }

    #[test]
    fn nan_free_frames_round_trip_with_coerce(frame in nan_free_frame()) {
        let grid = AgGrid::new(MemoryExchange::echo());
        let options = RenderOptions::new().with_conversion_errors("coerce");

        let response = runtime().block_on(grid.render(&frame, &options)).unwrap();

        prop_assert_eq!(response.data, frame);
        prop_assert!(response.selected_rows.is_empty());
    }
}
