//! Marshalling between typed data frames and an interactive grid component.
//!
//! A render call classifies the frame's columns, encodes every cell into a
//! JSON-safe scalar, hands the payload to the component host through a
//! [`ComponentExchange`] and converts whatever the grid sends back into a
//! typed frame again, using the column tags captured before encoding.
//!
//! ```no_run
//! use gridbridge::{AgGrid, CellType, Column, DataFrame, MemoryExchange, RenderOptions};
//!
//! # async fn demo() -> gridbridge::Result<()> {
//! let frame = DataFrame::from_columns(vec![
//!     ("id", Column::new(CellType::Int, vec![1i64.into(), 2i64.into()])),
//!     ("name", Column::new(CellType::String, vec!["a".into(), "b".into()])),
//! ])?;
//!
//! let grid = AgGrid::new(MemoryExchange::new());
//! let response = grid.render(&frame, &RenderOptions::new().with_theme("dark")).await?;
//! assert_eq!(response.data, frame);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod exchange;
pub mod frame;
pub mod grid;
mod metadata;
mod utils;

pub use codec::payload::{GridResponse, InboundResponse, OutboundPayload};
pub use error::{GridError, Result};
pub use exchange::exchange::{ComponentExchange, ExchangeError};
pub use exchange::http::HttpExchange;
pub use exchange::memory::MemoryExchange;
pub use exchange::ComponentLocation;
pub use frame::data::{CellType, CellValue, Column, DataFrame};
pub use frame::schema::ColumnTypeTag;
pub use frame::WireRecord;
pub use grid::builder::{GridOptionsBuilder, OptionsBuilder};
pub use grid::jscode::JsCode;
pub use grid::options::{ConversionErrors, DataReturnMode, GridUpdateMode, RenderOptions, Selector, Theme};
pub use grid::render::AgGrid;
