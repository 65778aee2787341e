//! Error types for the grid bridge.

use crate::exchange::exchange::ExchangeError;

/// Result type alias for grid bridge operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors surfaced by a render call.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A render option did not resolve to one of its legal values.
    #[error("{value} is not valid for {option}. Available options: {valid:?}")]
    InvalidOption {
        option: &'static str,
        value: String,
        valid: Vec<&'static str>,
    },

    /// The transport refused executable code embedded in the grid options.
    #[error("{message}")]
    UnsafeJsCode { message: String },

    /// Any other failure at the component boundary.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// The component value was not a well formed response document.
    #[error("Invalid component response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// A cell could not be converted back to its column's original type.
    #[error("Unable to parse {value} at column '{column}' as {target}")]
    Conversion {
        column: String,
        value: String,
        target: &'static str,
    },

    /// A column was added with a different length than the frame.
    #[error("Column '{name}' has {len} values, frame has {expected} rows")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error("Column '{name}' already exists")]
    DuplicateColumn { name: String },
}

impl GridError {
    pub(crate) fn invalid_option(option: &'static str, value: impl ToString, valid: &[&'static str]) -> Self {
        GridError::InvalidOption {
            option,
            value: value.to_string(),
            valid: valid.to_vec(),
        }
    }
}
