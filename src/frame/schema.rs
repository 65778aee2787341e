use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GridError, Result};
use crate::frame::data::{CellType, DataFrame};

/// Semantic type of a column, captured before encoding and echoed back by the
/// grid so the decoder can restore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnTypeTag {
    SignedInt,
    UnsignedInt,
    Float,
    Boolean,
    Object,
    DateTime,
    Duration,
}

/// How the decoder treats a column with a given tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagGroup {
    Numeric,
    Text,
    DateTime,
    Duration,
    Untouched,
}

impl ColumnTypeTag {
    const NAMES: [&'static str; 7] = [
        "signed-int",
        "unsigned-int",
        "float",
        "boolean",
        "object",
        "datetime",
        "duration",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignedInt => "signed-int",
            Self::UnsignedInt => "unsigned-int",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
        }
    }

    pub fn group(&self) -> TagGroup {
        match self {
            Self::SignedInt | Self::UnsignedInt | Self::Float => TagGroup::Numeric,
            Self::Object => TagGroup::Text,
            Self::DateTime => TagGroup::DateTime,
            Self::Duration => TagGroup::Duration,
            Self::Boolean => TagGroup::Untouched,
        }
    }

    /// Column type the decoder should land on for this tag.
    pub fn cell_type(&self) -> CellType {
        match self {
            Self::SignedInt => CellType::Int,
            Self::UnsignedInt => CellType::UInt,
            Self::Float => CellType::Float,
            Self::Boolean => CellType::Bool,
            Self::Object => CellType::String,
            Self::DateTime => CellType::DateTime,
            Self::Duration => CellType::Duration,
        }
    }
}

impl From<CellType> for ColumnTypeTag {
    fn from(dtype: CellType) -> Self {
        match dtype {
            CellType::Int => Self::SignedInt,
            CellType::UInt => Self::UnsignedInt,
            CellType::Float => Self::Float,
            CellType::Bool => Self::Boolean,
            CellType::DateTime => Self::DateTime,
            CellType::Duration => Self::Duration,
            CellType::String | CellType::Object => Self::Object,
        }
    }
}

impl FromStr for ColumnTypeTag {
    type Err = GridError;

    /// Accepts the kebab-case names as well as the single letter kind codes
    /// used by older widget builds.
    fn from_str(input: &str) -> Result<ColumnTypeTag> {
        // Kind codes are case sensitive: `M` is datetime, `m` is duration.
        match input {
            "i" => return Ok(Self::SignedInt),
            "u" => return Ok(Self::UnsignedInt),
            "f" => return Ok(Self::Float),
            "b" => return Ok(Self::Boolean),
            "O" | "S" | "U" => return Ok(Self::Object),
            "M" => return Ok(Self::DateTime),
            "m" => return Ok(Self::Duration),
            _ => {}
        }

        match input.to_lowercase().as_str() {
            "signed-int" | "int" => Ok(Self::SignedInt),
            "unsigned-int" | "uint" => Ok(Self::UnsignedInt),
            "float" => Ok(Self::Float),
            "boolean" | "bool" => Ok(Self::Boolean),
            "object" | "text" | "string" => Ok(Self::Object),
            "datetime" => Ok(Self::DateTime),
            "duration" | "timedelta" => Ok(Self::Duration),
            _ => Err(GridError::invalid_option("column type tag", input, &Self::NAMES)),
        }
    }
}

impl fmt::Display for ColumnTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ColumnTypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnTypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Captures the type tag of every column of `dataframe`, in column order.
pub fn classify(dataframe: &DataFrame) -> IndexMap<String, ColumnTypeTag> {
    dataframe
        .columns
        .iter()
        .map(|(name, column)| (name.clone(), ColumnTypeTag::from(column.dtype)))
        .collect()
}
