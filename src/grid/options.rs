use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{GridError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Streamlit,
    Light,
    Dark,
    Blue,
    Fresh,
    Material,
}

impl Theme {
    pub const NAMES: [&'static str; 6] = ["streamlit", "light", "dark", "blue", "fresh", "material"];
}

impl FromStr for Theme {
    type Err = GridError;

    fn from_str(input: &str) -> Result<Theme> {
        match input {
            "streamlit" => Ok(Theme::Streamlit),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "blue" => Ok(Theme::Blue),
            "fresh" => Ok(Theme::Fresh),
            "material" => Ok(Theme::Material),
            _ => Err(GridError::invalid_option("theme", input, &Theme::NAMES)),
        }
    }
}

/// When the grid reports back to the host. Flags combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridUpdateMode(u8);

impl GridUpdateMode {
    pub const NO_UPDATE: Self = Self(0b00000);
    pub const MANUAL: Self = Self(0b00001);
    pub const VALUE_CHANGED: Self = Self(0b00010);
    pub const SELECTION_CHANGED: Self = Self(0b00100);
    pub const FILTERING_CHANGED: Self = Self(0b01000);
    pub const SORTING_CHANGED: Self = Self(0b10000);
    pub const MODEL_CHANGED: Self = Self(0b11110);

    const ALL_BITS: u8 = 0b11111;

    const NAMED: [(&'static str, GridUpdateMode); 7] = [
        ("NO_UPDATE", Self::NO_UPDATE),
        ("MANUAL", Self::MANUAL),
        ("VALUE_CHANGED", Self::VALUE_CHANGED),
        ("SELECTION_CHANGED", Self::SELECTION_CHANGED),
        ("FILTERING_CHANGED", Self::FILTERING_CHANGED),
        ("SORTING_CHANGED", Self::SORTING_CHANGED),
        ("MODEL_CHANGED", Self::MODEL_CHANGED),
    ];

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits & !Self::ALL_BITS == 0).then_some(Self(bits))
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn names() -> Vec<&'static str> {
        Self::NAMED.iter().map(|(name, _)| *name).collect()
    }
}

impl BitOr for GridUpdateMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl FromStr for GridUpdateMode {
    type Err = GridError;

    /// Member names, case-insensitive. `value_changed|selection_changed`
    /// combines flags.
    fn from_str(input: &str) -> Result<GridUpdateMode> {
        let mut mode = Self::NO_UPDATE;
        for part in input.split('|') {
            let wanted = part.trim().to_uppercase();
            let flag = Self::NAMED
                .iter()
                .find(|(name, _)| *name == wanted)
                .map(|(_, flag)| *flag)
                .ok_or_else(|| GridError::invalid_option("update_mode", input, &Self::names()))?;
            mode = mode | flag;
        }
        Ok(mode)
    }
}

impl fmt::Display for GridUpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some((name, _)) = Self::NAMED.iter().find(|(_, flag)| flag == self) {
            return write!(f, "{}", name);
        }
        let names: Vec<&str> = Self::NAMED[1..6]
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        write!(f, "{}", names.join("|"))
    }
}

impl Serialize for GridUpdateMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for GridUpdateMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| de::Error::custom(format!("{} is not a valid update mode", bits)))
    }
}

/// Which rows the grid sends back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataReturnMode {
    AsInput = 0,
    Filtered = 1,
    FilteredAndSorted = 2,
}

impl DataReturnMode {
    const NAMES: [&'static str; 3] = ["AS_INPUT", "FILTERED", "FILTERED_AND_SORTED"];
}

impl FromStr for DataReturnMode {
    type Err = GridError;

    fn from_str(input: &str) -> Result<DataReturnMode> {
        match input.trim().to_uppercase().as_str() {
            "AS_INPUT" => Ok(DataReturnMode::AsInput),
            "FILTERED" => Ok(DataReturnMode::Filtered),
            "FILTERED_AND_SORTED" => Ok(DataReturnMode::FilteredAndSorted),
            _ => Err(GridError::invalid_option("data_return_mode", input, &Self::NAMES)),
        }
    }
}

impl Serialize for DataReturnMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for DataReturnMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(DataReturnMode::AsInput),
            1 => Ok(DataReturnMode::Filtered),
            2 => Ok(DataReturnMode::FilteredAndSorted),
            other => Err(de::Error::custom(format!("{} is not a valid data return mode", other))),
        }
    }
}

/// What to do with a cell that cannot be converted back to its column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionErrors {
    /// Fail the whole render.
    Raise,
    /// Replace the cell with a missing value.
    #[default]
    Coerce,
    /// Keep the column as the grid returned it.
    Ignore,
}

impl FromStr for ConversionErrors {
    type Err = GridError;

    fn from_str(input: &str) -> Result<ConversionErrors> {
        match input.to_lowercase().as_str() {
            "raise" => Ok(ConversionErrors::Raise),
            "coerce" => Ok(ConversionErrors::Coerce),
            "ignore" => Ok(ConversionErrors::Ignore),
            _ => Err(GridError::invalid_option(
                "conversion_errors",
                input,
                &["raise", "coerce", "ignore"],
            )),
        }
    }
}

/// A mode given either already typed or by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Selector<T> {
    Typed(T),
    Named(String),
}

impl<T> Selector<T>
where
    T: FromStr<Err = GridError> + Copy,
{
    pub fn resolve(&self) -> Result<T> {
        match self {
            Selector::Typed(value) => Ok(*value),
            Selector::Named(name) => name.parse(),
        }
    }
}

impl<T> From<&str> for Selector<T> {
    fn from(name: &str) -> Self {
        Selector::Named(name.to_string())
    }
}

impl<T> From<String> for Selector<T> {
    fn from(name: String) -> Self {
        Selector::Named(name)
    }
}

impl From<GridUpdateMode> for Selector<GridUpdateMode> {
    fn from(mode: GridUpdateMode) -> Self {
        Selector::Typed(mode)
    }
}

impl From<DataReturnMode> for Selector<DataReturnMode> {
    fn from(mode: DataReturnMode) -> Self {
        Selector::Typed(mode)
    }
}

/// Everything a caller can pass to a render call besides the frame itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Explicit grid options. When absent, defaults are built from the frame.
    pub grid_options: Option<Value>,
    pub height: u32,
    /// Deprecated, kept only for compatibility with older hosts.
    pub width: Option<u32>,
    pub fit_columns_on_grid_load: bool,
    pub update_mode: Selector<GridUpdateMode>,
    pub data_return_mode: Selector<DataReturnMode>,
    pub allow_unsafe_jscode: bool,
    pub enable_enterprise_modules: bool,
    pub license_key: Option<String>,
    pub try_to_convert_back_to_original_types: bool,
    pub conversion_errors: String,
    pub reload_data: bool,
    pub theme: String,
    pub key: Option<String>,
    /// Merged into `defaultColDef` when no grid options are given.
    pub default_column_parameters: IndexMap<String, Value>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            grid_options: None,
            height: 400,
            width: None,
            fit_columns_on_grid_load: false,
            update_mode: Selector::from("value_changed"),
            data_return_mode: Selector::from("as_input"),
            allow_unsafe_jscode: false,
            enable_enterprise_modules: false,
            license_key: None,
            try_to_convert_back_to_original_types: true,
            conversion_errors: String::from("coerce"),
            reload_data: false,
            theme: String::from("light"),
            key: None,
            default_column_parameters: IndexMap::new(),
        }
    }
}

/// Render options after validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedModes {
    pub theme: Theme,
    pub update_mode: GridUpdateMode,
    pub data_return_mode: DataReturnMode,
    pub conversion_errors: ConversionErrors,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid_options(mut self, grid_options: Value) -> Self {
        self.grid_options = Some(grid_options);
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_update_mode(mut self, mode: impl Into<Selector<GridUpdateMode>>) -> Self {
        self.update_mode = mode.into();
        self
    }

    pub fn with_data_return_mode(mut self, mode: impl Into<Selector<DataReturnMode>>) -> Self {
        self.data_return_mode = mode.into();
        self
    }

    pub fn with_conversion_errors(mut self, policy: impl Into<String>) -> Self {
        self.conversion_errors = policy.into();
        self
    }

    pub fn with_convert_types(mut self, convert: bool) -> Self {
        self.try_to_convert_back_to_original_types = convert;
        self
    }

    pub fn with_unsafe_jscode(mut self, allow: bool) -> Self {
        self.allow_unsafe_jscode = allow;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_default_column_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.default_column_parameters.insert(name.into(), value);
        self
    }

    /// Resolves every closed-set option, failing on the first invalid one.
    pub fn validate(&self) -> Result<ResolvedModes> {
        Ok(ResolvedModes {
            theme: self.theme.parse()?,
            data_return_mode: self.data_return_mode.resolve()?,
            update_mode: self.update_mode.resolve()?,
            conversion_errors: self.conversion_errors.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_listed_theme_is_accepted() {
        for name in Theme::NAMES {
            assert!(name.parse::<Theme>().is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn unknown_theme_names_the_valid_set() {
        let err = "neon".parse::<Theme>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("neon"));
        assert!(message.contains("material"));
    }

    #[test]
    fn update_mode_resolves_case_insensitively() {
        let selector: Selector<GridUpdateMode> = "value_changed".into();
        assert_eq!(selector.resolve().unwrap(), GridUpdateMode::VALUE_CHANGED);

        let selector: Selector<GridUpdateMode> = "Selection_Changed".into();
        assert_eq!(selector.resolve().unwrap(), GridUpdateMode::SELECTION_CHANGED);

        let selector: Selector<GridUpdateMode> = "bogus".into();
        assert!(matches!(selector.resolve(), Err(GridError::InvalidOption { option: "update_mode", .. })));
    }

    #[test]
    fn update_mode_flags_combine() {
        let mode = GridUpdateMode::VALUE_CHANGED | GridUpdateMode::SELECTION_CHANGED;
        assert_eq!(mode.bits(), 0b110);
        assert!(GridUpdateMode::MODEL_CHANGED.contains(mode));
        assert_eq!("value_changed|selection_changed".parse::<GridUpdateMode>().unwrap(), mode);
        assert_eq!(mode.to_string(), "VALUE_CHANGED|SELECTION_CHANGED");
        assert_eq!(GridUpdateMode::MODEL_CHANGED.to_string(), "MODEL_CHANGED");
    }

    #[test]
    fn typed_selector_passes_through() {
        let selector: Selector<DataReturnMode> = DataReturnMode::FilteredAndSorted.into();
        assert_eq!(selector.resolve().unwrap(), DataReturnMode::FilteredAndSorted);
        let selector: Selector<DataReturnMode> = "filtered".into();
        assert_eq!(selector.resolve().unwrap(), DataReturnMode::Filtered);
    }

    #[test]
    fn modes_serialize_as_codes() {
        assert_eq!(serde_json::to_value(GridUpdateMode::MODEL_CHANGED).unwrap(), json!(30));
        assert_eq!(serde_json::to_value(DataReturnMode::Filtered).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(Theme::Material).unwrap(), json!("material"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: RenderOptions = serde_json::from_value(json!({
            "theme": "dark",
            "update_mode": 6,
            "data_return_mode": "filtered_and_sorted",
        }))
        .unwrap();

        assert_eq!(options.height, 400);
        let modes = options.validate().unwrap();
        assert_eq!(modes.theme, Theme::Dark);
        assert_eq!(modes.update_mode, GridUpdateMode::VALUE_CHANGED | GridUpdateMode::SELECTION_CHANGED);
        assert_eq!(modes.data_return_mode, DataReturnMode::FilteredAndSorted);
        assert_eq!(modes.conversion_errors, ConversionErrors::Coerce);
    }

    #[test]
    fn conversion_policy_is_validated() {
        let options = RenderOptions::new().with_conversion_errors("explode");
        assert!(matches!(
            options.validate(),
            Err(GridError::InvalidOption { option: "conversion_errors", .. })
        ));
    }
}
