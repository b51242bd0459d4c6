//! Type tags and the owned value union shared by the item API.

use std::fmt;

use serde_json::Value;

/// The closed set of types a configuration item can hold.
///
/// The tag is fixed at construction from the item's default value and
/// never changes. It drives (de)serialization and the type checks of the
/// path-query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigType {
    /// `true` / `false`, encoded as a JSON boolean.
    Boolean,
    /// Signed integer with inclusive bounds, encoded as a JSON number.
    Integer,
    /// Floating-point number with inclusive bounds, encoded as a JSON number.
    Double,
    /// UTF-8 string, encoded as a JSON string.
    String,
    /// One label out of a fixed variant list, encoded as a JSON string.
    Enum,
    /// A composite node aggregating child items, encoded as a JSON object.
    Group,
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigType::Boolean => "boolean",
            ConfigType::Integer => "integer",
            ConfigType::Double => "double",
            ConfigType::String => "string",
            ConfigType::Enum => "enum",
            ConfigType::Group => "group",
        };
        f.write_str(name)
    }
}

/// Owned scalar value passed in and out of the typed get/set API.
///
/// `Enum` carries the variant label, not an index.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    /// Boolean payload.
    Boolean(bool),
    /// Integer payload.
    Integer(i64),
    /// Floating-point payload.
    Double(f64),
    /// String payload.
    String(String),
    /// Enum variant label.
    Enum(String),
}

impl ItemValue {
    /// The type tag this value matches.
    pub fn config_type(&self) -> ConfigType {
        match self {
            ItemValue::Boolean(_) => ConfigType::Boolean,
            ItemValue::Integer(_) => ConfigType::Integer,
            ItemValue::Double(_) => ConfigType::Double,
            ItemValue::String(_) => ConfigType::String,
            ItemValue::Enum(_) => ConfigType::Enum,
        }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Boolean(v) => write!(f, "{v}"),
            ItemValue::Integer(v) => write!(f, "{v}"),
            ItemValue::Double(v) => write!(f, "{v}"),
            ItemValue::String(v) => f.write_str(v),
            ItemValue::Enum(v) => f.write_str(v),
        }
    }
}

/// Short JSON shape name used in type-mismatch messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
