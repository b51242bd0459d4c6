//! Scalar and enum leaf configuration items.

use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::{
    data::types::{ConfigType, ItemValue, json_type_name},
    error::ConfigError,
};

/// Change callback fired synchronously after every successful store.
///
/// The callback receives the value storage directly and may rewrite it to
/// implement derived state. It cannot re-enter [`Item::set_value`], so no
/// recursion guard is needed.
pub type OnChange = Arc<dyn Fn(&mut ItemKind) + Send + Sync>;

/// Leaf configuration item with a concrete value type.
#[derive(Clone)]
pub struct Item {
    name: String,
    details: String,
    kind: ItemKind,
    on_change: Option<OnChange>,
}

/// Value storage for leaf items, one variant per supported type.
///
/// Each variant keeps the current value next to its default. Numeric
/// variants carry inclusive bounds; every store clamps silently.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// Boolean value with default.
    Boolean {
        /// Current value.
        value: bool,
        /// Default value.
        default: bool,
    },
    /// Integer value with default and inclusive bounds.
    Integer {
        /// Current value.
        value: i64,
        /// Default value.
        default: i64,
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },
    /// Floating-point value with default and inclusive bounds.
    Double {
        /// Current value.
        value: f64,
        /// Default value.
        default: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
    /// String value with default.
    String {
        /// Current value.
        value: String,
        /// Default value.
        default: String,
    },
    /// Enum selection by index.
    Enum(EnumItem),
}

/// Enum variants and selected index.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumItem {
    /// List of variant labels.
    pub variants: Vec<String>,
    /// Selected variant index.
    pub value: usize,
    /// Default variant index.
    pub default: usize,
}

impl EnumItem {
    /// The currently selected label.
    pub fn value_str(&self) -> &str {
        &self.variants[self.value]
    }

    /// The default label.
    pub fn default_str(&self) -> &str {
        &self.variants[self.default]
    }

    /// Select the variant matching `label`, case-sensitive exact match.
    pub fn select(&mut self, label: &str, path: &str) -> Result<(), ConfigError> {
        match self.variants.iter().position(|v| v == label) {
            Some(idx) => {
                self.value = idx;
                Ok(())
            }
            None => Err(ConfigError::NotFound {
                path: format!("{path}#{label}"),
            }),
        }
    }
}

impl Item {
    fn new(name: &str, details: &str, kind: ItemKind) -> Self {
        Self {
            name: name.to_string(),
            details: details.to_string(),
            kind,
            on_change: None,
        }
    }

    /// Create a boolean item.
    pub fn boolean(name: &str, default: bool, details: &str) -> Self {
        Self::new(
            name,
            details,
            ItemKind::Boolean {
                value: default,
                default,
            },
        )
    }

    /// Create an integer item covering the full `i64` range.
    pub fn integer(name: &str, default: i64, details: &str) -> Self {
        Self::integer_bounded(name, default, details, i64::MIN, i64::MAX)
    }

    /// Create an integer item clamped to `[min, max]` (inclusive).
    pub fn integer_bounded(name: &str, default: i64, details: &str, min: i64, max: i64) -> Self {
        Self::new(
            name,
            details,
            ItemKind::Integer {
                value: default,
                default,
                min,
                max,
            },
        )
    }

    /// Create a floating-point item covering the full `f64` range.
    pub fn double(name: &str, default: f64, details: &str) -> Self {
        Self::double_bounded(name, default, details, f64::MIN, f64::MAX)
    }

    /// Create a floating-point item clamped to `[min, max]` (inclusive).
    pub fn double_bounded(name: &str, default: f64, details: &str, min: f64, max: f64) -> Self {
        Self::new(
            name,
            details,
            ItemKind::Double {
                value: default,
                default,
                min,
                max,
            },
        )
    }

    /// Create a string item.
    pub fn string(name: &str, default: &str, details: &str) -> Self {
        Self::new(
            name,
            details,
            ItemKind::String {
                value: default.to_string(),
                default: default.to_string(),
            },
        )
    }

    /// Create an enum item selecting `default` out of `variants`.
    ///
    /// # Panics
    ///
    /// Panics when `variants` is empty or `default` is not one of them.
    /// Both are schema-construction programmer errors.
    pub fn enumeration(name: &str, variants: &[&str], default: &str, details: &str) -> Self {
        assert!(
            !variants.is_empty(),
            "enum item `{name}` needs at least one variant"
        );
        let default_idx = variants
            .iter()
            .position(|v| *v == default)
            .unwrap_or_else(|| panic!("enum item `{name}`: default `{default}` is not a variant"));
        Self::new(
            name,
            details,
            ItemKind::Enum(EnumItem {
                variants: variants.iter().map(|v| v.to_string()).collect(),
                value: default_idx,
                default: default_idx,
            }),
        )
    }

    /// Attach a change callback, builder style.
    pub fn with_on_change(mut self, f: impl Fn(&mut ItemKind) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Item name, unique among siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable details or translation key, opaque to the core.
    pub fn details(&self) -> &str {
        &self.details
    }

    /// The type tag fixed at construction.
    pub fn item_type(&self) -> ConfigType {
        match &self.kind {
            ItemKind::Boolean { .. } => ConfigType::Boolean,
            ItemKind::Integer { .. } => ConfigType::Integer,
            ItemKind::Double { .. } => ConfigType::Double,
            ItemKind::String { .. } => ConfigType::String,
            ItemKind::Enum(_) => ConfigType::Enum,
        }
    }

    /// Whether `expected` matches this item's held type.
    pub fn is_valid_type(&self, expected: ConfigType) -> bool {
        self.item_type() == expected
    }

    /// Current value as an owned [`ItemValue`].
    pub fn value(&self) -> ItemValue {
        match &self.kind {
            ItemKind::Boolean { value, .. } => ItemValue::Boolean(*value),
            ItemKind::Integer { value, .. } => ItemValue::Integer(*value),
            ItemKind::Double { value, .. } => ItemValue::Double(*value),
            ItemKind::String { value, .. } => ItemValue::String(value.clone()),
            ItemKind::Enum(e) => ItemValue::Enum(e.value_str().to_string()),
        }
    }

    /// Default value as an owned [`ItemValue`].
    pub fn default_value(&self) -> ItemValue {
        match &self.kind {
            ItemKind::Boolean { default, .. } => ItemValue::Boolean(*default),
            ItemKind::Integer { default, .. } => ItemValue::Integer(*default),
            ItemKind::Double { default, .. } => ItemValue::Double(*default),
            ItemKind::String { default, .. } => ItemValue::String(default.clone()),
            ItemKind::Enum(e) => ItemValue::Enum(e.default_str().to_string()),
        }
    }

    /// Whether the current value equals the default.
    pub fn at_default_value(&self) -> bool {
        match &self.kind {
            ItemKind::Boolean { value, default } => value == default,
            ItemKind::Integer { value, default, .. } => value == default,
            ItemKind::Double { value, default, .. } => value == default,
            ItemKind::String { value, default } => value == default,
            ItemKind::Enum(e) => e.value == e.default,
        }
    }

    /// Replace the current value.
    ///
    /// Numeric payloads clamp to the item's bounds before storing. The
    /// change callback fires after the store. Fails with
    /// [`ConfigError::TypeMismatch`] when the payload variant does not
    /// match the item's type, and [`ConfigError::NotFound`] when an enum
    /// label matches no variant.
    pub fn set_value(&mut self, new: ItemValue) -> Result<(), ConfigError> {
        let held = self.item_type();
        match (&mut self.kind, &new) {
            (ItemKind::Boolean { value, .. }, ItemValue::Boolean(v)) => *value = *v,
            (ItemKind::Integer {
                value, min, max, ..
            }, ItemValue::Integer(v)) => *value = (*v).clamp(*min, *max),
            (ItemKind::Double {
                value, min, max, ..
            }, ItemValue::Double(v)) => *value = (*v).clamp(*min, *max),
            (ItemKind::String { value, .. }, ItemValue::String(v)) => *value = v.clone(),
            (ItemKind::Enum(e), ItemValue::Enum(label)) => e.select(label, &self.name)?,
            _ => {
                return Err(ConfigError::TypeMismatch {
                    path: self.name.clone(),
                    expected: held.to_string(),
                    actual: new.config_type().to_string(),
                });
            }
        }
        self.changed();
        Ok(())
    }

    /// Parse a single JSON value into the item according to its type.
    ///
    /// Same clamping and callback semantics as [`Item::set_value`].
    /// `path` is used in error messages only.
    pub fn update_from_value(&mut self, value: &Value, path: &str) -> Result<(), ConfigError> {
        let mismatch = |expected: &str| ConfigError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: json_type_name(value).to_string(),
        };
        match &mut self.kind {
            ItemKind::Boolean { value: current, .. } => match value {
                Value::Bool(b) => *current = *b,
                _ => return Err(mismatch("boolean")),
            },
            ItemKind::Integer {
                value: current,
                min,
                max,
                ..
            } => match value.as_i64() {
                Some(i) => *current = i.clamp(*min, *max),
                None => return Err(mismatch("integer")),
            },
            ItemKind::Double {
                value: current,
                min,
                max,
                ..
            } => match value.as_f64() {
                Some(f) => *current = f.clamp(*min, *max),
                None => return Err(mismatch("double")),
            },
            ItemKind::String { value: current, .. } => match value {
                Value::String(s) => *current = s.clone(),
                _ => return Err(mismatch("string")),
            },
            ItemKind::Enum(e) => match value {
                Value::String(s) => e.select(s, path)?,
                _ => return Err(mismatch("enum label")),
            },
        }
        self.changed();
        Ok(())
    }

    /// Serialize the current value into its JSON representation.
    pub fn as_json(&self) -> Value {
        match &self.kind {
            ItemKind::Boolean { value, .. } => Value::Bool(*value),
            ItemKind::Integer { value, .. } => Value::Number((*value).into()),
            ItemKind::Double { value, .. } => Value::Number(
                serde_json::Number::from_f64(*value).unwrap_or_else(|| 0.into()),
            ),
            ItemKind::String { value, .. } => Value::String(value.clone()),
            ItemKind::Enum(e) => Value::String(e.value_str().to_string()),
        }
    }

    /// Current value rendered for command output.
    pub fn value_string(&self) -> String {
        self.value().to_string()
    }

    /// Default value rendered for command output.
    pub fn default_string(&self) -> String {
        self.default_value().to_string()
    }

    fn changed(&mut self) {
        if let Some(cb) = self.on_change.clone() {
            cb(&mut self.kind);
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value())
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn getters_are_correct() {
        let item = Item::integer("name", 10, "details");
        assert_eq!(item.name(), "name");
        assert_eq!(item.details(), "details");
        assert_eq!(item.default_value(), ItemValue::Integer(10));
        assert_eq!(item.to_string(), "name:10");
        assert!(item.at_default_value());
        assert!(item.is_valid_type(ConfigType::Integer));
        assert!(!item.is_valid_type(ConfigType::String));
    }

    #[test]
    fn setting_value_fires_callback() {
        // The callback halves whatever was stored.
        let mut item = Item::integer("name", 10, "details").with_on_change(|kind| {
            if let ItemKind::Integer { value, .. } = kind {
                *value /= 2;
            }
        });
        item.set_value(ItemValue::Integer(20)).unwrap();
        assert_eq!(item.value(), ItemValue::Integer(10));
    }

    #[test]
    fn set_value_clamps_to_bounds() {
        let mut item = Item::integer_bounded("n", 5, "", 0, 10);
        item.set_value(ItemValue::Integer(42)).unwrap();
        assert_eq!(item.value(), ItemValue::Integer(10));
        item.set_value(ItemValue::Integer(-3)).unwrap();
        assert_eq!(item.value(), ItemValue::Integer(0));

        let mut item = Item::double_bounded("d", 0.5, "", 0.0, 1.0);
        item.set_value(ItemValue::Double(2.5)).unwrap();
        assert_eq!(item.value(), ItemValue::Double(1.0));
        item.set_value(ItemValue::Double(-0.5)).unwrap();
        assert_eq!(item.value(), ItemValue::Double(0.0));
    }

    #[test]
    fn set_value_rejects_wrong_variant() {
        let mut item = Item::boolean("flag", true, "");
        let err = item.set_value(ItemValue::Integer(1)).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
        assert_eq!(item.value(), ItemValue::Boolean(true));
    }

    #[test]
    fn read_from_json() {
        let mut item = Item::integer("name", 0, "details");
        item.update_from_value(&json!(10), "name").unwrap();
        assert_eq!(item.value(), ItemValue::Integer(10));
        assert!(!item.at_default_value());
    }

    #[test]
    fn json_round_trip_per_type() {
        let mut b = Item::boolean("b", true, "");
        b.set_value(ItemValue::Boolean(false)).unwrap();
        let mut b2 = Item::boolean("b", true, "");
        b2.update_from_value(&b.as_json(), "b").unwrap();
        assert_eq!(b2.value(), ItemValue::Boolean(false));

        let mut i = Item::integer("i", 0, "");
        i.set_value(ItemValue::Integer(-7)).unwrap();
        let mut i2 = Item::integer("i", 0, "");
        i2.update_from_value(&i.as_json(), "i").unwrap();
        assert_eq!(i2.value(), ItemValue::Integer(-7));

        let mut d = Item::double("d", 0.0, "");
        d.set_value(ItemValue::Double(2.25)).unwrap();
        let mut d2 = Item::double("d", 0.0, "");
        d2.update_from_value(&d.as_json(), "d").unwrap();
        assert_eq!(d2.value(), ItemValue::Double(2.25));

        let mut s = Item::string("s", "Default", "");
        s.set_value(ItemValue::String("other".into())).unwrap();
        let mut s2 = Item::string("s", "Default", "");
        s2.update_from_value(&s.as_json(), "s").unwrap();
        assert_eq!(s2.value(), ItemValue::String("other".into()));

        let mut e = Item::enumeration("e", &["A", "B"], "B", "");
        e.set_value(ItemValue::Enum("A".into())).unwrap();
        let mut e2 = Item::enumeration("e", &["A", "B"], "B", "");
        e2.update_from_value(&e.as_json(), "e").unwrap();
        assert_eq!(e2.value(), ItemValue::Enum("A".into()));
    }

    #[test]
    fn enum_label_is_case_sensitive() {
        let mut item = Item::enumeration("e", &["A", "B"], "A", "");
        let err = item.update_from_value(&json!("a"), "e").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        // Non-string JSON is a shape error, not a lookup failure.
        let err = item.update_from_value(&json!(0), "e").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
        assert_eq!(item.value(), ItemValue::Enum("A".into()));
    }

    #[test]
    fn json_shape_mismatch_reports_both_types() {
        let mut item = Item::boolean("flag", false, "");
        match item.update_from_value(&json!("yes"), "top.flag") {
            Err(ConfigError::TypeMismatch {
                path,
                expected,
                actual,
            }) => {
                assert_eq!(path, "top.flag");
                assert_eq!(expected, "boolean");
                assert_eq!(actual, "string");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "is not a variant")]
    fn enum_default_must_be_a_variant() {
        let _ = Item::enumeration("e", &["A", "B"], "C", "");
    }
}
