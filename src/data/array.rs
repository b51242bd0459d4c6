//! Fixed-length homogeneous array items.

use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::{
    data::types::{ConfigType, ItemValue, json_type_name},
    error::ConfigError,
};

/// Change callback fired after every successful store into the array.
pub type OnArrayChange = Arc<dyn Fn(&mut ArrayKind) + Send + Sync>;

/// Array configuration item: an index-addressed sequence of one scalar or
/// enum element type.
///
/// The length is fixed at construction from the default sequence. Nesting
/// arrays inside arrays is unrepresentable here: the element storage has
/// no array variant.
#[derive(Clone)]
pub struct ArrayItem {
    name: String,
    details: String,
    kind: ArrayKind,
    on_change: Option<OnArrayChange>,
}

/// Element storage for array items, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayKind {
    /// Boolean elements.
    Boolean {
        /// Current values.
        values: Vec<bool>,
        /// Default values; the length of the array is `defaults.len()`.
        defaults: Vec<bool>,
    },
    /// Integer elements.
    Integer {
        /// Current values.
        values: Vec<i64>,
        /// Default values.
        defaults: Vec<i64>,
    },
    /// Floating-point elements.
    Double {
        /// Current values.
        values: Vec<f64>,
        /// Default values.
        defaults: Vec<f64>,
    },
    /// String elements.
    String {
        /// Current values.
        values: Vec<String>,
        /// Default values.
        defaults: Vec<String>,
    },
    /// Enum elements selecting by index into a shared label list.
    Enum {
        /// Variant labels shared by every slot.
        variants: Vec<String>,
        /// Selected indices per slot.
        values: Vec<usize>,
        /// Default indices per slot.
        defaults: Vec<usize>,
    },
}

impl ArrayKind {
    fn len(&self) -> usize {
        match self {
            ArrayKind::Boolean { defaults, .. } => defaults.len(),
            ArrayKind::Integer { defaults, .. } => defaults.len(),
            ArrayKind::Double { defaults, .. } => defaults.len(),
            ArrayKind::String { defaults, .. } => defaults.len(),
            ArrayKind::Enum { defaults, .. } => defaults.len(),
        }
    }
}

impl ArrayItem {
    fn new(name: &str, details: &str, kind: ArrayKind) -> Self {
        assert!(
            kind.len() > 0,
            "array item `{name}` needs a non-empty default sequence"
        );
        Self {
            name: name.to_string(),
            details: details.to_string(),
            kind,
            on_change: None,
        }
    }

    /// Create a boolean array item.
    pub fn booleans(name: &str, defaults: &[bool], details: &str) -> Self {
        Self::new(
            name,
            details,
            ArrayKind::Boolean {
                values: defaults.to_vec(),
                defaults: defaults.to_vec(),
            },
        )
    }

    /// Create an integer array item.
    pub fn integers(name: &str, defaults: &[i64], details: &str) -> Self {
        Self::new(
            name,
            details,
            ArrayKind::Integer {
                values: defaults.to_vec(),
                defaults: defaults.to_vec(),
            },
        )
    }

    /// Create a floating-point array item.
    pub fn doubles(name: &str, defaults: &[f64], details: &str) -> Self {
        Self::new(
            name,
            details,
            ArrayKind::Double {
                values: defaults.to_vec(),
                defaults: defaults.to_vec(),
            },
        )
    }

    /// Create a string array item.
    pub fn strings(name: &str, defaults: &[&str], details: &str) -> Self {
        let defaults: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
        Self::new(
            name,
            details,
            ArrayKind::String {
                values: defaults.clone(),
                defaults,
            },
        )
    }

    /// Create an enum array item; every slot shares `variants`.
    ///
    /// # Panics
    ///
    /// Panics when `variants` is empty or any default label is not a
    /// variant.
    pub fn enumerations(name: &str, variants: &[&str], defaults: &[&str], details: &str) -> Self {
        assert!(
            !variants.is_empty(),
            "enum array item `{name}` needs at least one variant"
        );
        let indices: Vec<usize> = defaults
            .iter()
            .map(|d| {
                variants.iter().position(|v| v == d).unwrap_or_else(|| {
                    panic!("enum array item `{name}`: default `{d}` is not a variant")
                })
            })
            .collect();
        Self::new(
            name,
            details,
            ArrayKind::Enum {
                variants: variants.iter().map(|v| v.to_string()).collect(),
                values: indices.clone(),
                defaults: indices,
            },
        )
    }

    /// Attach a change callback, builder style.
    pub fn with_on_change(mut self, f: impl Fn(&mut ArrayKind) + Send + Sync + 'static) -> Self {
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

    /// The fixed number of slots.
    pub fn len(&self) -> usize {
        self.kind.len()
    }

    /// Whether the array has no slots; never true, lengths are at least 1.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element type tag.
    pub fn element_type(&self) -> ConfigType {
        match &self.kind {
            ArrayKind::Boolean { .. } => ConfigType::Boolean,
            ArrayKind::Integer { .. } => ConfigType::Integer,
            ArrayKind::Double { .. } => ConfigType::Double,
            ArrayKind::String { .. } => ConfigType::String,
            ArrayKind::Enum { .. } => ConfigType::Enum,
        }
    }

    /// Whether `expected` matches the element type.
    pub fn is_valid_type(&self, expected: ConfigType) -> bool {
        self.element_type() == expected
    }

    fn check_index(&self, index: usize) -> Result<(), ConfigError> {
        if index >= self.len() {
            return Err(ConfigError::OutOfBounds {
                path: self.name.clone(),
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Current value of slot `index`.
    pub fn value_at(&self, index: usize) -> Result<ItemValue, ConfigError> {
        self.check_index(index)?;
        Ok(match &self.kind {
            ArrayKind::Boolean { values, .. } => ItemValue::Boolean(values[index]),
            ArrayKind::Integer { values, .. } => ItemValue::Integer(values[index]),
            ArrayKind::Double { values, .. } => ItemValue::Double(values[index]),
            ArrayKind::String { values, .. } => ItemValue::String(values[index].clone()),
            ArrayKind::Enum {
                variants, values, ..
            } => ItemValue::Enum(variants[values[index]].clone()),
        })
    }

    /// Default value of slot `index`.
    pub fn default_at(&self, index: usize) -> Result<ItemValue, ConfigError> {
        self.check_index(index)?;
        Ok(match &self.kind {
            ArrayKind::Boolean { defaults, .. } => ItemValue::Boolean(defaults[index]),
            ArrayKind::Integer { defaults, .. } => ItemValue::Integer(defaults[index]),
            ArrayKind::Double { defaults, .. } => ItemValue::Double(defaults[index]),
            ArrayKind::String { defaults, .. } => ItemValue::String(defaults[index].clone()),
            ArrayKind::Enum {
                variants, defaults, ..
            } => ItemValue::Enum(variants[defaults[index]].clone()),
        })
    }

    /// Replace the value of slot `index`, then fire the change callback.
    pub fn set_value_at(&mut self, new: ItemValue, index: usize) -> Result<(), ConfigError> {
        self.check_index(index)?;
        let held = self.element_type();
        match (&mut self.kind, &new) {
            (ArrayKind::Boolean { values, .. }, ItemValue::Boolean(v)) => values[index] = *v,
            (ArrayKind::Integer { values, .. }, ItemValue::Integer(v)) => values[index] = *v,
            (ArrayKind::Double { values, .. }, ItemValue::Double(v)) => values[index] = *v,
            (ArrayKind::String { values, .. }, ItemValue::String(v)) => {
                values[index] = v.clone();
            }
            (
                ArrayKind::Enum {
                    variants, values, ..
                },
                ItemValue::Enum(label),
            ) => match variants.iter().position(|v| v == label) {
                Some(idx) => values[index] = idx,
                None => {
                    return Err(ConfigError::NotFound {
                        path: format!("{}#{label}", self.name),
                    });
                }
            },
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

    /// Whether every slot still holds its default.
    pub fn at_default_value(&self) -> bool {
        match &self.kind {
            ArrayKind::Boolean { values, defaults } => values == defaults,
            ArrayKind::Integer { values, defaults } => values == defaults,
            ArrayKind::Double { values, defaults } => values == defaults,
            ArrayKind::String { values, defaults } => values == defaults,
            ArrayKind::Enum {
                values, defaults, ..
            } => values == defaults,
        }
    }

    /// Parse a JSON array into the item.
    ///
    /// An incoming array longer than the allocated length fails with
    /// [`ConfigError::OutOfBounds`] before anything is written. A shorter
    /// array overwrites only the leading slots. The change callback fires
    /// once after a successful apply.
    pub fn update_from_value(&mut self, value: &Value, path: &str) -> Result<(), ConfigError> {
        let incoming = match value {
            Value::Array(arr) => arr,
            _ => {
                return Err(ConfigError::TypeMismatch {
                    path: path.to_string(),
                    expected: "array".to_string(),
                    actual: json_type_name(value).to_string(),
                });
            }
        };
        if incoming.len() > self.len() {
            return Err(ConfigError::OutOfBounds {
                path: path.to_string(),
                index: incoming.len(),
                len: self.len(),
            });
        }
        // Parse every element before touching storage so a bad element
        // leaves the array unchanged.
        let parsed = incoming
            .iter()
            .map(|el| self.parse_element(el, path))
            .collect::<Result<Vec<_>, _>>()?;
        match &mut self.kind {
            ArrayKind::Boolean { values, .. } => {
                for (slot, v) in values.iter_mut().zip(&parsed) {
                    if let Element::Boolean(b) = v {
                        *slot = *b;
                    }
                }
            }
            ArrayKind::Integer { values, .. } => {
                for (slot, v) in values.iter_mut().zip(&parsed) {
                    if let Element::Integer(i) = v {
                        *slot = *i;
                    }
                }
            }
            ArrayKind::Double { values, .. } => {
                for (slot, v) in values.iter_mut().zip(&parsed) {
                    if let Element::Double(d) = v {
                        *slot = *d;
                    }
                }
            }
            ArrayKind::String { values, .. } => {
                for (slot, v) in values.iter_mut().zip(&parsed) {
                    if let Element::String(s) = v {
                        *slot = s.clone();
                    }
                }
            }
            ArrayKind::Enum { values, .. } => {
                for (slot, v) in values.iter_mut().zip(&parsed) {
                    if let Element::EnumIndex(idx) = v {
                        *slot = *idx;
                    }
                }
            }
        }
        self.changed();
        Ok(())
    }

    fn parse_element(&self, el: &Value, path: &str) -> Result<Element, ConfigError> {
        let mismatch = |expected: &str| ConfigError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: json_type_name(el).to_string(),
        };
        Ok(match &self.kind {
            ArrayKind::Boolean { .. } => match el {
                Value::Bool(b) => Element::Boolean(*b),
                _ => return Err(mismatch("boolean")),
            },
            ArrayKind::Integer { .. } => match el.as_i64() {
                Some(i) => Element::Integer(i),
                None => return Err(mismatch("integer")),
            },
            ArrayKind::Double { .. } => match el.as_f64() {
                Some(f) => Element::Double(f),
                None => return Err(mismatch("double")),
            },
            ArrayKind::String { .. } => match el {
                Value::String(s) => Element::String(s.clone()),
                _ => return Err(mismatch("string")),
            },
            ArrayKind::Enum { variants, .. } => match el {
                Value::String(s) => match variants.iter().position(|v| v == s) {
                    Some(idx) => Element::EnumIndex(idx),
                    None => {
                        return Err(ConfigError::NotFound {
                            path: format!("{path}#{s}"),
                        });
                    }
                },
                _ => return Err(mismatch("enum label")),
            },
        })
    }

    /// Serialize the whole sequence into a JSON array.
    pub fn as_json(&self) -> Value {
        let elements: Vec<Value> = match &self.kind {
            ArrayKind::Boolean { values, .. } => values.iter().map(|v| Value::Bool(*v)).collect(),
            ArrayKind::Integer { values, .. } => {
                values.iter().map(|v| Value::Number((*v).into())).collect()
            }
            ArrayKind::Double { values, .. } => values
                .iter()
                .map(|v| {
                    Value::Number(serde_json::Number::from_f64(*v).unwrap_or_else(|| 0.into()))
                })
                .collect(),
            ArrayKind::String { values, .. } => {
                values.iter().map(|v| Value::String(v.clone())).collect()
            }
            ArrayKind::Enum {
                variants, values, ..
            } => values
                .iter()
                .map(|idx| Value::String(variants[*idx].clone()))
                .collect(),
        };
        Value::Array(elements)
    }

    /// All current values joined with `,` for command output.
    pub fn value_string(&self) -> String {
        (0..self.len())
            .map(|i| self.value_at(i).map(|v| v.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_default()
            .join(",")
    }

    fn changed(&mut self) {
        if let Some(cb) = self.on_change.clone() {
            cb(&mut self.kind);
        }
    }
}

/// Parsed JSON array element, kept untyped until the bulk write.
enum Element {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    EnumIndex(usize),
}

impl fmt::Display for ArrayItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:[{}]", self.name, self.value_string())
    }
}

impl fmt::Debug for ArrayItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayItem")
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
    fn indexed_set_and_serialize() {
        let mut arr = ArrayItem::integers("ints", &[1, 2, 3], "");
        arr.set_value_at(ItemValue::Integer(9), 1).unwrap();
        assert_eq!(arr.as_json(), json!([1, 9, 3]));
        assert_eq!(arr.value_string(), "1,9,3");
        assert!(!arr.at_default_value());
    }

    #[test]
    fn update_from_json_overwrites_leading_slots() {
        let mut arr = ArrayItem::integers("ints", &[1, 2, 3], "");
        arr.update_from_value(&json!([5, 6, 7]), "ints").unwrap();
        assert_eq!(arr.value_at(2).unwrap(), ItemValue::Integer(7));

        // Shorter input leaves the tail untouched.
        arr.update_from_value(&json!([0]), "ints").unwrap();
        assert_eq!(arr.value_at(0).unwrap(), ItemValue::Integer(0));
        assert_eq!(arr.value_at(1).unwrap(), ItemValue::Integer(6));
    }

    #[test]
    fn longer_input_is_a_bounds_violation() {
        let mut arr = ArrayItem::integers("ints", &[1, 2, 3], "");
        let err = arr.update_from_value(&json!([1, 2, 3, 4]), "ints").unwrap_err();
        match err {
            ConfigError::OutOfBounds { index, len, .. } => {
                assert_eq!(index, 4);
                assert_eq!(len, 3);
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
        // Nothing was written.
        assert!(arr.at_default_value());
    }

    #[test]
    fn index_out_of_range_fails() {
        let mut arr = ArrayItem::booleans("flags", &[true, false], "");
        assert!(matches!(
            arr.value_at(2),
            Err(ConfigError::OutOfBounds { .. })
        ));
        assert!(matches!(
            arr.set_value_at(ItemValue::Boolean(true), 5),
            Err(ConfigError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn bad_element_leaves_array_unchanged() {
        let mut arr = ArrayItem::integers("ints", &[1, 2, 3], "");
        let err = arr.update_from_value(&json!([5, "six"]), "ints").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
        assert!(arr.at_default_value());
    }

    #[test]
    fn enum_array_round_trip() {
        let mut arr = ArrayItem::enumerations("modes", &["A", "B", "C"], &["A", "A"], "");
        arr.set_value_at(ItemValue::Enum("C".into()), 0).unwrap();
        assert_eq!(arr.as_json(), json!(["C", "A"]));

        let mut fresh = ArrayItem::enumerations("modes", &["A", "B", "C"], &["A", "A"], "");
        fresh.update_from_value(&arr.as_json(), "modes").unwrap();
        assert_eq!(fresh.value_at(0).unwrap(), ItemValue::Enum("C".into()));
    }

    #[test]
    fn callback_fires_on_indexed_store() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let mut arr = ArrayItem::integers("ints", &[1, 2, 3], "").with_on_change(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        arr.set_value_at(ItemValue::Integer(4), 0).unwrap();
        arr.update_from_value(&json!([7, 8]), "ints").unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[should_panic(expected = "non-empty default sequence")]
    fn empty_defaults_are_rejected() {
        let _ = ArrayItem::integers("ints", &[], "");
    }
}
