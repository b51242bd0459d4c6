//! Composite group nodes and the entry sum type.

use std::fmt;

use serde_json::{Map, Value};

use crate::{
    data::{
        array::ArrayItem,
        item::Item,
        types::{ConfigType, json_type_name},
    },
    error::ConfigError,
};

/// One child of a group: a scalar/enum leaf, an array, or a nested group.
///
/// This closed union replaces runtime type inspection: every operation
/// dispatches on the variant chosen at construction.
#[derive(Debug, Clone)]
pub enum ConfigEntry {
    /// Scalar or enum leaf.
    Item(Item),
    /// Fixed-length homogeneous array.
    Array(ArrayItem),
    /// Nested group.
    Group(Group),
}

impl ConfigEntry {
    /// Entry name, unique among siblings.
    pub fn name(&self) -> &str {
        match self {
            ConfigEntry::Item(item) => item.name(),
            ConfigEntry::Array(array) => array.name(),
            ConfigEntry::Group(group) => group.name(),
        }
    }

    /// Human-readable details or translation key.
    pub fn details(&self) -> &str {
        match self {
            ConfigEntry::Item(item) => item.details(),
            ConfigEntry::Array(array) => array.details(),
            ConfigEntry::Group(group) => group.details(),
        }
    }

    /// Type tag of the entry: the held type for leaves, the element type
    /// for arrays, [`ConfigType::Group`] for groups.
    pub fn item_type(&self) -> ConfigType {
        match self {
            ConfigEntry::Item(item) => item.item_type(),
            ConfigEntry::Array(array) => array.element_type(),
            ConfigEntry::Group(_) => ConfigType::Group,
        }
    }

    /// Whether `expected` matches this entry's type tag.
    pub fn is_valid_type(&self, expected: ConfigType) -> bool {
        self.item_type() == expected
    }

    /// Whether the entry (and, for groups, every descendant) holds its
    /// default.
    pub fn at_default_value(&self) -> bool {
        match self {
            ConfigEntry::Item(item) => item.at_default_value(),
            ConfigEntry::Array(array) => array.at_default_value(),
            ConfigEntry::Group(group) => {
                group.entries().iter().all(ConfigEntry::at_default_value)
            }
        }
    }

    /// Serialize the entry into its JSON representation.
    pub fn as_json(&self) -> Value {
        match self {
            ConfigEntry::Item(item) => item.as_json(),
            ConfigEntry::Array(array) => array.as_json(),
            ConfigEntry::Group(group) => group.as_json(),
        }
    }

    /// Parse a JSON value into the entry. `path` is for error messages.
    pub fn update_from_value(&mut self, value: &Value, path: &str) -> Result<(), ConfigError> {
        match self {
            ConfigEntry::Item(item) => item.update_from_value(value, path),
            ConfigEntry::Array(array) => array.update_from_value(value, path),
            ConfigEntry::Group(group) => group.update_from_value(value, path),
        }
    }
}

impl fmt::Display for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigEntry::Item(item) => item.fmt(f),
            ConfigEntry::Array(array) => array.fmt(f),
            ConfigEntry::Group(group) => group.fmt(f),
        }
    }
}

impl From<Item> for ConfigEntry {
    fn from(item: Item) -> Self {
        ConfigEntry::Item(item)
    }
}

impl From<ArrayItem> for ConfigEntry {
    fn from(array: ArrayItem) -> Self {
        ConfigEntry::Array(array)
    }
}

impl From<Group> for ConfigEntry {
    fn from(group: Group) -> Self {
        ConfigEntry::Group(group)
    }
}

/// Composite configuration node holding an ordered list of child entries.
///
/// Declaration order is preserved through serialization; a group has no
/// value of its own beyond its children's aggregate state.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    details: String,
    entries: Vec<ConfigEntry>,
}

impl Group {
    /// Create a group from its ordered children.
    ///
    /// # Panics
    ///
    /// Panics when two direct children share a name; that is a
    /// schema-construction programmer error.
    pub fn new(name: &str, entries: Vec<ConfigEntry>) -> Self {
        Self::with_details(name, "", entries)
    }

    /// Like [`Group::new`] with a details/translation key.
    pub fn with_details(name: &str, details: &str, entries: Vec<ConfigEntry>) -> Self {
        for (i, entry) in entries.iter().enumerate() {
            let duplicate = entries[..i].iter().any(|e| e.name() == entry.name());
            assert!(
                !duplicate,
                "group `{name}`: duplicate child name `{}`",
                entry.name()
            );
        }
        Self {
            name: name.to_string(),
            details: details.to_string(),
            entries,
        }
    }

    /// Group name, unique among siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable details or translation key.
    pub fn details(&self) -> &str {
        &self.details
    }

    /// The ordered child list, read-only.
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Find a direct child by name.
    pub fn get(&self, name: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Find a direct child by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ConfigEntry> {
        self.entries.iter_mut().find(|e| e.name() == name)
    }

    /// Apply a JSON object to the group's children.
    ///
    /// Each key delegates to the child with the matching name. Unknown
    /// keys are ignored so old files keep loading after items are
    /// removed; missing keys leave children at their current values.
    pub fn update_from_value(&mut self, value: &Value, path: &str) -> Result<(), ConfigError> {
        let object = match value {
            Value::Object(object) => object,
            _ => {
                return Err(ConfigError::TypeMismatch {
                    path: path.to_string(),
                    expected: "object".to_string(),
                    actual: json_type_name(value).to_string(),
                });
            }
        };
        for (key, element) in object {
            if let Some(child) = self.get_mut(key) {
                let child_path = format!("{path}.{key}");
                child.update_from_value(element, &child_path)?;
            }
        }
        Ok(())
    }

    /// Serialize children into a JSON object in declaration order.
    pub fn as_json(&self) -> Value {
        let mut object = Map::new();
        for entry in &self.entries {
            object.insert(entry.name().to_string(), entry.as_json());
        }
        Value::Object(object)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self.entries.iter().map(|e| e.to_string()).collect();
        write!(f, "{}: [{}]", self.name, children.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::ItemValue;
    use serde_json::json;

    fn sample_group() -> Group {
        Group::new(
            "group",
            vec![
                Item::integer("count", 3, "").into(),
                Item::boolean("enabled", true, "").into(),
                Group::new(
                    "nested",
                    vec![Item::string("label", "Default", "").into()],
                )
                .into(),
            ],
        )
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut group = sample_group();
        group
            .update_from_value(&json!({"count": 7, "stale_key": "whatever"}), "group")
            .unwrap();
        let ConfigEntry::Item(count) = group.get("count").unwrap() else {
            panic!("count should be a leaf");
        };
        assert_eq!(count.value(), ItemValue::Integer(7));
        let ConfigEntry::Item(enabled) = group.get("enabled").unwrap() else {
            panic!("enabled should be a leaf");
        };
        assert_eq!(enabled.value(), ItemValue::Boolean(true));
    }

    #[test]
    fn missing_keys_keep_current_values() {
        let mut group = sample_group();
        group
            .update_from_value(&json!({"count": 5}), "group")
            .unwrap();
        group.update_from_value(&json!({}), "group").unwrap();
        let ConfigEntry::Item(count) = group.get("count").unwrap() else {
            panic!("count should be a leaf");
        };
        // Still 5, not reset to the default 3.
        assert_eq!(count.value(), ItemValue::Integer(5));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let mut group = sample_group();
        let err = group.update_from_value(&json!([1, 2]), "group").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn serialization_keeps_declaration_order() {
        let json = sample_group().as_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["count", "enabled", "nested"]);
    }

    #[test]
    fn nested_groups_recurse() {
        let mut group = sample_group();
        group
            .update_from_value(&json!({"nested": {"label": "other"}}), "group")
            .unwrap();
        let ConfigEntry::Group(nested) = group.get("nested").unwrap() else {
            panic!("nested should be a group");
        };
        let ConfigEntry::Item(label) = nested.get("label").unwrap() else {
            panic!("label should be a leaf");
        };
        assert_eq!(label.value(), ItemValue::String("other".into()));
        assert!(!group.get("nested").unwrap().at_default_value());
    }

    #[test]
    fn display_lists_children() {
        let group = Group::new(
            "g",
            vec![
                Item::integer("a", 1, "").into(),
                Item::boolean("b", false, "").into(),
            ],
        );
        assert_eq!(group.to_string(), "g: [a:1, b:false]");
    }

    #[test]
    #[should_panic(expected = "duplicate child name")]
    fn duplicate_child_names_are_rejected() {
        let _ = Group::new(
            "g",
            vec![
                Item::integer("same", 1, "").into(),
                Item::boolean("same", true, "").into(),
            ],
        );
    }
}
