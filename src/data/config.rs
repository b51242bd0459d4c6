//! The persistence root: owns the top-level groups and the backing file.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::{
    data::{
        group::{ConfigEntry, Group},
        types::{ConfigType, ItemValue},
    },
    error::ConfigError,
};

/// Root of a configuration tree.
///
/// Holds the ordered top-level groups (the static schema of the
/// application's settings), a stable identifier, and the backing file.
/// Built once by the host at startup; the group list never changes after
/// construction.
///
/// Load and save are best-effort: failures are logged and swallowed so a
/// broken config file never aborts host startup. Interactive reads and
/// writes through the dotted-path API surface their errors instead.
#[derive(Clone)]
pub struct Config {
    groups: Vec<Group>,
    file: PathBuf,
    id: String,
}

impl Config {
    /// Create a config rooted at `groups`, persisted to `file`.
    ///
    /// `id` is a stable identifier the host uses to namespace command
    /// roots and UI titles.
    ///
    /// # Panics
    ///
    /// Panics when two top-level groups share a name.
    pub fn new(groups: Vec<Group>, file: impl Into<PathBuf>, id: &str) -> Self {
        for (i, group) in groups.iter().enumerate() {
            let duplicate = groups[..i].iter().any(|g| g.name() == group.name());
            assert!(
                !duplicate,
                "config `{id}`: duplicate top-level group `{}`",
                group.name()
            );
        }
        Self {
            groups,
            file: file.into(),
            id: id.to_string(),
        }
    }

    /// The stable configuration identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The backing file path.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The ordered top-level groups, read-only.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Load the backing file into the tree.
    ///
    /// A missing file triggers a bootstrap save of the current (default)
    /// values instead. Any other failure is logged and swallowed; the
    /// in-memory values are kept.
    pub fn read_config_from_file(&mut self) {
        if !self.file.exists() {
            debug!(
                "config `{}`: `{}` does not exist, writing defaults",
                self.id,
                self.file.display()
            );
            self.save_config_to_file();
            return;
        }
        if let Err(err) = self.try_read() {
            warn!(
                "config `{}`: failed to read `{}`: {err:#}",
                self.id,
                self.file.display()
            );
        }
    }

    fn try_read(&mut self) -> anyhow::Result<()> {
        let content = fs::read_to_string(&self.file)?;
        let parsed: Value = serde_json::from_str(&content)?;
        let object = parsed
            .as_object()
            .context("top level is not a JSON object")?;
        for group in &mut self.groups {
            if let Some(element) = object.get(group.name()) {
                let path = group.name().to_string();
                group.update_from_value(element, &path)?;
            }
        }
        Ok(())
    }

    /// Serialize the tree and replace the backing file.
    ///
    /// The JSON object is written to a sibling temp file and renamed over
    /// the target, so the file is replaced whole or not at all. Failures
    /// are logged and swallowed; callers simply retry on the next save.
    pub fn save_config_to_file(&self) {
        if let Err(err) = self.try_save() {
            warn!(
                "config `{}`: failed to save `{}`: {err:#}",
                self.id,
                self.file.display()
            );
        }
    }

    fn try_save(&self) -> anyhow::Result<()> {
        let mut object = Map::new();
        for group in &self.groups {
            object.insert(group.name().to_string(), group.as_json());
        }
        let content = serde_json::to_string_pretty(&Value::Object(object))?;

        let tmp = self.file.with_extension("json.tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.file)
            .with_context(|| format!("failed to replace {}", self.file.display()))?;
        Ok(())
    }

    /// Resolve a dot-separated path to a leaf or array entry.
    ///
    /// The first segment names a top-level group, intermediate segments
    /// name nested groups, and the final segment names a leaf or array.
    /// A path stopping on a group is [`ConfigError::NotFound`], as is any
    /// segment with no matching child.
    pub fn entry(&self, path: &str) -> Result<&ConfigEntry, ConfigError> {
        let not_found = || ConfigError::NotFound {
            path: path.to_string(),
        };
        let mut segments = path.split('.').peekable();
        let first = segments.next().unwrap_or_default();
        let mut group = self
            .groups
            .iter()
            .find(|g| g.name() == first)
            .ok_or_else(not_found)?;
        loop {
            let segment = segments.next().ok_or_else(not_found)?;
            let entry = group.get(segment).ok_or_else(not_found)?;
            match entry {
                ConfigEntry::Group(nested) if segments.peek().is_some() => group = nested,
                ConfigEntry::Group(_) => return Err(not_found()),
                _ if segments.peek().is_some() => return Err(not_found()),
                _ => return Ok(entry),
            }
        }
    }

    /// Resolve a dot-separated path to a leaf or array entry, mutably.
    pub fn entry_mut(&mut self, path: &str) -> Result<&mut ConfigEntry, ConfigError> {
        let not_found = || ConfigError::NotFound {
            path: path.to_string(),
        };
        let mut segments = path.split('.').peekable();
        let first = segments.next().unwrap_or_default();
        let mut group = self
            .groups
            .iter_mut()
            .find(|g| g.name() == first)
            .ok_or_else(not_found)?;
        loop {
            let segment = segments.next().ok_or_else(not_found)?;
            if segments.peek().is_some() {
                match group.get_mut(segment).ok_or_else(not_found)? {
                    ConfigEntry::Group(nested) => group = nested,
                    _ => return Err(not_found()),
                }
            } else {
                match group.get_mut(segment).ok_or_else(not_found)? {
                    ConfigEntry::Group(_) => return Err(not_found()),
                    entry => return Ok(entry),
                }
            }
        }
    }

    /// Read the current value of the leaf at `path`, checking its type.
    ///
    /// Fails with [`ConfigError::TypeMismatch`] when the resolved leaf's
    /// tag differs from `expected`. Arrays are reached through
    /// [`Config::entry`] instead and report a mismatch here.
    pub fn get_value(&self, path: &str, expected: ConfigType) -> Result<ItemValue, ConfigError> {
        match self.entry(path)? {
            ConfigEntry::Item(item) => {
                if !item.is_valid_type(expected) {
                    return Err(ConfigError::TypeMismatch {
                        path: path.to_string(),
                        expected: expected.to_string(),
                        actual: item.item_type().to_string(),
                    });
                }
                Ok(item.value())
            }
            ConfigEntry::Array(array) => Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: expected.to_string(),
                actual: format!("{} array", array.element_type()),
            }),
            // Unreachable today: entry() never resolves to a group.
            ConfigEntry::Group(_) => Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: expected.to_string(),
                actual: ConfigType::Group.to_string(),
            }),
        }
    }

    /// Replace the value of the leaf at `path`.
    ///
    /// Mutation only; callers persist explicitly with
    /// [`Config::save_config_to_file`] when ready.
    pub fn set_value(&mut self, path: &str, value: ItemValue) -> Result<(), ConfigError> {
        match self.entry_mut(path)? {
            ConfigEntry::Item(item) => {
                item.set_value(value).map_err(|err| at_path(err, path))
            }
            other => Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: "scalar item".to_string(),
                actual: other.item_type().to_string(),
            }),
        }
    }

    /// Replace one slot of the array at `path`.
    pub fn set_value_at(
        &mut self,
        path: &str,
        value: ItemValue,
        index: usize,
    ) -> Result<(), ConfigError> {
        match self.entry_mut(path)? {
            ConfigEntry::Array(array) => array
                .set_value_at(value, index)
                .map_err(|err| at_path(err, path)),
            other => Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: "array item".to_string(),
                actual: other.item_type().to_string(),
            }),
        }
    }

    /// Visit every entry in the tree depth-first with its dotted path.
    ///
    /// This is the enumeration surface command and UI adapters build
    /// their listings from; nested group entries are visited before
    /// their children.
    pub fn for_each_entry<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&str, &'a ConfigEntry),
    {
        fn walk<'a, F>(prefix: &str, entries: &'a [ConfigEntry], visit: &mut F)
        where
            F: FnMut(&str, &'a ConfigEntry),
        {
            for entry in entries {
                let path = format!("{prefix}.{}", entry.name());
                visit(&path, entry);
                if let ConfigEntry::Group(group) = entry {
                    walk(&path, group.entries(), visit);
                }
            }
        }
        for group in &self.groups {
            walk(group.name(), group.entries(), &mut visit);
        }
    }
}

/// Rewrite an item-local error path into a full dotted path, keeping any
/// `#label` suffix from enum lookups.
fn at_path(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::TypeMismatch {
            expected, actual, ..
        } => ConfigError::TypeMismatch {
            path: path.to_string(),
            expected,
            actual,
        },
        ConfigError::NotFound { path: local } => {
            let label = local.split_once('#').map(|(_, label)| label);
            ConfigError::NotFound {
                path: match label {
                    Some(label) => format!("{path}#{label}"),
                    None => path.to_string(),
                },
            }
        }
        ConfigError::OutOfBounds { index, len, .. } => ConfigError::OutOfBounds {
            path: path.to_string(),
            index,
            len,
        },
        other => other,
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self.groups.iter().map(|g| g.to_string()).collect();
        write!(f, "{}: [{}]", self.id, groups.join(", "))
    }
}
