//! # cfgtree
//!
//! A typed, hierarchical configuration tree with JSON persistence.
//!
//! `cfgtree` models an application's settings as a tree of typed items:
//! scalar leaves (boolean, integer, double, string, enum), fixed-length
//! arrays, and nested groups. The tree carries its own defaults and
//! bounds, serializes losslessly to one JSON file, and resolves
//! dot-separated paths to individual leaves for reading and mutation at
//! runtime.
//!
//! ## Features
//!
//! - Closed set of value types, dispatched without runtime type inspection
//! - Defaults and silent clamping bounds for numeric items
//! - Synchronous change callbacks per item
//! - Forward-compatible loading: unknown keys are ignored, missing keys
//!   keep their values
//! - Best-effort persistence: a broken or missing config file never
//!   aborts host startup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cfgtree::{Config, ConfigType, Group, Item, ItemValue};
//!
//! // The schema is built once at startup and owned by the host.
//! let general = Group::new(
//!     "general",
//!     vec![
//!         Item::boolean("enabled", true, "Enable the feature").into(),
//!         Item::integer_bounded("level", 3, "Verbosity level", 0, 10).into(),
//!     ],
//! );
//! let mut config = Config::new(vec![general], "settings.json", "myapp");
//!
//! // First run bootstraps the file with defaults.
//! config.read_config_from_file();
//!
//! let enabled = config
//!     .get_value("general.enabled", ConfigType::Boolean)
//!     .unwrap();
//! assert_eq!(enabled, ItemValue::Boolean(true));
//!
//! // Mutation is explicit, and so is persistence.
//! config.set_value("general.level", ItemValue::Integer(8)).unwrap();
//! config.save_config_to_file();
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Configuration tree data structures and serialization
//! - [`error`] - Error taxonomy for path, type, and I/O failures

/// Configuration tree data structures and JSON serialization.
pub mod data;

/// Error types for configuration tree operations.
pub mod error;

pub use data::{
    ArrayItem, ArrayKind, Config, ConfigEntry, ConfigType, EnumItem, Group, Item, ItemKind,
    ItemValue, OnArrayChange, OnChange,
};
pub use error::ConfigError;
pub use serde_json::Value;
