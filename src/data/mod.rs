//! Configuration data structures and JSON (de)serialization.
//!
//! This module provides the core data model for the configuration tree:
//!
//! - Typed leaf items with defaults, bounds, and change callbacks
//! - Fixed-length homogeneous arrays
//! - Ordered groups composing leaves, arrays, and nested groups
//! - The persistence root with dotted-path lookup and load/save
//!
//! ## Architecture
//!
//! The data module is organized into several submodules:
//!
//! - [`config`] - Persistence root and path resolution
//! - [`group`] - Composite group nodes and the entry sum type
//! - [`item`] - Scalar and enum leaf items
//! - [`array`] - Fixed-length array items
//! - [`types`] - Type tags and the value union

/// Fixed-length array configuration items.
pub mod array;

/// Persistence root, load/save, and dotted-path lookup.
pub mod config;

/// Composite group nodes and the entry sum type.
pub mod group;

/// Scalar and enum leaf configuration items.
pub mod item;

/// Type tags and the owned value union.
pub mod types;

pub use array::{ArrayItem, ArrayKind, OnArrayChange};
pub use config::Config;
pub use group::{ConfigEntry, Group};
pub use item::{EnumItem, Item, ItemKind, OnChange};
pub use types::{ConfigType, ItemValue};
