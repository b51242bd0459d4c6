//! Error types for configuration tree operations.

use thiserror::Error;

/// Errors surfaced by path resolution, value mutation, and JSON parsing.
///
/// Interactive operations ([`crate::Config::get_value`],
/// [`crate::Config::set_value`], item updates) return these to the caller.
/// Bulk load/save catches them at the [`crate::Config`] boundary and
/// degrades to defaults/no-op instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A JSON element or a caller-supplied value does not match the
    /// declared type of the addressed item.
    #[error("type mismatch at `{path}`: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Dot-separated path of the offending item.
        path: String,
        /// The type the item holds (or the caller asked for).
        expected: String,
        /// The type that was actually supplied (or found).
        actual: String,
    },

    /// A path segment resolved to no child, or an enum label matched no
    /// variant.
    #[error("no item at `{path}`")]
    NotFound {
        /// Dot-separated path (or `path#label` for enum labels).
        path: String,
    },

    /// An array index or incoming array length exceeds the fixed
    /// allocated length.
    #[error("index {index} out of bounds at `{path}` (length {len})")]
    OutOfBounds {
        /// Dot-separated path of the array item.
        path: String,
        /// The offending index (or incoming length).
        index: usize,
        /// The allocated length.
        len: usize,
    },

    /// Filesystem failure during load or save.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON in the backing file.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;
