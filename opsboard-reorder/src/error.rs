//! Error types for the reorder engine

use thiserror::Error;

/// Result type for reorder operations
pub type Result<T> = std::result::Result<T, ReorderError>;

/// Errors raised before a plan is produced
///
/// None of these leave partial state behind: the engine is pure, so an error
/// simply means the gesture is aborted and no writes are attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// Dragged item is not part of the snapshot
    #[error("item not found: {id}")]
    NotFound { id: String },

    /// Drop target names neither a known column nor a known item
    #[error("invalid drop target: {target}")]
    InvalidTarget { target: String },

    /// Key spacing cannot produce strictly increasing keys
    #[error("invalid key spacing: unit must be positive, got {unit}")]
    InvalidSpacing { unit: i64 },

    /// Assigning a key at this index would overflow the key space
    #[error("order key space exhausted at index {index}")]
    KeySpaceExhausted { index: usize },

    /// Snapshot contains the same item id more than once
    #[error("duplicate item ID in snapshot: {id}")]
    DuplicateItem { id: String },
}

impl ReorderError {
    /// Create a not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an invalid target error
    pub fn invalid_target(target: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
        }
    }
}
