//! Order keys for intra-column positioning.

use crate::error::{ReorderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering within a column. Smaller keys display first.
///
/// Keys are plain integer ranks assigned by the engine. They carry no time
/// semantics; modification timestamps live on [`Item::updated_at`](super::Item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(i64);

impl OrderKey {
    /// Create an order key from a raw rank
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw rank
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderKey {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Default first key of a freshly numbered column
pub const DEFAULT_KEY_BASE: i64 = 1024;
/// Default distance between neighbouring keys
pub const DEFAULT_KEY_UNIT: i64 = 1024;

/// How keys are laid out when a column is renumbered: `base + index * unit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySpacing {
    pub base: i64,
    pub unit: i64,
}

impl KeySpacing {
    /// Create a validated spacing
    pub fn new(base: i64, unit: i64) -> Result<Self> {
        let spacing = Self { base, unit };
        spacing.validate()?;
        Ok(spacing)
    }

    /// A non-positive unit would produce equal or decreasing keys
    pub fn validate(&self) -> Result<()> {
        if self.unit <= 0 {
            return Err(ReorderError::InvalidSpacing { unit: self.unit });
        }
        Ok(())
    }

    /// Key for the item at `index` in a renumbered column
    pub fn key_at(&self, index: usize) -> Result<OrderKey> {
        i64::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(self.unit))
            .and_then(|offset| offset.checked_add(self.base))
            .map(OrderKey)
            .ok_or(ReorderError::KeySpaceExhausted { index })
    }
}

impl Default for KeySpacing {
    fn default() -> Self {
        Self {
            base: DEFAULT_KEY_BASE,
            unit: DEFAULT_KEY_UNIT,
        }
    }
}
