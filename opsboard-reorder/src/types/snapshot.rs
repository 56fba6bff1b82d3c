//! Point-in-time view of a board

use super::ids::{ColumnKey, ItemId};
use super::item::Item;
use crate::error::{ReorderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// All columns and items of a board as fetched from the store
///
/// `columns` lists the declared workflow stages in display order. Declaring
/// a column is what makes an empty column a valid drop target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub columns: Vec<ColumnKey>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Snapshot {
    /// Create a snapshot from declared columns and items
    pub fn new(columns: impl IntoIterator<Item = ColumnKey>, items: Vec<Item>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            items,
        }
    }

    /// Find an item by id
    pub fn find_item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Find an item by id for mutation
    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// A column is known if it is declared or any item sits in it
    pub fn has_column(&self, column: &ColumnKey) -> bool {
        self.columns.contains(column) || self.items.iter().any(|item| &item.column == column)
    }

    /// Declared columns followed by undeclared ones in order of first appearance
    pub fn known_columns(&self) -> Vec<ColumnKey> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .chain(self.items.iter().map(|item| &item.column))
            .filter(|column| seen.insert(*column))
            .cloned()
            .collect()
    }

    /// Items of a column in display order (order key, then id)
    pub fn column_items(&self, column: &ColumnKey) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| &item.column == column)
            .collect();
        items.sort_by(|a, b| a.order_key.cmp(&b.order_key).then_with(|| a.id.cmp(&b.id)));
        items
    }

    /// Reject snapshots that contain the same id twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(&item.id) {
                return Err(ReorderError::DuplicateItem {
                    id: item.id.to_string(),
                });
            }
        }
        Ok(())
    }
}
