//! Per-column mutation locks
//!
//! Gestures touching the same column run one after another; gestures on
//! disjoint columns proceed in parallel. Locks are always taken in sorted
//! column order so two cross-column moves cannot deadlock.

use dashmap::DashMap;
use opsboard_reorder::ColumnKey;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Table of one async mutex per column key
#[derive(Debug, Clone, Default)]
pub struct ColumnLocks {
    locks: Arc<DashMap<ColumnKey, Arc<Mutex<()>>>>,
}

impl ColumnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, column: &ColumnKey) -> Arc<Mutex<()>> {
        let entry = self
            .locks
            .entry(column.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Wait until every listed column is held by this caller
    pub async fn acquire(&self, columns: impl IntoIterator<Item = ColumnKey>) -> ColumnGuard {
        let mut columns: Vec<ColumnKey> = columns.into_iter().collect();
        columns.sort();
        columns.dedup();

        let mut guards = Vec::with_capacity(columns.len());
        for column in &columns {
            guards.push(self.lock_for(column).lock_owned().await);
        }

        ColumnGuard {
            columns,
            _guards: guards,
        }
    }

    /// Number of columns that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds column locks until dropped
#[derive(Debug)]
pub struct ColumnGuard {
    columns: Vec<ColumnKey>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl ColumnGuard {
    /// Columns held, sorted
    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }
}
