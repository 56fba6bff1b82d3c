//! Column reorder engine

use crate::error::{ReorderError, Result};
use crate::plan::{OrderAssignment, ReorderPlan};
use crate::types::{ColumnKey, DropTarget, Item, ItemId, KeySpacing, Snapshot};
use tracing::debug;

/// Column and insertion index a drop resolves to
#[derive(Debug)]
struct Resolved {
    column: ColumnKey,
    /// `None` appends to the end of the column
    index: Option<usize>,
}

/// Computes reorder plans from drag gestures
///
/// The whole destination column is renumbered on every move instead of
/// bisecting between neighbours, so keys never run out of precision and never
/// depend on wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReorderEngine {
    spacing: KeySpacing,
}

impl ReorderEngine {
    /// Create an engine with a validated key spacing
    pub fn new(spacing: KeySpacing) -> Result<Self> {
        spacing.validate()?;
        Ok(Self { spacing })
    }

    pub fn spacing(&self) -> KeySpacing {
        self.spacing
    }

    /// Plan the move of `dragged` onto `target`
    pub fn plan(
        &self,
        snapshot: &Snapshot,
        dragged: &ItemId,
        target: &DropTarget,
    ) -> Result<ReorderPlan> {
        let item = snapshot
            .find_item(dragged)
            .ok_or_else(|| ReorderError::not_found(dragged.as_str()))?;
        let resolved = resolve(snapshot, target)?;

        let column_items = snapshot.column_items(&resolved.column);
        let current_index = column_items.iter().position(|i| i.id == item.id);

        let mut order: Vec<&Item> = column_items
            .into_iter()
            .filter(|i| i.id != item.id)
            .collect();
        let target_index = resolved.index.unwrap_or(order.len()).min(order.len());

        if item.column == resolved.column && current_index == Some(target_index) {
            debug!(item = %item.id, index = target_index, "drop on current position, nothing to do");
            return Ok(ReorderPlan::empty(item, target_index));
        }

        order.insert(target_index, item);

        let mut assignments = Vec::new();
        for (index, member) in order.iter().enumerate() {
            let order_key = self.spacing.key_at(index)?;
            if member.id == item.id || member.order_key != order_key {
                assignments.push(OrderAssignment {
                    item_id: member.id.clone(),
                    order_key,
                });
            }
        }

        debug!(
            item = %item.id,
            from = %item.column,
            to = %resolved.column,
            index = target_index,
            writes = assignments.len(),
            "planned reorder"
        );

        Ok(ReorderPlan {
            item_id: item.id.clone(),
            from_column: item.column.clone(),
            to_column: resolved.column,
            target_index,
            assignments,
        })
    }
}

/// Plan a move with the default key spacing
pub fn plan_move(snapshot: &Snapshot, dragged: &ItemId, target: &DropTarget) -> Result<ReorderPlan> {
    ReorderEngine::default().plan(snapshot, dragged, target)
}

fn resolve(snapshot: &Snapshot, target: &DropTarget) -> Result<Resolved> {
    match target {
        DropTarget::Column(column) => resolve_column(snapshot, column),
        DropTarget::Item(id) => resolve_item(snapshot, id),
        DropTarget::Unqualified(raw) => {
            let id = ItemId::from(raw.as_str());
            if snapshot.find_item(&id).is_some() {
                return resolve_item(snapshot, &id);
            }
            resolve_column(snapshot, &ColumnKey::from(raw.as_str()))
                .map_err(|_| ReorderError::invalid_target(raw.as_str()))
        }
    }
}

fn resolve_column(snapshot: &Snapshot, column: &ColumnKey) -> Result<Resolved> {
    if !snapshot.has_column(column) {
        return Err(ReorderError::invalid_target(format!("column:{column}")));
    }
    Ok(Resolved {
        column: column.clone(),
        index: None,
    })
}

fn resolve_item(snapshot: &Snapshot, id: &ItemId) -> Result<Resolved> {
    let anchor = snapshot
        .find_item(id)
        .ok_or_else(|| ReorderError::invalid_target(format!("item:{id}")))?;
    let index = snapshot
        .column_items(&anchor.column)
        .iter()
        .position(|i| &i.id == id);
    Ok(Resolved {
        column: anchor.column.clone(),
        index,
    })
}
