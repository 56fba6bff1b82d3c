//! Property-based tests for column reordering
//!
//! Boards are generated with random columns and keys, including duplicate and
//! negative keys, then random drag gestures are planned and applied.

use opsboard_reorder::{plan_move, ColumnKey, DropTarget, Item, ItemId, ReorderError, Snapshot};
use proptest::prelude::*;

const COLUMNS: [&str; 3] = ["pending", "in_progress", "done"];

/// Generate a board of up to 12 items with unique ids
fn board() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec((0..COLUMNS.len(), -5i64..5), 1..12).prop_map(|cells| {
        let items = cells
            .into_iter()
            .enumerate()
            .map(|(i, (column, key))| Item::new(format!("t{i}"), COLUMNS[column], key))
            .collect();
        Snapshot::new(COLUMNS.iter().map(|c| ColumnKey::from(*c)), items)
    })
}

/// Generate a board together with a dragged item and a drop target
fn gesture() -> impl Strategy<Value = (Snapshot, ItemId, DropTarget)> {
    board().prop_flat_map(|snapshot| {
        let len = snapshot.items.len();
        (Just(snapshot), 0..len, 0..len, 0..COLUMNS.len(), any::<bool>()).prop_map(
            |(snapshot, dragged, anchor, column, onto_item)| {
                let dragged = snapshot.items[dragged].id.clone();
                let target = if onto_item {
                    DropTarget::Item(snapshot.items[anchor].id.clone())
                } else {
                    DropTarget::column(COLUMNS[column])
                };
                (snapshot, dragged, target)
            },
        )
    })
}

fn ids_in(snapshot: &Snapshot, column: &ColumnKey) -> Vec<ItemId> {
    snapshot
        .column_items(column)
        .iter()
        .map(|item| item.id.clone())
        .collect()
}

proptest! {
    /// Property: the destination column ends up strictly increasing
    #[test]
    fn prop_destination_strictly_increasing((snapshot, dragged, target) in gesture()) {
        let plan = plan_move(&snapshot, &dragged, &target).unwrap();
        let mut applied = snapshot.clone();
        plan.apply_to(&mut applied).unwrap();

        if !plan.is_empty() {
            let keys: Vec<_> = applied
                .column_items(&plan.to_column)
                .iter()
                .map(|item| item.order_key)
                .collect();
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys: {:?}", keys);
        }
    }

    /// Property: the dragged item lands in the planned column at the planned index
    #[test]
    fn prop_dragged_item_lands_at_target((snapshot, dragged, target) in gesture()) {
        let plan = plan_move(&snapshot, &dragged, &target).unwrap();
        let mut applied = snapshot.clone();
        plan.apply_to(&mut applied).unwrap();

        let ids = ids_in(&applied, &plan.to_column);
        prop_assert_eq!(ids.get(plan.target_index), Some(&dragged));
    }

    /// Property: other items keep their relative order in every column
    #[test]
    fn prop_relative_order_preserved((snapshot, dragged, target) in gesture()) {
        let plan = plan_move(&snapshot, &dragged, &target).unwrap();
        let mut applied = snapshot.clone();
        plan.apply_to(&mut applied).unwrap();

        for column in snapshot.known_columns() {
            let before: Vec<_> = ids_in(&snapshot, &column)
                .into_iter()
                .filter(|id| id != &dragged)
                .collect();
            let after: Vec<_> = ids_in(&applied, &column)
                .into_iter()
                .filter(|id| id != &dragged)
                .collect();
            prop_assert_eq!(before, after);
        }
    }

    /// Property: applying a plan a second time changes nothing
    #[test]
    fn prop_apply_is_idempotent((snapshot, dragged, target) in gesture()) {
        let plan = plan_move(&snapshot, &dragged, &target).unwrap();
        let mut once = snapshot.clone();
        plan.apply_to(&mut once).unwrap();
        let mut twice = once.clone();
        plan.apply_to(&mut twice).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property: replaying a gesture on the board it produced settles
    ///
    /// A column drop is already satisfied. A drop onto another item leaves the
    /// dragged item next to that item, and replaying it only flips the pair.
    #[test]
    fn prop_replaying_gesture_settles((snapshot, dragged, target) in gesture()) {
        let plan = plan_move(&snapshot, &dragged, &target).unwrap();
        let mut applied = snapshot.clone();
        plan.apply_to(&mut applied).unwrap();

        let again = plan_move(&applied, &dragged, &target).unwrap();
        prop_assert_eq!(&again.to_column, &plan.to_column);

        match &target {
            DropTarget::Item(anchor) if anchor != &dragged => {
                let ids = ids_in(&applied, &plan.to_column);
                let at = |id: &ItemId| ids.iter().position(|i| i == id).unwrap();
                prop_assert_eq!(at(anchor).abs_diff(at(&dragged)), 1, "ids: {:?}", ids);

                let mut replayed = applied.clone();
                again.apply_to(&mut replayed).unwrap();
                let mut expected = ids.clone();
                let (i, j) = (at(anchor), at(&dragged));
                expected.swap(i, j);
                prop_assert_eq!(ids_in(&replayed, &plan.to_column), expected);
            }
            _ => prop_assert!(again.is_empty(), "replayed plan: {:?}", again),
        }
    }

    /// Property: unknown dragged ids never produce a plan
    #[test]
    fn prop_unknown_item_not_found(snapshot in board()) {
        let result = plan_move(&snapshot, &"missing".into(), &DropTarget::column("done"));
        prop_assert_eq!(result, Err(ReorderError::not_found("missing")));
    }
}
