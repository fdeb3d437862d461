//! Snapshot-based undo state shared by the concrete commands.
//!
//! # Invariants
//! - Old snapshots are captured when the command is built, before `do`.
//! - New snapshots are captured on the first undo, right before the old
//!   state is restored.
//! - Each restore pass sends one coalesced event.

use crate::event::Event;
use crate::model::item::Item;
use crate::model::snapshot::ItemSnapshot;

/// Before/after snapshots of the items a command touches.
#[derive(Debug, Clone, Default)]
pub struct SaveState {
    items: Vec<Item>,
    old: Vec<ItemSnapshot>,
    new: Vec<ItemSnapshot>,
}

impl SaveState {
    /// Captures the current state of `items`, skipping duplicates.
    pub fn capture(items: impl IntoIterator<Item = Item>) -> Self {
        let mut unique: Vec<Item> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        let old = unique.iter().map(Item::snapshot_for_restore).collect();
        Self {
            items: unique,
            old,
            new: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn undo_states(&mut self) {
        Event::batch(|event| self.undo_states_in(event))
    }

    pub fn undo_states_in(&mut self, event: &mut Event) {
        self.new = self.items.iter().map(Item::snapshot_for_restore).collect();
        restore_all_in(&self.items, &self.old, event);
    }

    pub fn redo_states(&self) {
        Event::batch(|event| self.redo_states_in(event))
    }

    pub fn redo_states_in(&self, event: &mut Event) {
        restore_all_in(&self.items, &self.new, event);
    }
}

fn restore_all_in(items: &[Item], snapshots: &[ItemSnapshot], event: &mut Event) {
    for (item, snapshot) in items.iter().zip(snapshots) {
        item.restore_in(snapshot, event);
    }
}

#[cfg(test)]
mod tests {
    use super::SaveState;
    use crate::model::item::{Item, ItemKind};

    #[test]
    fn undo_then_redo_round_trips_state() {
        let note = Item::builder(ItemKind::Note).subject("before").build();
        let mut state = SaveState::capture([note.clone(), note.clone()]);
        assert_eq!(state.items().len(), 1);

        note.set_subject("after");
        state.undo_states();
        assert_eq!(note.subject(false), "before");
        state.redo_states();
        assert_eq!(note.subject(false), "after");
    }
}
