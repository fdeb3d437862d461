//! Reparenting by drag and drop.
//!
//! # Invariants
//! - An item cannot be dropped on itself, on one of its descendants, or on
//!   its direct parent.
//! - Dropping on no target makes the dragged items roots.
//! - Undo restores child order of both the old and the new parent.

use crate::command::history::Command;
use crate::command::save_state::SaveState;
use crate::command::{completion_chain, reopen_chain_in, top_level};
use crate::event::Event;
use crate::model::item::Item;

#[derive(Debug)]
pub struct DragAndDropCommand {
    items: Vec<Item>,
    target: Option<Item>,
    save_state: SaveState,
}

impl DragAndDropCommand {
    pub fn new(items: &[Item], target: Option<&Item>) -> Self {
        let items = top_level(items);
        let old_parents: Vec<Item> = items.iter().filter_map(Item::parent).collect();
        let target_chain = target.map(completion_chain).unwrap_or_default();
        let affected: Vec<Item> = items
            .iter()
            .cloned()
            .chain(old_parents)
            .chain(target_chain)
            .collect();
        let save_state = SaveState::capture(affected);
        Self {
            items,
            target: target.cloned(),
            save_state,
        }
    }

    fn is_valid_drop(&self, item: &Item) -> bool {
        match &self.target {
            None => true,
            Some(target) => {
                target != item
                    && target.kind() == item.kind()
                    && !item.children(true).contains(target)
                    && item.parent().as_ref() != Some(target)
            }
        }
    }
}

impl Command for DragAndDropCommand {
    fn name(&self) -> &str {
        "Drag and drop"
    }

    fn can_do(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| self.is_valid_drop(item))
    }

    fn do_command(&mut self) {
        Event::batch(|event| {
            for item in &self.items {
                if let Some(parent) = item.parent() {
                    parent.remove_child_in(item, event);
                }
                match &self.target {
                    Some(target) => {
                        target.add_child_in(item, event);
                    }
                    None => item.set_parent(None),
                }
            }
            if let Some(target) = &self.target {
                reopen_chain_in(target, event);
            }
        });
    }

    fn undo_command(&mut self) {
        self.save_state.undo_states();
    }

    fn redo_command(&mut self) {
        self.save_state.redo_states();
    }
}
