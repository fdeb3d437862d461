//! Undoable commands over items and collections.
//!
//! # Responsibility
//! - `CommandHistory` runs commands and keeps the undo/redo stacks.
//! - `SaveState` captures before/after snapshots for in-place undo.
//! - Concrete commands implement new/edit/delete, clipboard, drag-and-drop
//!   and toggle operations.
//!
//! # Invariants
//! - Every do/undo/redo pass delivers one coalesced event.
//!
//! # See also
//! - `crate::model::snapshot` for the snapshot contract.

pub mod clipboard;
pub mod drag_and_drop;
pub mod history;
pub mod item_commands;
pub mod save_state;
pub mod toggle;

pub use clipboard::{Clipboard, ClipboardContents, CopyCommand, CutCommand, PasteCommand};
pub use drag_and_drop::DragAndDropCommand;
pub use history::{Command, CommandError, CommandHistory, CommandResult};
pub use item_commands::{DeleteCommand, Edit, EditCommand, NewItemCommand, NewSubItemCommand};
pub use save_state::SaveState;
pub use toggle::{ToggleCategoryCommand, ToggleCompletionCommand};

use crate::event::Event;
use crate::model::item::Item;
use crate::model::task::Task;

/// Items of `items` that have no ancestor in `items`, in input order.
pub(crate) fn top_level(items: &[Item]) -> Vec<Item> {
    let mut result: Vec<Item> = Vec::new();
    for item in items {
        if result.contains(item) {
            continue;
        }
        if item.ancestors().iter().any(|ancestor| items.contains(ancestor)) {
            continue;
        }
        result.push(item.clone());
    }
    result
}

/// `item` and its ancestors: the items re-opened when something is added
/// below `item`.
pub(crate) fn completion_chain(item: &Item) -> Vec<Item> {
    let mut chain = item.ancestors();
    chain.push(item.clone());
    chain
}

/// Re-opens every completed task in `item`'s completion chain.
pub(crate) fn reopen_chain_in(item: &Item, event: &mut Event) {
    for task in completion_chain(item)
        .into_iter()
        .filter_map(|link| Task::try_from(link).ok())
    {
        if task.completed() {
            task.set_completion_date_time_in(None, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::top_level;
    use crate::model::item::{Item, ItemKind};

    #[test]
    fn top_level_drops_selected_descendants() {
        let grandchild = Item::builder(ItemKind::Note).build();
        let child = Item::builder(ItemKind::Note).children([grandchild.clone()]).build();
        let root = Item::builder(ItemKind::Note).children([child.clone()]).build();
        let other = Item::builder(ItemKind::Note).build();

        let selection = [grandchild, other.clone(), root.clone(), child];
        assert_eq!(top_level(&selection), vec![other, root]);
    }
}
