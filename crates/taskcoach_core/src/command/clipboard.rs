//! Clipboard and the cut/copy/paste commands.
//!
//! # Responsibility
//! - `Clipboard`: shared holder of items plus the collection they belong to.
//! - `CutCommand` moves items out of their collection onto the clipboard.
//! - `CopyCommand` puts fresh copies on the clipboard.
//! - `PasteCommand` takes the clipboard contents back into their collection,
//!   either as roots or below a target item.
//!
//! # Invariants
//! - `Clipboard::get` empties the clipboard.
//! - Cut items keep their ids; copied items carry fresh ids, so pasted items
//!   never duplicate an id already in the collection.
//! - Pasting below a completed task re-opens it and its completed ancestors.

use crate::collection::ItemCollection;
use crate::command::history::Command;
use crate::command::save_state::SaveState;
use crate::command::{completion_chain, reopen_chain_in, top_level};
use crate::event::Event;
use crate::model::item::Item;
use std::cell::RefCell;
use std::rc::Rc;

/// What the clipboard holds at one moment.
#[derive(Debug, Clone, Default)]
pub struct ClipboardContents {
    pub items: Vec<Item>,
    pub source: Option<ItemCollection>,
}

/// Shared clipboard handle; clones see the same contents.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    contents: Rc<RefCell<ClipboardContents>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, items: Vec<Item>, source: &ItemCollection) {
        self.set(ClipboardContents {
            items,
            source: Some(source.clone()),
        });
    }

    pub fn set(&self, contents: ClipboardContents) {
        *self.contents.borrow_mut() = contents;
    }

    /// Contents without clearing.
    pub fn peek(&self) -> ClipboardContents {
        self.contents.borrow().clone()
    }

    /// Contents, leaving the clipboard empty.
    pub fn get(&self) -> ClipboardContents {
        std::mem::take(&mut *self.contents.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.contents.borrow().items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contents.borrow().items.len()
    }

    pub fn clear(&self) {
        self.set(ClipboardContents::default());
    }
}

#[derive(Debug)]
pub struct CutCommand {
    collection: ItemCollection,
    items: Vec<Item>,
    clipboard: Clipboard,
    previous: ClipboardContents,
    save_state: SaveState,
}

impl CutCommand {
    pub fn new(collection: &ItemCollection, items: &[Item], clipboard: &Clipboard) -> Self {
        let items = top_level(items);
        let parents: Vec<Item> = items.iter().filter_map(Item::parent).collect();
        Self {
            collection: collection.clone(),
            items,
            clipboard: clipboard.clone(),
            previous: ClipboardContents::default(),
            save_state: SaveState::capture(parents),
        }
    }
}

impl Command for CutCommand {
    fn name(&self) -> &str {
        "Cut"
    }

    fn can_do(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| self.collection.contains(item))
    }

    fn do_command(&mut self) {
        self.previous = self.clipboard.peek();
        self.collection.remove_items(&self.items);
        self.clipboard.put(self.items.clone(), &self.collection);
    }

    fn undo_command(&mut self) {
        Event::batch(|event| {
            self.collection.extend_in(&self.items, event);
            self.save_state.undo_states_in(event);
        });
        self.clipboard.set(std::mem::take(&mut self.previous));
    }
}

#[derive(Debug)]
pub struct CopyCommand {
    collection: ItemCollection,
    items: Vec<Item>,
    clipboard: Clipboard,
    previous: ClipboardContents,
}

impl CopyCommand {
    pub fn new(collection: &ItemCollection, items: &[Item], clipboard: &Clipboard) -> Self {
        Self {
            collection: collection.clone(),
            items: top_level(items),
            clipboard: clipboard.clone(),
            previous: ClipboardContents::default(),
        }
    }
}

impl Command for CopyCommand {
    fn name(&self) -> &str {
        "Copy"
    }

    fn can_do(&self) -> bool {
        !self.items.is_empty()
    }

    fn do_command(&mut self) {
        self.previous = self.clipboard.peek();
        let copies = self.items.iter().map(Item::copy).collect();
        self.clipboard.put(copies, &self.collection);
    }

    fn undo_command(&mut self) {
        self.clipboard.set(std::mem::take(&mut self.previous));
    }
}

#[derive(Debug)]
pub struct PasteCommand {
    clipboard: Clipboard,
    target: Option<Item>,
    pasted: ClipboardContents,
    old_parents: Vec<Option<Item>>,
    save_state: SaveState,
}

impl PasteCommand {
    /// Pastes the clipboard contents as root items.
    pub fn new(clipboard: &Clipboard) -> Self {
        Self {
            clipboard: clipboard.clone(),
            target: None,
            pasted: ClipboardContents::default(),
            old_parents: Vec::new(),
            save_state: SaveState::default(),
        }
    }

    /// Pastes the clipboard contents as children of `target`.
    pub fn as_sub_item(clipboard: &Clipboard, target: &Item) -> Self {
        Self {
            target: Some(target.clone()),
            save_state: SaveState::capture(completion_chain(target)),
            ..Self::new(clipboard)
        }
    }

    pub fn pasted_items(&self) -> &[Item] {
        &self.pasted.items
    }

    fn paste(&self) {
        let Some(source) = self.pasted.source.clone() else {
            return;
        };
        Event::batch(|event| {
            for item in &self.pasted.items {
                item.set_parent(self.target.as_ref());
            }
            source.extend_in(&self.pasted.items, event);
            if let Some(target) = &self.target {
                reopen_chain_in(target, event);
            }
        });
    }
}

impl Command for PasteCommand {
    fn name(&self) -> &str {
        if self.target.is_some() {
            "Paste as subitem"
        } else {
            "Paste"
        }
    }

    fn can_do(&self) -> bool {
        let contents = self.clipboard.peek();
        let Some(source) = contents.source else {
            return false;
        };
        if contents.items.is_empty() {
            return false;
        }
        match &self.target {
            Some(target) => {
                source.contains(target)
                    && !contents.items.contains(target)
                    && contents.items.iter().all(|item| item.kind() == target.kind())
            }
            None => true,
        }
    }

    fn do_command(&mut self) {
        self.pasted = self.clipboard.get();
        self.old_parents = self.pasted.items.iter().map(Item::parent).collect();
        self.paste();
    }

    fn undo_command(&mut self) {
        let Some(source) = self.pasted.source.clone() else {
            return;
        };
        Event::batch(|event| {
            self.save_state.undo_states_in(event);
            source.remove_items_in(&self.pasted.items, event);
            for (item, parent) in self.pasted.items.iter().zip(&self.old_parents) {
                item.set_parent(parent.as_ref());
            }
        });
        self.clipboard.set(self.pasted.clone());
    }

    fn redo_command(&mut self) {
        if self.clipboard.peek().items == self.pasted.items {
            self.clipboard.clear();
        }
        self.paste();
    }
}

#[cfg(test)]
mod tests {
    use super::{Clipboard, CopyCommand, CutCommand, PasteCommand};
    use crate::collection::ItemCollection;
    use crate::command::history::Command;
    use crate::model::item::{Item, ItemKind};

    #[test]
    fn get_empties_the_clipboard() {
        let notes = ItemCollection::new(ItemKind::Note);
        let clipboard = Clipboard::new();
        clipboard.put(vec![Item::builder(ItemKind::Note).build()], &notes);
        assert_eq!(clipboard.len(), 1);
        assert_eq!(clipboard.get().items.len(), 1);
        assert!(clipboard.is_empty());
    }

    #[test]
    fn cut_then_paste_under_target_keeps_identity() {
        let notes = ItemCollection::new(ItemKind::Note);
        let moved = Item::builder(ItemKind::Note).subject("moved").build();
        let target = Item::builder(ItemKind::Note).subject("target").build();
        notes.extend(&[moved.clone(), target.clone()]);
        let clipboard = Clipboard::new();

        let mut cut = CutCommand::new(&notes, &[moved.clone()], &clipboard);
        cut.do_command();
        assert!(!notes.contains(&moved));

        let mut paste = PasteCommand::as_sub_item(&clipboard, &target);
        assert!(paste.can_do());
        paste.do_command();
        assert_eq!(paste.pasted_items(), &[moved.clone()]);
        assert!(notes.contains(&moved));
        assert_eq!(moved.parent(), Some(target.clone()));
        assert!(clipboard.is_empty());

        paste.undo_command();
        assert!(!notes.contains(&moved));
        assert!(!target.has_child(&moved));
        assert_eq!(clipboard.len(), 1);
    }

    #[test]
    fn copy_pastes_fresh_ids() {
        let notes = ItemCollection::new(ItemKind::Note);
        let original = Item::builder(ItemKind::Note).subject("original").build();
        notes.append(&original);
        let clipboard = Clipboard::new();

        CopyCommand::new(&notes, &[original.clone()], &clipboard).do_command();
        let mut paste = PasteCommand::new(&clipboard);
        paste.do_command();

        assert_eq!(notes.len(), 2);
        let pasted = &paste.pasted_items()[0];
        assert_ne!(pasted.id(), original.id());
        assert_eq!(pasted.subject(false), "original");
    }

    #[test]
    fn redo_pastes_the_items_of_the_first_paste() {
        let notes = ItemCollection::new(ItemKind::Note);
        let moved = Item::builder(ItemKind::Note).subject("moved").build();
        notes.append(&moved);
        let clipboard = Clipboard::new();
        CutCommand::new(&notes, &[moved.clone()], &clipboard).do_command();

        let mut paste = PasteCommand::new(&clipboard);
        paste.do_command();
        paste.undo_command();
        let other = Item::builder(ItemKind::Note).subject("other").build();
        clipboard.put(vec![other.clone()], &notes);

        paste.redo_command();
        assert!(notes.contains(&moved));
        assert!(!notes.contains(&other));
        assert_eq!(clipboard.peek().items, vec![other]);
    }

    #[test]
    fn undoing_a_cut_restores_sibling_order() {
        let notes = ItemCollection::new(ItemKind::Note);
        let first = Item::builder(ItemKind::Note).subject("first").build();
        let middle = Item::builder(ItemKind::Note).subject("middle").build();
        let last = Item::builder(ItemKind::Note).subject("last").build();
        let parent = Item::builder(ItemKind::Note)
            .children([first.clone(), middle.clone(), last.clone()])
            .build();
        notes.append(&parent);
        let clipboard = Clipboard::new();

        let mut cut = CutCommand::new(&notes, &[middle.clone()], &clipboard);
        cut.do_command();
        assert_eq!(parent.children(false), vec![first.clone(), last.clone()]);

        cut.undo_command();
        assert_eq!(parent.children(false), vec![first, middle.clone(), last]);
        assert!(notes.contains(&middle));
    }

    #[test]
    fn paste_without_contents_is_rejected() {
        let clipboard = Clipboard::new();
        assert!(!PasteCommand::new(&clipboard).can_do());
    }
}
