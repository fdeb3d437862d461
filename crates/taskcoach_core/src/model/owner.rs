//! Owned sub-object lists (notes, attachments).
//!
//! The accessor surface (`notes`, `add_note`, `remove_note`, `set_notes`,
//! and the batched `_in` forms) is generated once per owned type by
//! `owner_accessors!`. Removing an item that is not owned is ignored.

use crate::event::{Event, EventValue};
use crate::model::item::Item;

/// Ordered, duplicate-free list of owned items.
#[derive(Debug, Default, Clone)]
pub(crate) struct OwnedItems(Vec<Item>);

impl OwnedItems {
    pub(crate) fn items(&self) -> &[Item] {
        &self.0
    }

    /// Adds the items not yet owned and returns them.
    pub(crate) fn add(&mut self, items: &[Item]) -> Vec<Item> {
        let mut added = Vec::new();
        for item in items {
            if !self.0.contains(item) && !added.contains(item) {
                self.0.push(item.clone());
                added.push(item.clone());
            }
        }
        added
    }

    /// Removes the owned items among `items` and returns them.
    pub(crate) fn remove(&mut self, items: &[Item]) -> Vec<Item> {
        let mut removed = Vec::new();
        for item in items {
            if let Some(position) = self.0.iter().position(|owned| owned == item) {
                removed.push(self.0.remove(position));
            }
        }
        removed
    }

    /// Replaces the list; returns whether it changed.
    pub(crate) fn replace(&mut self, items: &[Item]) -> bool {
        let mut next: Vec<Item> = Vec::with_capacity(items.len());
        for item in items {
            if !next.contains(item) {
                next.push(item.clone());
            }
        }
        if next == self.0 {
            return false;
        }
        self.0 = next;
        true
    }
}

impl From<Vec<Item>> for OwnedItems {
    fn from(items: Vec<Item>) -> Self {
        let mut owned = Self::default();
        let _ = owned.add(&items);
        owned
    }
}

macro_rules! owner_accessors {
    (
        field: $field:ident,
        event_type: $event_type:ident,
        list: $list:ident,
        add: $add:ident, add_in: $add_in:ident,
        remove: $remove:ident, remove_in: $remove_in:ident,
        set: $set:ident, set_in: $set_in:ident $(,)?
    ) => {
        impl Item {
            pub fn $list(&self) -> Vec<Item> {
                self.data().$field.items().to_vec()
            }

            pub fn $add(&self, owned: &Item) -> bool {
                Event::batch(|event| self.$add_in(std::slice::from_ref(owned), event))
            }

            pub fn $add_in(&self, owned: &[Item], event: &mut Event) -> bool {
                let added = self.data_mut().$field.add(owned);
                if added.is_empty() {
                    return false;
                }
                event.add_source(
                    self.kind().$event_type(),
                    self,
                    added.iter().map(EventValue::from),
                );
                true
            }

            pub fn $remove(&self, owned: &Item) -> bool {
                Event::batch(|event| self.$remove_in(std::slice::from_ref(owned), event))
            }

            pub fn $remove_in(&self, owned: &[Item], event: &mut Event) -> bool {
                let removed = self.data_mut().$field.remove(owned);
                if removed.is_empty() {
                    return false;
                }
                event.add_source(
                    self.kind().$event_type(),
                    self,
                    removed.iter().map(EventValue::from),
                );
                true
            }

            pub fn $set(&self, owned: &[Item]) -> bool {
                Event::batch(|event| self.$set_in(owned, event))
            }

            pub fn $set_in(&self, owned: &[Item], event: &mut Event) -> bool {
                if !self.data_mut().$field.replace(owned) {
                    return false;
                }
                event.add_source(
                    self.kind().$event_type(),
                    self,
                    owned.iter().map(EventValue::from),
                );
                true
            }
        }
    };
}

owner_accessors! {
    field: notes,
    event_type: notes_changed_event_type,
    list: notes,
    add: add_note, add_in: add_notes_in,
    remove: remove_note, remove_in: remove_notes_in,
    set: set_notes, set_in: set_notes_in,
}

owner_accessors! {
    field: attachments,
    event_type: attachments_changed_event_type,
    list: attachments,
    add: add_attachment, add_in: add_attachments_in,
    remove: remove_attachment, remove_in: remove_attachments_in,
    set: set_attachments, set_in: set_attachments_in,
}
