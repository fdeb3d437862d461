//! Observable collection of composite items.
//!
//! # Responsibility
//! - Hold items together with all their descendants.
//! - Keep parent/child links and category links consistent when items enter
//!   or leave the collection.
//! - Publish `<collectionClass>.add` / `.remove` with the affected items.
//!
//! # Invariants
//! - After `extend`, every descendant of an added item is a member.
//! - After `remove_items`, no descendant of a removed item is a member.
//! - Removing a categorizable detaches it from its categories' member sets
//!   while it keeps its own category list, so re-adding restores the links
//!   (and symmetrically for categories).

use crate::event::{Event, EventSource, EventType, EventValue, InstanceId};
use crate::model::category::Category;
use crate::model::item::{Item, ItemId, ItemKind};
use log::debug;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Error for collection lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    NotFound(ItemId),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "item not found: {id}"),
        }
    }
}

impl Error for CollectionError {}

struct CollectionInner {
    instance: InstanceId,
    kind: ItemKind,
    items: RefCell<Vec<Item>>,
}

/// Shared handle to an ordered item collection.
#[derive(Clone)]
pub struct ItemCollection {
    inner: Rc<CollectionInner>,
}

impl Debug for ItemCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemCollection")
            .field("instance", &self.inner.instance)
            .field("kind", &self.inner.kind)
            .field("len", &self.len())
            .finish()
    }
}

impl PartialEq for ItemCollection {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ItemCollection {
    /// Empty collection for items of `kind`.
    pub fn new(kind: ItemKind) -> Self {
        Self {
            inner: Rc::new(CollectionInner {
                instance: InstanceId::next(),
                kind,
                items: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.inner.instance
    }

    pub fn kind(&self) -> ItemKind {
        self.inner.kind
    }

    /// Event source used for this collection's own events.
    pub fn source(&self) -> EventSource {
        EventSource::Instance(self.inner.instance)
    }

    pub fn add_item_event_type(&self) -> EventType {
        EventType::for_class(self.inner.kind.collection_class_name(), "add")
    }

    pub fn remove_item_event_type(&self) -> EventType {
        EventType::for_class(self.inner.kind.collection_class_name(), "remove")
    }

    pub fn items(&self) -> Vec<Item> {
        self.inner.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.inner.items.borrow().contains(item)
    }

    pub fn get_by_id(&self, id: ItemId) -> CollectionResult<Item> {
        self.inner
            .items
            .borrow()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or(CollectionError::NotFound(id))
    }

    /// Members whose parent is absent or not a member.
    pub fn root_items(&self) -> Vec<Item> {
        self.items()
            .into_iter()
            .filter(|item| item.parent().map_or(true, |parent| !self.contains(&parent)))
            .collect()
    }

    /// Members in pre-order: each parent precedes its descendants.
    pub fn all_items_sorted(&self) -> Vec<Item> {
        let mut result = Vec::with_capacity(self.len());
        for root in self.root_items() {
            result.push(root.clone());
            result.extend(
                root.children(true)
                    .into_iter()
                    .filter(|descendant| self.contains(descendant)),
            );
        }
        result
    }

    pub fn append(&self, item: &Item) -> bool {
        self.extend(std::slice::from_ref(item))
    }

    pub fn append_in(&self, item: &Item, event: &mut Event) -> bool {
        self.extend_in(std::slice::from_ref(item), event)
    }

    pub fn extend(&self, items: &[Item]) -> bool {
        Event::batch(|event| self.extend_in(items, event))
    }

    /// Adds `items` and their descendants. Items whose parent is a member
    /// are re-attached to that parent in the same event.
    pub fn extend_in(&self, items: &[Item], event: &mut Event) -> bool {
        let mut added: Vec<Item> = Vec::new();
        for item in items {
            for member in std::iter::once(item.clone()).chain(item.children(true)) {
                if !self.contains(&member) && !added.contains(&member) {
                    added.push(member);
                }
            }
        }
        if added.is_empty() {
            return false;
        }
        self.inner.items.borrow_mut().extend(added.iter().cloned());

        for item in items {
            if let Some(parent) = item.parent() {
                if self.contains(&parent) && !parent.has_child(item) {
                    parent.add_child_in(item, event);
                }
            }
        }
        self.relink_in(&added, event);
        event.add_source(
            self.add_item_event_type(),
            self.source(),
            added.iter().map(EventValue::from),
        );
        debug!(
            "event=collection_add module=collection status=ok class={} count={}",
            self.inner.kind.collection_class_name(),
            added.len()
        );
        true
    }

    pub fn remove(&self, item: &Item) -> bool {
        self.remove_items(std::slice::from_ref(item))
    }

    pub fn remove_in(&self, item: &Item, event: &mut Event) -> bool {
        self.remove_items_in(std::slice::from_ref(item), event)
    }

    pub fn remove_items(&self, items: &[Item]) -> bool {
        Event::batch(|event| self.remove_items_in(items, event))
    }

    /// Removes `items` and their descendants; each given item is detached
    /// from its parent's children (its parent link is kept).
    pub fn remove_items_in(&self, items: &[Item], event: &mut Event) -> bool {
        let mut removed: Vec<Item> = Vec::new();
        for item in items {
            for member in std::iter::once(item.clone()).chain(item.children(true)) {
                if self.contains(&member) && !removed.contains(&member) {
                    removed.push(member);
                }
            }
        }
        if removed.is_empty() {
            return false;
        }
        self.inner
            .items
            .borrow_mut()
            .retain(|member| !removed.contains(member));

        for item in items {
            if let Some(parent) = item.parent() {
                parent.remove_child_in(item, event);
            }
        }
        self.unlink_in(&removed, event);
        event.add_source(
            self.remove_item_event_type(),
            self.source(),
            removed.iter().map(EventValue::from),
        );
        debug!(
            "event=collection_remove module=collection status=ok class={} count={}",
            self.inner.kind.collection_class_name(),
            removed.len()
        );
        true
    }

    /// Removes every member in one event.
    pub fn clear(&self) -> bool {
        let roots = self.root_items();
        self.remove_items(&roots)
    }

    fn relink_in(&self, added: &[Item], event: &mut Event) {
        for item in added {
            if item.is_categorizable() {
                for category in item.categories(false, false) {
                    category.add_categorizable_in(item, event);
                }
            } else if let Ok(category) = Category::try_from(item.clone()) {
                for member in category.categorizables(false) {
                    member.add_category_in(&category, event);
                }
            }
        }
    }

    fn unlink_in(&self, removed: &[Item], event: &mut Event) {
        for item in removed {
            if item.is_categorizable() {
                for category in item.categories(false, false) {
                    category.remove_categorizable_in(item, event);
                }
            } else if let Ok(category) = Category::try_from(item.clone()) {
                for member in category.categorizables(false) {
                    member.remove_category_in(&category, event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionError, ItemCollection};
    use crate::model::item::{Item, ItemKind};

    #[test]
    fn get_by_id_reports_missing_items() {
        let collection = ItemCollection::new(ItemKind::Note);
        let note = Item::builder(ItemKind::Note).build();
        assert_eq!(
            collection.get_by_id(note.id()).unwrap_err(),
            CollectionError::NotFound(note.id())
        );
        collection.append(&note);
        assert_eq!(collection.get_by_id(note.id()), Ok(note));
    }

    #[test]
    fn event_types_use_collection_class() {
        let collection = ItemCollection::new(ItemKind::Task);
        assert_eq!(collection.add_item_event_type().as_str(), "taskList.add");
        assert_eq!(collection.remove_item_event_type().as_str(), "taskList.remove");
    }
}
