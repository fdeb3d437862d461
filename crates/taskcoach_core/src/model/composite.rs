//! Tree structure and lifecycle propagation for items.
//!
//! # Responsibility
//! - Maintain parent/children links and tree queries.
//! - Publish add/remove-child and expansion events.
//! - Apply lifecycle transitions to a whole subtree in one event.
//!
//! # Invariants
//! - `child in parent.children` implies `child.parent == parent`.
//! - `remove_child` keeps the child's parent link so the change can be undone.
//! - Traversals are pre-order: a parent always precedes its descendants.

use crate::event::{Event, EventValue};
use crate::model::item::{Item, ItemBuilder};
use crate::model::status::{StatusSignal, Transition};

/// Expansion context used when a caller has no viewer-specific one.
pub const DEFAULT_EXPANSION_CONTEXT: &str = "default";

impl Item {
    pub fn parent(&self) -> Option<Item> {
        self.data().parent.as_ref().and_then(Item::upgrade)
    }

    /// Re-points the parent link without touching either children list.
    pub fn set_parent(&self, parent: Option<&Item>) {
        self.data_mut().parent = parent.map(Item::downgrade);
    }

    /// Direct children, or all descendants in pre-order when `recursive`.
    pub fn children(&self, recursive: bool) -> Vec<Item> {
        let direct = self.data().children.clone();
        if !recursive {
            return direct;
        }
        let mut result = Vec::new();
        for child in direct {
            let below = child.children(true);
            result.push(child);
            result.extend(below);
        }
        result
    }

    pub fn has_child(&self, child: &Item) -> bool {
        self.data().children.contains(child)
    }

    pub fn add_child(&self, child: &Item) -> bool {
        Event::batch(|event| self.add_child_in(child, event))
    }

    /// Appends `child` and points it at `self`. Already-present children are
    /// only re-linked.
    pub fn add_child_in(&self, child: &Item, event: &mut Event) -> bool {
        child.set_parent(Some(self));
        if self.has_child(child) {
            return false;
        }
        self.data_mut().children.push(child.clone());
        event.add_source(
            self.kind().add_child_event_type(),
            self,
            [EventValue::from(child)],
        );
        true
    }

    pub fn remove_child(&self, child: &Item) -> bool {
        Event::batch(|event| self.remove_child_in(child, event))
    }

    pub fn remove_child_in(&self, child: &Item, event: &mut Event) -> bool {
        let removed = {
            let mut data = self.data_mut();
            match data.children.iter().position(|current| current == child) {
                Some(position) => {
                    data.children.remove(position);
                    true
                }
                None => false,
            }
        };
        if removed {
            event.add_source(
                self.kind().remove_child_event_type(),
                self,
                [EventValue::from(child)],
            );
        }
        removed
    }

    /// Ancestors ordered from the root down to the direct parent.
    pub fn ancestors(&self) -> Vec<Item> {
        let mut result = Vec::new();
        let mut current = self.parent();
        while let Some(item) = current {
            current = item.parent();
            result.push(item);
        }
        result.reverse();
        result
    }

    /// Other children of the parent, plus their descendants when
    /// `recursive`. Roots have no siblings.
    pub fn siblings(&self, recursive: bool) -> Vec<Item> {
        let Some(parent) = self.parent() else {
            return Vec::new();
        };
        let mut result = Vec::new();
        for sibling in parent.children(false) {
            if &sibling == self {
                continue;
            }
            let below = if recursive {
                sibling.children(true)
            } else {
                Vec::new()
            };
            result.push(sibling);
            result.extend(below);
        }
        result
    }

    /// Ancestors, the item itself and its descendants.
    pub fn family(&self) -> Vec<Item> {
        let mut result = self.ancestors();
        result.push(self.clone());
        result.extend(self.children(true));
        result
    }

    /// Starts building an item of the same kind whose parent is `self`.
    /// The new item is not added to `self.children`.
    pub fn new_child(&self) -> ItemBuilder {
        Item::builder(self.kind()).parent(self)
    }

    pub fn is_expanded(&self, context: &str) -> bool {
        self.data().expanded_contexts.contains(context)
    }

    pub fn expanded_contexts(&self) -> Vec<String> {
        self.data().expanded_contexts.iter().cloned().collect()
    }

    pub fn expand(&self, expand: bool, context: &str) -> bool {
        Event::batch(|event| self.expand_in(expand, context, event))
    }

    pub fn expand_in(&self, expand: bool, context: &str, event: &mut Event) -> bool {
        let changed = {
            let mut data = self.data_mut();
            if expand {
                data.expanded_contexts.insert(context.to_string())
            } else {
                data.expanded_contexts.remove(context)
            }
        };
        if changed {
            event.add_source(
                self.kind().expansion_changed_event_type(),
                self,
                [EventValue::Bool(expand)],
            );
        }
        changed
    }

    pub fn mark_deleted(&self) {
        Event::batch(|event| self.mark_deleted_in(event))
    }

    pub fn mark_deleted_in(&self, event: &mut Event) {
        self.transition_subtree_in(Transition::MarkDeleted, event);
    }

    pub fn mark_not_deleted(&self) {
        Event::batch(|event| self.mark_not_deleted_in(event))
    }

    pub fn mark_not_deleted_in(&self, event: &mut Event) {
        self.transition_subtree_in(Transition::MarkNotDeleted, event);
    }

    pub fn mark_new(&self) {
        Event::batch(|event| self.mark_new_in(event))
    }

    pub fn mark_new_in(&self, event: &mut Event) {
        self.transition_subtree_in(Transition::MarkNew, event);
    }

    pub fn clean_dirty(&self) {
        Event::batch(|event| self.clean_dirty_in(event))
    }

    pub fn clean_dirty_in(&self, event: &mut Event) {
        self.transition_subtree_in(Transition::CleanDirty, event);
    }

    pub fn mark_dirty(&self, force: bool) {
        Event::batch(|event| self.mark_dirty_in(force, event))
    }

    /// Marks the item changed; a forced mark also covers every descendant.
    pub fn mark_dirty_in(&self, force: bool, event: &mut Event) {
        let transition = Transition::MarkDirty { force };
        if force {
            self.transition_subtree_in(transition, event);
        } else {
            self.transition_in(transition, event);
        }
    }

    fn transition_subtree_in(&self, transition: Transition, event: &mut Event) {
        self.transition_in(transition, event);
        for descendant in self.children(true) {
            descendant.transition_in(transition, event);
        }
    }

    pub(crate) fn transition_in(&self, transition: Transition, event: &mut Event) {
        let (next, signal) = {
            let mut data = self.data_mut();
            let (next, signal) = transition.apply(data.status);
            data.status = next;
            (next, signal)
        };
        self.publish_status_signal(signal, next, event);
    }

    pub(crate) fn publish_status_signal(
        &self,
        signal: Option<StatusSignal>,
        status: crate::model::status::SyncStatus,
        event: &mut Event,
    ) {
        let event_type = match signal {
            Some(StatusSignal::MarkDeleted) => self.kind().mark_deleted_event_type(),
            Some(StatusSignal::MarkNotDeleted) => self.kind().mark_not_deleted_event_type(),
            None => return,
        };
        event.add_source(event_type, self, [EventValue::Status(status)]);
    }
}
