//! Set-valued attribute with add/remove notification hooks.
//!
//! # Responsibility
//! - Keep an ordered, duplicate-free set of references.
//! - Report what actually changed so the owner can publish it.
//!
//! # Invariants
//! - Hooks run only for values that were really added or removed.
//! - Hooks run after the owner's storage borrow is released
//!   (`SetChange::notify` is called by the owner, not by the attribute).

use crate::event::Event;
use crate::model::item::Item;

/// Notification hook: `(owner, changed values, event being built)`.
pub(crate) type SetHook<T> = fn(&Item, &[T], &mut Event);

pub(crate) struct SetAttribute<T> {
    values: Vec<T>,
    on_add: SetHook<T>,
    on_remove: SetHook<T>,
}

impl<T: Clone + PartialEq> SetAttribute<T> {
    pub(crate) fn new(values: Vec<T>, on_add: SetHook<T>, on_remove: SetHook<T>) -> Self {
        let mut unique: Vec<T> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self {
            values: unique,
            on_add,
            on_remove,
        }
    }

    pub(crate) fn values(&self) -> &[T] {
        &self.values
    }

    pub(crate) fn contains(&self, value: &T) -> bool {
        self.values.contains(value)
    }

    pub(crate) fn add(&mut self, values: &[T]) -> SetChange<T> {
        let mut added = Vec::new();
        for value in values {
            if !self.values.contains(value) {
                self.values.push(value.clone());
                added.push(value.clone());
            }
        }
        self.change(added, Vec::new())
    }

    pub(crate) fn remove(&mut self, values: &[T]) -> SetChange<T> {
        let mut removed = Vec::new();
        for value in values {
            if let Some(position) = self.values.iter().position(|current| current == value) {
                removed.push(self.values.remove(position));
            }
        }
        self.change(Vec::new(), removed)
    }

    /// Replaces the whole set, reporting the difference.
    pub(crate) fn set(&mut self, values: &[T]) -> SetChange<T> {
        let removed: Vec<T> = self
            .values
            .iter()
            .filter(|current| !values.contains(current))
            .cloned()
            .collect();
        let mut next: Vec<T> = Vec::with_capacity(values.len());
        let mut added = Vec::new();
        for value in values {
            if next.contains(value) {
                continue;
            }
            if !self.values.contains(value) {
                added.push(value.clone());
            }
            next.push(value.clone());
        }
        self.values = next;
        self.change(added, removed)
    }

    fn change(&self, added: Vec<T>, removed: Vec<T>) -> SetChange<T> {
        SetChange {
            added,
            removed,
            on_add: self.on_add,
            on_remove: self.on_remove,
        }
    }
}

/// Outcome of one set mutation, still to be published.
#[must_use = "call notify() once the owner's borrow is released"]
pub(crate) struct SetChange<T> {
    added: Vec<T>,
    removed: Vec<T>,
    on_add: SetHook<T>,
    on_remove: SetHook<T>,
}

impl<T> SetChange<T> {
    pub(crate) fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Runs the hooks (removals first) and reports whether anything changed.
    pub(crate) fn notify(self, owner: &Item, event: &mut Event) -> bool {
        if !self.removed.is_empty() {
            (self.on_remove)(owner, &self.removed, event);
        }
        if !self.added.is_empty() {
            (self.on_add)(owner, &self.added, event);
        }
        !(self.added.is_empty() && self.removed.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::SetAttribute;
    use crate::event::Event;
    use crate::model::item::Item;

    fn ignore(_: &Item, _: &[u8], _: &mut Event) {}

    #[test]
    fn add_skips_present_values() {
        let mut set = SetAttribute::new(vec![1, 1, 2], ignore, ignore);
        assert_eq!(set.values(), &[1, 2]);

        let change = set.add(&[2, 3]);
        assert!(!change.is_empty());
        assert_eq!(set.values(), &[1, 2, 3]);
        assert!(set.add(&[3]).is_empty());
    }

    #[test]
    fn set_reports_difference() {
        let mut set = SetAttribute::new(vec![1, 2], ignore, ignore);
        let change = set.set(&[2, 3]);
        assert_eq!(change.added, vec![3]);
        assert_eq!(change.removed, vec![1]);
        assert!(set.remove(&[9]).is_empty());
    }
}
