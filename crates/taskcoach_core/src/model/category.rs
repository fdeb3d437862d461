//! Categories: composite items whose members are categorizables.
//!
//! # Responsibility
//! - Keep the category side of the item <-> category relation.
//! - Provide the filter flag and exclusive ("radio") subcategories.
//! - Offer `link_in`/`unlink_in` which update both sides in one event.
//!
//! # Invariants
//! - A `Category` handle always wraps an item of kind `Category`.
//! - Turning exclusive subcategories on unfilters every direct child in the
//!   same event.
//! - Members are held weakly: a category never keeps an item alive, so an
//!   item dropped everywhere else disappears from `categorizables`.

use crate::event::{Event, EventValue};
use crate::model::attribute::SetAttribute;
use crate::model::item::{Item, ItemError, ItemKind, WeakItem};
use std::ops::Deref;
use std::slice;

/// Category-specific fields of `ItemData`.
pub(crate) struct CategoryFields {
    pub(crate) categorizables: SetAttribute<WeakItem>,
    pub(crate) filtered: bool,
    pub(crate) exclusive_subcategories: bool,
}

impl Default for CategoryFields {
    fn default() -> Self {
        Self {
            categorizables: SetAttribute::new(Vec::new(), members_added, members_removed),
            filtered: false,
            exclusive_subcategories: false,
        }
    }
}

/// Handle to an item of kind `Category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(Item);

impl Category {
    pub fn new(subject: impl Into<String>) -> Self {
        Self(Item::builder(ItemKind::Category).subject(subject).build())
    }

    pub(crate) fn from_item_unchecked(item: &Item) -> Self {
        Self(item.clone())
    }

    pub fn item(&self) -> &Item {
        &self.0
    }

    pub fn into_item(self) -> Item {
        self.0
    }

    pub fn subcategories(&self) -> Vec<Category> {
        self.children(false)
            .into_iter()
            .filter_map(|child| Category::try_from(child).ok())
            .collect()
    }

    pub fn parent_category(&self) -> Option<Category> {
        self.parent().and_then(|parent| Category::try_from(parent).ok())
    }

    /// Members, plus the members of all subcategories when `recursive`.
    pub fn categorizables(&self, recursive: bool) -> Vec<Item> {
        let mut result = self.members();
        if recursive {
            for subcategory in self.subcategories() {
                for member in subcategory.categorizables(true) {
                    if !result.contains(&member) {
                        result.push(member);
                    }
                }
            }
        }
        result
    }

    fn members(&self) -> Vec<Item> {
        self.data()
            .category
            .categorizables
            .values()
            .iter()
            .filter_map(WeakItem::upgrade)
            .collect()
    }

    pub fn add_categorizable(&self, item: &Item) -> bool {
        Event::batch(|event| self.add_categorizable_in(item, event))
    }

    pub fn add_categorizable_in(&self, item: &Item, event: &mut Event) -> bool {
        self.add_categorizables_in(slice::from_ref(item), event)
    }

    pub fn add_categorizables_in(&self, items: &[Item], event: &mut Event) -> bool {
        let members = weak_members(items);
        let change = self.data_mut().category.categorizables.add(&members);
        change.notify(self.item(), event)
    }

    pub fn remove_categorizable(&self, item: &Item) -> bool {
        Event::batch(|event| self.remove_categorizable_in(item, event))
    }

    pub fn remove_categorizable_in(&self, item: &Item, event: &mut Event) -> bool {
        self.remove_categorizables_in(slice::from_ref(item), event)
    }

    pub fn remove_categorizables_in(&self, items: &[Item], event: &mut Event) -> bool {
        let members: Vec<WeakItem> = items.iter().map(WeakItem::from).collect();
        let change = self.data_mut().category.categorizables.remove(&members);
        change.notify(self.item(), event)
    }

    pub fn set_categorizables_in(&self, items: &[Item], event: &mut Event) -> bool {
        let members = weak_members(items);
        let change = self.data_mut().category.categorizables.set(&members);
        change.notify(self.item(), event)
    }

    /// Whether `item` belongs to this category (or one of its subcategories).
    ///
    /// An item also counts when one of its ancestors is a member; in tree
    /// mode any member of the item's family counts.
    pub fn contains(&self, item: &Item, tree_mode: bool) -> bool {
        let members = self.categorizables(true);
        let candidates = if tree_mode {
            item.family()
        } else {
            let mut own_line = item.ancestors();
            own_line.push(item.clone());
            own_line
        };
        candidates.iter().any(|candidate| members.contains(candidate))
    }

    pub fn is_filtered(&self) -> bool {
        self.data().category.filtered
    }

    pub fn set_filtered(&self, filtered: bool) -> bool {
        Event::batch(|event| self.set_filtered_in(filtered, event))
    }

    pub fn set_filtered_in(&self, filtered: bool, event: &mut Event) -> bool {
        if !self.replace_field(|data| &mut data.category.filtered, filtered) {
            return false;
        }
        event.add_source(
            self.kind().filter_changed_event_type(),
            self,
            [EventValue::Bool(filtered)],
        );
        true
    }

    pub fn has_exclusive_subcategories(&self) -> bool {
        self.data().category.exclusive_subcategories
    }

    pub fn make_subcategories_exclusive(&self, exclusive: bool) -> bool {
        Event::batch(|event| self.make_subcategories_exclusive_in(exclusive, event))
    }

    pub fn make_subcategories_exclusive_in(&self, exclusive: bool, event: &mut Event) -> bool {
        if !self.replace_field(|data| &mut data.category.exclusive_subcategories, exclusive) {
            return false;
        }
        event.add_source(
            self.kind().exclusive_subcategories_changed_event_type(),
            self,
            [EventValue::Bool(exclusive)],
        );
        if exclusive {
            for child in self.subcategories() {
                child.set_filtered_in(false, event);
            }
        }
        true
    }

    /// Whether this category is one of a set of exclusive siblings.
    pub fn is_mutual_exclusive(&self) -> bool {
        self.parent_category()
            .map_or(false, |parent| parent.has_exclusive_subcategories())
    }
}

impl Deref for Category {
    type Target = Item;

    fn deref(&self) -> &Item {
        &self.0
    }
}

impl TryFrom<Item> for Category {
    type Error = ItemError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        match item.kind() {
            ItemKind::Category => Ok(Self(item)),
            actual => Err(ItemError::KindMismatch {
                expected: ItemKind::Category,
                actual,
            }),
        }
    }
}

impl From<Category> for Item {
    fn from(category: Category) -> Self {
        category.0
    }
}

fn weak_members(items: &[Item]) -> Vec<WeakItem> {
    items
        .iter()
        .filter(|item| item.is_categorizable())
        .map(WeakItem::from)
        .collect()
}

fn live_values(items: &[WeakItem]) -> Vec<EventValue> {
    items
        .iter()
        .filter_map(WeakItem::upgrade)
        .map(|item| EventValue::from(&item))
        .collect()
}

fn members_added(owner: &Item, items: &[WeakItem], event: &mut Event) {
    event.add_source(
        owner.kind().categorizable_added_event_type(),
        owner,
        live_values(items),
    );
}

fn members_removed(owner: &Item, items: &[WeakItem], event: &mut Event) {
    event.add_source(
        owner.kind().categorizable_removed_event_type(),
        owner,
        live_values(items),
    );
}

/// Adds `categorizable` to `category` and `category` to `categorizable`.
pub fn link_in(categorizable: &Item, category: &Category, event: &mut Event) -> bool {
    let member_changed = category.add_categorizable_in(categorizable, event);
    let category_changed = categorizable.add_category_in(category, event);
    member_changed || category_changed
}

/// Removes the relation between `categorizable` and `category` on both sides.
pub fn unlink_in(categorizable: &Item, category: &Category, event: &mut Event) -> bool {
    let member_changed = category.remove_categorizable_in(categorizable, event);
    let category_changed = categorizable.remove_category_in(category, event);
    member_changed || category_changed
}

#[cfg(test)]
mod tests {
    use super::{link_in, unlink_in, Category};
    use crate::event::Event;
    use crate::model::item::{Item, ItemKind};

    #[test]
    fn link_updates_both_sides() {
        let category = Category::new("work");
        let task = Item::builder(ItemKind::Task).build();

        Event::batch(|event| link_in(&task, &category, event));
        assert_eq!(category.categorizables(false), vec![task.clone()]);
        assert!(task.has_category(&category));

        Event::batch(|event| unlink_in(&task, &category, event));
        assert!(category.categorizables(false).is_empty());
        assert!(!task.has_category(&category));
    }

    #[test]
    fn links_do_not_keep_items_alive() {
        let category = Category::new("work");
        let task = Item::builder(ItemKind::Task).build();
        Event::batch(|event| link_in(&task, &category, event));
        let task_link = task.downgrade();
        let category_link = category.downgrade();

        drop(task);
        assert!(Item::upgrade(&task_link).is_none());
        assert!(category.categorizables(false).is_empty());

        drop(category);
        assert!(Item::upgrade(&category_link).is_none());
    }

    #[test]
    fn contains_checks_ancestors_and_family() {
        let category = Category::new("work");
        let child = Item::builder(ItemKind::Task).build();
        let parent = Item::builder(ItemKind::Task).children([child.clone()]).build();

        category.add_categorizable(&parent);
        assert!(category.contains(&child, false));

        let other = Category::new("home");
        other.add_categorizable(&child);
        assert!(!other.contains(&parent, false));
        assert!(other.contains(&parent, true));
    }

    #[test]
    fn exclusive_subcategories_unfilter_children() {
        let parent = Category::new("priority");
        let high = Category::new("high");
        parent.add_child(&high);
        high.set_filtered(true);

        assert!(parent.make_subcategories_exclusive(true));
        assert!(!high.is_filtered());
        assert!(high.is_mutual_exclusive());
        assert!(!parent.make_subcategories_exclusive(true));
    }

    #[test]
    fn recursive_categorizables_include_subcategory_members() {
        let parent = Category::new("parent");
        let child = Category::new("child");
        parent.add_child(&child);
        let note = Item::builder(ItemKind::Note).build();
        child.add_categorizable(&note);

        assert!(parent.categorizables(false).is_empty());
        assert_eq!(parent.categorizables(true), vec![note]);
    }
}
