//! Category membership of tasks and notes.
//!
//! # Responsibility
//! - Keep the categorizable side of the item <-> category relation.
//! - Blend category styles into the item's effective style.
//! - Publish direct and "total" (self plus descendants) category events.
//!
//! # Invariants
//! - Only categorizable kinds hold categories; the operations are no-ops
//!   returning `false` for other kinds.
//! - Style lookup order: own value, category mix, parent's effective value.
//! - Category icons are chosen from the first category ordered by subject,
//!   then id, that has one.

use crate::event::{Event, EventType, EventValue};
use crate::model::attribute::SetAttribute;
use crate::model::category::Category;
use crate::model::item::{Item, ItemKind};
use crate::model::style::{Color, Font, StyleAspect};
use std::slice;

pub(crate) fn new_category_set(categories: Vec<Category>) -> SetAttribute<Category> {
    SetAttribute::new(categories, categories_added, categories_removed)
}

impl Item {
    pub fn is_categorizable(&self) -> bool {
        self.kind().is_categorizable()
    }

    /// Own categories, plus the ancestors' categories when `upwards` and the
    /// descendants' categories when `recursive`.
    pub fn categories(&self, recursive: bool, upwards: bool) -> Vec<Category> {
        let mut result = self.data().categories.values().to_vec();
        if upwards {
            if let Some(parent) = self.parent() {
                extend_unique(&mut result, parent.categories(false, true));
            }
        }
        if recursive {
            for child in self.children(false) {
                extend_unique(&mut result, child.categories(true, false));
            }
        }
        result
    }

    pub fn has_category(&self, category: &Category) -> bool {
        self.data().categories.contains(category)
    }

    pub fn add_category(&self, category: &Category) -> bool {
        Event::batch(|event| self.add_category_in(category, event))
    }

    pub fn add_category_in(&self, category: &Category, event: &mut Event) -> bool {
        self.add_categories_in(slice::from_ref(category), event)
    }

    pub fn add_categories_in(&self, categories: &[Category], event: &mut Event) -> bool {
        if !self.is_categorizable() {
            return false;
        }
        let change = self.data_mut().categories.add(categories);
        change.notify(self, event)
    }

    pub fn remove_category(&self, category: &Category) -> bool {
        Event::batch(|event| self.remove_category_in(category, event))
    }

    pub fn remove_category_in(&self, category: &Category, event: &mut Event) -> bool {
        self.remove_categories_in(slice::from_ref(category), event)
    }

    pub fn remove_categories_in(&self, categories: &[Category], event: &mut Event) -> bool {
        if !self.is_categorizable() {
            return false;
        }
        let change = self.data_mut().categories.remove(categories);
        change.notify(self, event)
    }

    pub fn set_categories(&self, categories: &[Category]) -> bool {
        Event::batch(|event| self.set_categories_in(categories, event))
    }

    pub fn set_categories_in(&self, categories: &[Category], event: &mut Event) -> bool {
        if !self.is_categorizable() {
            return false;
        }
        let change = self.data_mut().categories.set(categories);
        change.notify(self, event)
    }
}

fn categories_added(owner: &Item, categories: &[Category], event: &mut Event) {
    publish_membership_change(
        owner,
        categories,
        event,
        owner.kind().category_added_event_type(),
        ItemKind::total_category_added_event_type,
    );
}

fn categories_removed(owner: &Item, categories: &[Category], event: &mut Event) {
    publish_membership_change(
        owner,
        categories,
        event,
        owner.kind().category_removed_event_type(),
        ItemKind::total_category_removed_event_type,
    );
}

fn publish_membership_change(
    owner: &Item,
    categories: &[Category],
    event: &mut Event,
    direct: EventType,
    total: fn(ItemKind) -> EventType,
) {
    let values: Vec<EventValue> = categories.iter().map(EventValue::from).collect();
    event.add_source(direct, owner, values.clone());
    event.add_source(total(owner.kind()), owner, values.clone());
    for descendant in owner.children(true) {
        event.add_source(total(descendant.kind()), &descendant, values.clone());
    }
    for aspect in StyleAspect::ALL {
        if owner.has_own_style(aspect) {
            continue;
        }
        if categories
            .iter()
            .any(|category| has_effective_style(category.item(), aspect))
        {
            owner.style_changed_in(aspect, event);
        }
    }
}

/// Sends `category.subject` to every member and `totalCategory.subject` to
/// every member and its descendants.
pub(crate) fn category_subject_changed_in(category: &Item, subject: &str, event: &mut Event) {
    let value = EventValue::Text(subject.to_string());
    for member in Category::from_item_unchecked(category).categorizables(true) {
        event.add_source(
            member.kind().category_subject_changed_event_type(),
            &member,
            [value.clone()],
        );
        event.add_source(
            member.kind().total_category_subject_changed_event_type(),
            &member,
            [value.clone()],
        );
        for descendant in member.children(true) {
            event.add_source(
                descendant.kind().total_category_subject_changed_event_type(),
                &descendant,
                [value.clone()],
            );
        }
    }
}

fn has_effective_style(item: &Item, aspect: StyleAspect) -> bool {
    match aspect {
        StyleAspect::Foreground => item.fg_color(true).is_some(),
        StyleAspect::Background => item.bg_color(true).is_some(),
        StyleAspect::Font => item.font(true).is_some(),
        StyleAspect::Icon => !item.icon(true).is_empty(),
        StyleAspect::SelectedIcon => !item.selected_icon(true).is_empty(),
    }
}

fn own_categories(item: &Item) -> Vec<Category> {
    if !item.is_categorizable() {
        return Vec::new();
    }
    item.data().categories.values().to_vec()
}

pub(crate) fn category_color(item: &Item, aspect: StyleAspect) -> Option<Color> {
    let colors: Vec<Color> = own_categories(item)
        .iter()
        .filter_map(|category| match aspect {
            StyleAspect::Foreground => category.fg_color(true),
            _ => category.bg_color(true),
        })
        .collect();
    Color::mix(&colors)
}

pub(crate) fn category_font(item: &Item) -> Option<Font> {
    let fonts: Vec<Font> = own_categories(item)
        .iter()
        .filter_map(|category| category.font(true))
        .collect();
    Font::mix(&fonts)
}

pub(crate) fn category_icon(item: &Item, aspect: StyleAspect) -> Option<String> {
    let mut categories = own_categories(item);
    categories.sort_by_key(|category| (category.subject(false), category.id()));
    categories.iter().find_map(|category| {
        let icon = match aspect {
            StyleAspect::SelectedIcon => category.selected_icon(true),
            _ => category.icon(true),
        };
        (!icon.is_empty()).then_some(icon)
    })
}

fn extend_unique(target: &mut Vec<Category>, extra: Vec<Category>) {
    for category in extra {
        if !target.contains(&category) {
            target.push(category);
        }
    }
}
