//! Shared handle for every domain object.
//!
//! # Responsibility
//! - Keep one storage shape (`ItemData`) for tasks, notes, categories and
//!   attachments; kind-specific fields are only meaningful for their kind.
//! - Provide identity, the named/styled attributes and their change events.
//! - Derive class-parameterised event types from `ItemKind`.
//!
//! # Invariants
//! - Equality and hashing are by handle identity, never by field values.
//! - `id` is unique per item; copies get a fresh id.
//! - Setting an attribute to its current value sends nothing.
//! - Parent links are weak; children are owned.
//!
//! # See also
//! - `composite.rs` (tree), `categorizable.rs` (category-aware styling)

use crate::event::{Event, EventType, EventValue};
use crate::model::attachment::AttachmentFields;
use crate::model::attribute::SetAttribute;
use crate::model::categorizable;
use crate::model::category::{Category, CategoryFields};
use crate::model::owner::OwnedItems;
use crate::model::status::SyncStatus;
use crate::model::style::{icon_for_shape, Color, Font, Style, StyleAspect};
use crate::model::task::{Task, TaskFields};
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Stable identifier of a domain object.
pub type ItemId = Uuid;

/// Separator used by recursive subjects.
pub const SUBJECT_SEPARATOR: &str = " -> ";

/// Class tag of a domain object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Task,
    Note,
    Category,
    Attachment,
}

/// Error for operations that require a specific item kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    KindMismatch { expected: ItemKind, actual: ItemKind },
}

impl Display for ItemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KindMismatch { expected, actual } => {
                write!(
                    f,
                    "expected a {} item, got a {} item",
                    expected.class_name(),
                    actual.class_name()
                )
            }
        }
    }
}

impl Error for ItemError {}

macro_rules! kind_event_types {
    ($($name:ident => $topic:literal,)*) => {
        impl ItemKind {
            $(
                #[doc = concat!("`<class>.", $topic, "`")]
                pub fn $name(self) -> EventType {
                    self.event_type($topic)
                }
            )*
        }
    };
}

kind_event_types! {
    subject_changed_event_type => "subject",
    description_changed_event_type => "description",
    fg_color_changed_event_type => "fgColor",
    bg_color_changed_event_type => "bgColor",
    font_changed_event_type => "font",
    icon_changed_event_type => "icon",
    selected_icon_changed_event_type => "selectedIcon",
    mark_deleted_event_type => "markDeleted",
    mark_not_deleted_event_type => "markNotDeleted",
    add_child_event_type => "add.child",
    remove_child_event_type => "remove.child",
    expansion_changed_event_type => "expandedContexts",
    category_added_event_type => "category.add",
    category_removed_event_type => "category.remove",
    total_category_added_event_type => "totalCategory.add",
    total_category_removed_event_type => "totalCategory.remove",
    category_subject_changed_event_type => "category.subject",
    total_category_subject_changed_event_type => "totalCategory.subject",
    categorizable_added_event_type => "categorizable.added",
    categorizable_removed_event_type => "categorizable.removed",
    filter_changed_event_type => "filter",
    exclusive_subcategories_changed_event_type => "exclusiveSubcategories",
    notes_changed_event_type => "notes",
    attachments_changed_event_type => "attachments",
    planned_start_changed_event_type => "plannedStartDateTime",
    due_changed_event_type => "dueDateTime",
    completion_changed_event_type => "completionDateTime",
    recurrence_changed_event_type => "recurrence",
    location_changed_event_type => "location",
}

impl ItemKind {
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Note => "note",
            Self::Category => "category",
            Self::Attachment => "attachment",
        }
    }

    /// Class name of the collection that owns items of this kind.
    pub fn collection_class_name(self) -> &'static str {
        match self {
            Self::Task => "taskList",
            Self::Note => "noteContainer",
            Self::Category => "categoryList",
            Self::Attachment => "attachmentList",
        }
    }

    pub fn is_categorizable(self) -> bool {
        matches!(self, Self::Task | Self::Note)
    }

    pub fn event_type(self, topic: &str) -> EventType {
        EventType::for_class(self.class_name(), topic)
    }

    pub fn style_event_type(self, aspect: StyleAspect) -> EventType {
        self.event_type(aspect.topic())
    }

    /// Event types whose firing counts as a user-visible modification.
    pub fn modification_event_types(self) -> Vec<EventType> {
        let mut types = vec![
            self.subject_changed_event_type(),
            self.description_changed_event_type(),
            self.fg_color_changed_event_type(),
            self.bg_color_changed_event_type(),
            self.font_changed_event_type(),
            self.icon_changed_event_type(),
            self.selected_icon_changed_event_type(),
            self.add_child_event_type(),
            self.remove_child_event_type(),
            self.notes_changed_event_type(),
            self.attachments_changed_event_type(),
        ];
        match self {
            Self::Task | Self::Note => {
                types.push(self.category_added_event_type());
                types.push(self.category_removed_event_type());
                if self == Self::Task {
                    types.push(self.planned_start_changed_event_type());
                    types.push(self.due_changed_event_type());
                    types.push(self.completion_changed_event_type());
                    types.push(self.recurrence_changed_event_type());
                }
            }
            Self::Category => {
                types.push(self.filter_changed_event_type());
                types.push(self.exclusive_subcategories_changed_event_type());
                types.push(self.categorizable_added_event_type());
                types.push(self.categorizable_removed_event_type());
            }
            Self::Attachment => types.push(self.location_changed_event_type()),
        }
        types
    }
}

/// Storage shared by all kinds.
pub(crate) struct ItemData {
    pub(crate) id: ItemId,
    pub(crate) kind: ItemKind,
    pub(crate) status: SyncStatus,
    pub(crate) subject: String,
    pub(crate) description: String,
    pub(crate) style: Style,
    pub(crate) parent: Option<Weak<RefCell<ItemData>>>,
    pub(crate) children: Vec<Item>,
    pub(crate) expanded_contexts: BTreeSet<String>,
    /// Meaningful for categorizable kinds.
    pub(crate) categories: SetAttribute<Category>,
    pub(crate) notes: OwnedItems,
    pub(crate) attachments: OwnedItems,
    /// Meaningful for `ItemKind::Task`.
    pub(crate) task: TaskFields,
    /// Meaningful for `ItemKind::Category`.
    pub(crate) category: CategoryFields,
    /// Meaningful for `ItemKind::Attachment`.
    pub(crate) attachment: AttachmentFields,
}

/// Reference-counted handle to a domain object.
#[derive(Clone)]
pub struct Item(Rc<RefCell<ItemData>>);

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl Debug for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => f
                .debug_struct("Item")
                .field("id", &data.id)
                .field("kind", &data.kind)
                .field("status", &data.status)
                .finish_non_exhaustive(),
            Err(_) => f.write_str("Item(<borrowed>)"),
        }
    }
}

/// Non-owning item reference, compared by identity.
#[derive(Clone)]
pub(crate) struct WeakItem(Weak<RefCell<ItemData>>);

impl WeakItem {
    pub(crate) fn upgrade(&self) -> Option<Item> {
        Item::upgrade(&self.0)
    }
}

impl From<&Item> for WeakItem {
    fn from(item: &Item) -> Self {
        Self(item.downgrade())
    }
}

impl PartialEq for WeakItem {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl Item {
    /// Starts building an item of `kind`.
    pub fn builder(kind: ItemKind) -> ItemBuilder {
        ItemBuilder::new(kind)
    }

    pub(crate) fn data(&self) -> Ref<'_, ItemData> {
        self.0.borrow()
    }

    pub(crate) fn data_mut(&self) -> RefMut<'_, ItemData> {
        self.0.borrow_mut()
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<ItemData>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(link: &Weak<RefCell<ItemData>>) -> Option<Item> {
        link.upgrade().map(Item)
    }

    pub fn id(&self) -> ItemId {
        self.data().id
    }

    pub fn kind(&self) -> ItemKind {
        self.data().kind
    }

    pub fn status(&self) -> SyncStatus {
        self.data().status
    }

    pub fn is_deleted(&self) -> bool {
        self.status() == SyncStatus::Deleted
    }

    /// Own subject, or `root -> ... -> self` when `recursive`.
    pub fn subject(&self, recursive: bool) -> String {
        let own = self.data().subject.clone();
        if !recursive {
            return own;
        }
        match self.parent() {
            Some(parent) => format!("{}{SUBJECT_SEPARATOR}{own}", parent.subject(true)),
            None => own,
        }
    }

    pub fn description(&self) -> String {
        self.data().description.clone()
    }

    /// Own style values, without inheritance.
    pub fn style(&self) -> Style {
        self.data().style.clone()
    }

    pub fn set_subject(&self, subject: impl Into<String>) -> bool {
        Event::batch(|event| self.set_subject_in(subject, event))
    }

    /// Changes the subject; a category also notifies its members.
    pub fn set_subject_in(&self, subject: impl Into<String>, event: &mut Event) -> bool {
        let subject = subject.into();
        if !self.replace_field(|data| &mut data.subject, subject.clone()) {
            return false;
        }
        event.add_source(
            self.kind().subject_changed_event_type(),
            self,
            [EventValue::Text(subject.clone())],
        );
        if self.kind() == ItemKind::Category {
            categorizable::category_subject_changed_in(self, &subject, event);
        }
        true
    }

    pub fn set_description(&self, description: impl Into<String>) -> bool {
        Event::batch(|event| self.set_description_in(description, event))
    }

    pub fn set_description_in(&self, description: impl Into<String>, event: &mut Event) -> bool {
        let description = description.into();
        if !self.replace_field(|data| &mut data.description, description.clone()) {
            return false;
        }
        event.add_source(
            self.kind().description_changed_event_type(),
            self,
            [EventValue::Text(description)],
        );
        true
    }

    /// Own foreground color, or the inherited one when `recursive`.
    ///
    /// Lookup order: own value, then the mix of the item's categories, then
    /// the parent's recursive value.
    pub fn fg_color(&self, recursive: bool) -> Option<Color> {
        self.resolve_color(StyleAspect::Foreground, recursive)
    }

    pub fn bg_color(&self, recursive: bool) -> Option<Color> {
        self.resolve_color(StyleAspect::Background, recursive)
    }

    pub fn font(&self, recursive: bool) -> Option<Font> {
        let own = self.data().style.font.clone();
        if own.is_some() || !recursive {
            return own;
        }
        if let Some(mixed) = categorizable::category_font(self) {
            return Some(mixed);
        }
        self.parent().and_then(|parent| parent.font(true))
    }

    /// Icon name; the recursive form follows the item's tree shape.
    pub fn icon(&self, recursive: bool) -> String {
        self.resolve_icon(StyleAspect::Icon, recursive)
    }

    pub fn selected_icon(&self, recursive: bool) -> String {
        self.resolve_icon(StyleAspect::SelectedIcon, recursive)
    }

    pub fn set_fg_color(&self, color: Option<Color>) -> bool {
        Event::batch(|event| self.set_fg_color_in(color, event))
    }

    pub fn set_fg_color_in(&self, color: Option<Color>, event: &mut Event) -> bool {
        self.update_style_in(StyleAspect::Foreground, event, |style| {
            replace(&mut style.fg_color, color)
        })
    }

    pub fn set_bg_color(&self, color: Option<Color>) -> bool {
        Event::batch(|event| self.set_bg_color_in(color, event))
    }

    pub fn set_bg_color_in(&self, color: Option<Color>, event: &mut Event) -> bool {
        self.update_style_in(StyleAspect::Background, event, |style| {
            replace(&mut style.bg_color, color)
        })
    }

    pub fn set_font(&self, font: Option<Font>) -> bool {
        Event::batch(|event| self.set_font_in(font, event))
    }

    pub fn set_font_in(&self, font: Option<Font>, event: &mut Event) -> bool {
        self.update_style_in(StyleAspect::Font, event, |style| replace(&mut style.font, font))
    }

    pub fn set_icon(&self, icon: impl Into<String>) -> bool {
        Event::batch(|event| self.set_icon_in(icon, event))
    }

    pub fn set_icon_in(&self, icon: impl Into<String>, event: &mut Event) -> bool {
        let icon = icon.into();
        self.update_style_in(StyleAspect::Icon, event, |style| replace(&mut style.icon, icon))
    }

    pub fn set_selected_icon(&self, icon: impl Into<String>) -> bool {
        Event::batch(|event| self.set_selected_icon_in(icon, event))
    }

    pub fn set_selected_icon_in(&self, icon: impl Into<String>, event: &mut Event) -> bool {
        let icon = icon.into();
        self.update_style_in(StyleAspect::SelectedIcon, event, |style| {
            replace(&mut style.selected_icon, icon)
        })
    }

    /// Effective (recursive) value of `aspect`, as carried by style events.
    pub(crate) fn style_value(&self, aspect: StyleAspect) -> EventValue {
        match aspect {
            StyleAspect::Foreground => EventValue::Color(self.fg_color(true)),
            StyleAspect::Background => EventValue::Color(self.bg_color(true)),
            StyleAspect::Font => EventValue::Font(self.font(true)),
            StyleAspect::Icon => EventValue::Text(self.icon(true)),
            StyleAspect::SelectedIcon => EventValue::Text(self.selected_icon(true)),
        }
    }

    pub(crate) fn has_own_style(&self, aspect: StyleAspect) -> bool {
        self.data().style.has(aspect)
    }

    /// Adds a style-changed entry for this item and for every item whose
    /// effective value derives from it: descendants without an own value
    /// and, for categories, members without an own value.
    pub(crate) fn style_changed_in(&self, aspect: StyleAspect, event: &mut Event) {
        event.add_source(
            self.kind().style_event_type(aspect),
            self,
            [self.style_value(aspect)],
        );
        for child in self.children(false) {
            if !child.has_own_style(aspect) {
                child.style_changed_in(aspect, event);
            }
        }
        if self.kind() == ItemKind::Category {
            for member in Category::from_item_unchecked(self).categorizables(true) {
                if !member.has_own_style(aspect) {
                    member.style_changed_in(aspect, event);
                }
            }
        }
    }

    fn update_style_in(
        &self,
        aspect: StyleAspect,
        event: &mut Event,
        update: impl FnOnce(&mut Style) -> bool,
    ) -> bool {
        let changed = update(&mut self.data_mut().style);
        if changed {
            self.touch();
            self.style_changed_in(aspect, event);
        }
        changed
    }

    fn resolve_color(&self, aspect: StyleAspect, recursive: bool) -> Option<Color> {
        let own = match aspect {
            StyleAspect::Foreground => self.data().style.fg_color,
            _ => self.data().style.bg_color,
        };
        if own.is_some() || !recursive {
            return own;
        }
        if let Some(mixed) = categorizable::category_color(self, aspect) {
            return Some(mixed);
        }
        self.parent()
            .and_then(|parent| parent.resolve_color(aspect, true))
    }

    fn resolve_icon(&self, aspect: StyleAspect, recursive: bool) -> String {
        let own = match aspect {
            StyleAspect::SelectedIcon => self.data().style.selected_icon.clone(),
            _ => self.data().style.icon.clone(),
        };
        if !recursive {
            return own;
        }
        let base = if !own.is_empty() {
            own
        } else if let Some(icon) = categorizable::category_icon(self, aspect) {
            icon
        } else {
            self.parent()
                .map(|parent| parent.resolve_icon(aspect, true))
                .unwrap_or_default()
        };
        if base.is_empty() {
            return base;
        }
        let has_children = self.children(false).iter().any(|child| !child.is_deleted());
        icon_for_shape(&base, has_children)
    }

    /// Compare-and-swap on one field. Returns whether the value changed.
    pub(crate) fn replace_field<T, F>(&self, field: F, value: T) -> bool
    where
        T: PartialEq,
        F: FnOnce(&mut ItemData) -> &mut T,
    {
        let changed = {
            let mut data = self.data_mut();
            replace(field(&mut *data), value)
        };
        if changed {
            self.touch();
        }
        changed
    }

    /// Marks a clean item as changed after an attribute edit.
    pub(crate) fn touch(&self) {
        let mut data = self.data_mut();
        if data.status == SyncStatus::Clean {
            data.status = SyncStatus::Changed;
        }
    }
}

/// Assigns `value` to `slot` if different; returns whether it changed.
pub(crate) fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Builder for new items of any kind.
#[derive(Debug)]
pub struct ItemBuilder {
    kind: ItemKind,
    id: Option<ItemId>,
    status: SyncStatus,
    subject: String,
    description: String,
    style: Style,
    parent: Option<Item>,
    children: Vec<Item>,
    expanded_contexts: BTreeSet<String>,
    categories: Vec<Category>,
    notes: Vec<Item>,
    attachments: Vec<Item>,
    task: TaskFields,
    attachment: AttachmentFields,
}

impl ItemBuilder {
    fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            id: None,
            status: SyncStatus::New,
            subject: String::new(),
            description: String::new(),
            style: Style::default(),
            parent: None,
            children: Vec::new(),
            expanded_contexts: BTreeSet::new(),
            categories: Vec::new(),
            notes: Vec::new(),
            attachments: Vec::new(),
            task: TaskFields::default(),
            attachment: AttachmentFields::default(),
        }
    }

    /// Reuses an existing identity (import paths).
    pub fn id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub(crate) fn status(mut self, status: SyncStatus) -> Self {
        self.status = status;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn fg_color(mut self, color: impl Into<Color>) -> Self {
        self.style.fg_color = Some(color.into());
        self
    }

    pub fn bg_color(mut self, color: impl Into<Color>) -> Self {
        self.style.bg_color = Some(color.into());
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.style.font = Some(font);
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.style.icon = icon.into();
        self
    }

    pub fn selected_icon(mut self, icon: impl Into<String>) -> Self {
        self.style.selected_icon = icon.into();
        self
    }

    pub(crate) fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Links the new item to `parent` without adding it to the parent's
    /// children.
    pub fn parent(mut self, parent: &Item) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub(crate) fn parent_opt(mut self, parent: Option<Item>) -> Self {
        self.parent = parent;
        self
    }

    /// Children become owned by the new item and point back at it.
    pub fn children(mut self, children: impl IntoIterator<Item = Item>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn expanded(mut self, context: impl Into<String>) -> Self {
        self.expanded_contexts.insert(context.into());
        self
    }

    pub(crate) fn expanded_contexts(mut self, contexts: BTreeSet<String>) -> Self {
        self.expanded_contexts = contexts;
        self
    }

    /// Category references; the categories' member sets are not touched.
    pub fn categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories.extend(categories);
        self
    }

    pub fn notes(mut self, notes: impl IntoIterator<Item = Item>) -> Self {
        self.notes.extend(notes);
        self
    }

    pub fn attachments(mut self, attachments: impl IntoIterator<Item = Item>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    pub(crate) fn task_fields(mut self, fields: TaskFields) -> Self {
        self.task = fields;
        self
    }

    pub fn planned_start(mut self, at: chrono::NaiveDateTime) -> Self {
        self.task.planned_start = Some(at);
        self
    }

    pub fn due(mut self, at: chrono::NaiveDateTime) -> Self {
        self.task.due = Some(at);
        self
    }

    pub fn completion(mut self, at: chrono::NaiveDateTime) -> Self {
        self.task.completion = Some(at);
        self
    }

    pub fn recurrence(mut self, recurrence: crate::model::recurrence::Recurrence) -> Self {
        self.task.recurrence = recurrence;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.attachment.location = location.into();
        self
    }

    pub fn attachment_type(mut self, kind: crate::model::attachment::AttachmentType) -> Self {
        self.attachment.kind = kind;
        self
    }

    pub(crate) fn attachment_fields(mut self, fields: AttachmentFields) -> Self {
        self.attachment = fields;
        self
    }

    pub fn build(self) -> Item {
        let item = Item(Rc::new(RefCell::new(ItemData {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            kind: self.kind,
            status: self.status,
            subject: self.subject,
            description: self.description,
            style: self.style,
            parent: self.parent.as_ref().map(Item::downgrade),
            children: Vec::new(),
            expanded_contexts: self.expanded_contexts,
            categories: categorizable::new_category_set(self.categories),
            notes: OwnedItems::from(self.notes),
            attachments: OwnedItems::from(self.attachments),
            task: self.task,
            category: CategoryFields::default(),
            attachment: self.attachment,
        })));
        for child in &self.children {
            child.data_mut().parent = Some(item.downgrade());
        }
        item.data_mut().children = self.children;
        item
    }

    pub fn build_task(self) -> Result<Task, ItemError> {
        Task::try_from(self.build())
    }

    pub fn build_category(self) -> Result<Category, ItemError> {
        Category::try_from(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemError, ItemKind};
    use crate::model::style::Color;

    #[test]
    fn event_types_are_parameterised_by_kind() {
        assert_eq!(ItemKind::Task.subject_changed_event_type().as_str(), "task.subject");
        assert_eq!(ItemKind::Note.fg_color_changed_event_type().as_str(), "note.fgColor");
        assert_ne!(
            ItemKind::Task.subject_changed_event_type(),
            ItemKind::Category.subject_changed_event_type()
        );
    }

    #[test]
    fn items_compare_by_identity() {
        let first = Item::builder(ItemKind::Note).subject("same").build();
        let second = Item::builder(ItemKind::Note).subject("same").build();
        assert_ne!(first, second);
        assert_eq!(first, first.clone());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn setting_same_value_reports_no_change() {
        let note = Item::builder(ItemKind::Note).subject("a").build();
        assert!(!note.set_subject("a"));
        assert!(note.set_subject("b"));
        assert!(!note.set_fg_color(None));
        assert!(note.set_fg_color(Some(Color::rgb(1, 2, 3))));
    }

    #[test]
    fn narrowing_to_wrong_kind_fails() {
        let err = Item::builder(ItemKind::Note).build_task().unwrap_err();
        assert_eq!(
            err,
            ItemError::KindMismatch {
                expected: ItemKind::Task,
                actual: ItemKind::Note
            }
        );
    }

    #[test]
    fn recursive_subject_joins_ancestors() {
        let root = Item::builder(ItemKind::Task).subject("root").build();
        let child = Item::builder(ItemKind::Task)
            .subject("child")
            .parent(&root)
            .build();
        assert_eq!(child.subject(true), "root -> child");
        assert_eq!(child.subject(false), "child");
    }
}
