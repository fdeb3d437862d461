//! Restore and copy snapshots of items.
//!
//! # Responsibility
//! - `snapshot_for_restore`/`restore`: capture and re-apply an item's state
//!   in place (same id, same links) for undo/redo.
//! - `snapshot_for_copy`/`from_copy_snapshot`: duplicate an item with fresh
//!   ids for itself, its children and its owned notes and attachments.
//!
//! # Invariants
//! - Restoring sends one event per call; child-list differences are reported
//!   as one add-child entry and one remove-child entry.
//! - A copy starts as `New`, has no parent and shares category references.
//! - A copied recurrence starts with a zero count.

use crate::event::{Event, EventValue};
use crate::model::attachment::AttachmentFields;
use crate::model::category::Category;
use crate::model::item::{Item, ItemKind, WeakItem};
use crate::model::status::{restore_signal, SyncStatus};
use crate::model::style::Style;
use crate::model::task::{Task, TaskFields};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
struct ObjectState {
    status: SyncStatus,
    subject: String,
    description: String,
    style: Style,
}

#[derive(Debug, Clone)]
struct CompositeState {
    parent: Option<Item>,
    children: Vec<Item>,
    expanded_contexts: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct OwnedState {
    notes: Vec<Item>,
    attachments: Vec<Item>,
}

#[derive(Debug, Clone)]
enum DetailState {
    Plain,
    Task(TaskFields),
    Category {
        categorizables: Vec<Item>,
        filtered: bool,
        exclusive_subcategories: bool,
    },
    Attachment(AttachmentFields),
}

/// Opaque in-place state of one item.
#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    object: ObjectState,
    composite: CompositeState,
    categories: Vec<Category>,
    owned: OwnedState,
    detail: DetailState,
}

/// Everything needed to build an independent duplicate of an item.
#[derive(Debug, Clone)]
pub struct CopySnapshot {
    kind: ItemKind,
    subject: String,
    description: String,
    style: Style,
    expanded_contexts: BTreeSet<String>,
    children: Vec<Item>,
    categories: Vec<Category>,
    notes: Vec<Item>,
    attachments: Vec<Item>,
    task: TaskFields,
    attachment: AttachmentFields,
    filtered: bool,
    exclusive_subcategories: bool,
}

impl Item {
    pub fn snapshot_for_restore(&self) -> ItemSnapshot {
        let data = self.data();
        let detail = match data.kind {
            ItemKind::Task => DetailState::Task(data.task.clone()),
            ItemKind::Category => DetailState::Category {
                categorizables: data
                    .category
                    .categorizables
                    .values()
                    .iter()
                    .filter_map(WeakItem::upgrade)
                    .collect(),
                filtered: data.category.filtered,
                exclusive_subcategories: data.category.exclusive_subcategories,
            },
            ItemKind::Attachment => DetailState::Attachment(data.attachment.clone()),
            ItemKind::Note => DetailState::Plain,
        };
        ItemSnapshot {
            object: ObjectState {
                status: data.status,
                subject: data.subject.clone(),
                description: data.description.clone(),
                style: data.style.clone(),
            },
            composite: CompositeState {
                parent: data.parent.as_ref().and_then(Item::upgrade),
                children: data.children.clone(),
                expanded_contexts: data.expanded_contexts.clone(),
            },
            categories: data.categories.values().to_vec(),
            owned: OwnedState {
                notes: data.notes.items().to_vec(),
                attachments: data.attachments.items().to_vec(),
            },
            detail,
        }
    }

    pub fn restore(&self, snapshot: &ItemSnapshot) {
        Event::batch(|event| self.restore_in(snapshot, event))
    }

    /// Re-applies `snapshot`, adding every resulting change to `event`.
    pub fn restore_in(&self, snapshot: &ItemSnapshot, event: &mut Event) {
        let previous_status = self.status();

        self.restore_object_in(&snapshot.object, event);
        self.restore_composite_in(&snapshot.composite, event);
        self.set_categories_in(&snapshot.categories, event);
        self.set_notes_in(&snapshot.owned.notes, event);
        self.set_attachments_in(&snapshot.owned.attachments, event);
        self.restore_detail_in(&snapshot.detail, event);

        let status = snapshot.object.status;
        self.data_mut().status = status;
        self.publish_status_signal(restore_signal(previous_status, status), status, event);
    }

    fn restore_object_in(&self, state: &ObjectState, event: &mut Event) {
        self.set_subject_in(state.subject.clone(), event);
        self.set_description_in(state.description.clone(), event);
        self.set_fg_color_in(state.style.fg_color, event);
        self.set_bg_color_in(state.style.bg_color, event);
        self.set_font_in(state.style.font.clone(), event);
        self.set_icon_in(state.style.icon.clone(), event);
        self.set_selected_icon_in(state.style.selected_icon.clone(), event);
    }

    fn restore_composite_in(&self, state: &CompositeState, event: &mut Event) {
        self.set_parent(state.parent.as_ref());

        let current = self.children(false);
        let added: Vec<Item> = state
            .children
            .iter()
            .filter(|child| !current.contains(child))
            .cloned()
            .collect();
        let removed: Vec<Item> = current
            .iter()
            .filter(|child| !state.children.contains(child))
            .cloned()
            .collect();
        self.data_mut().children = state.children.clone();
        for child in &state.children {
            child.set_parent(Some(self));
        }
        if !added.is_empty() {
            event.add_source(
                self.kind().add_child_event_type(),
                self,
                added.iter().map(EventValue::from),
            );
        }
        if !removed.is_empty() {
            event.add_source(
                self.kind().remove_child_event_type(),
                self,
                removed.iter().map(EventValue::from),
            );
        }

        let contexts_changed = {
            let mut data = self.data_mut();
            if data.expanded_contexts == state.expanded_contexts {
                false
            } else {
                data.expanded_contexts = state.expanded_contexts.clone();
                true
            }
        };
        if contexts_changed {
            event.add_source(
                self.kind().expansion_changed_event_type(),
                self,
                state
                    .expanded_contexts
                    .iter()
                    .map(|context| EventValue::Text(context.clone())),
            );
        }
    }

    fn restore_detail_in(&self, state: &DetailState, event: &mut Event) {
        match state {
            DetailState::Plain => {}
            DetailState::Task(fields) => {
                if let Ok(task) = Task::try_from(self.clone()) {
                    task.set_planned_start_date_time_in(fields.planned_start, event);
                    task.set_due_date_time_in(fields.due, event);
                    task.set_recurrence_in(fields.recurrence, event);
                    task.replace_completion_in(fields.completion, event);
                }
            }
            DetailState::Category {
                categorizables,
                filtered,
                exclusive_subcategories,
            } => {
                if let Ok(category) = Category::try_from(self.clone()) {
                    category.set_categorizables_in(categorizables, event);
                    category.set_filtered_in(*filtered, event);
                    if self.replace_field(
                        |data| &mut data.category.exclusive_subcategories,
                        *exclusive_subcategories,
                    ) {
                        event.add_source(
                            self.kind().exclusive_subcategories_changed_event_type(),
                            self,
                            [EventValue::Bool(*exclusive_subcategories)],
                        );
                    }
                }
            }
            DetailState::Attachment(fields) => {
                self.set_location_in(fields.location.clone(), event);
                self.data_mut().attachment.kind = fields.kind;
            }
        }
    }

    /// Copy state: children, notes and attachments are copied recursively.
    pub fn snapshot_for_copy(&self) -> CopySnapshot {
        let children: Vec<Item> = self.children(false).iter().map(Item::copy).collect();
        let notes: Vec<Item> = self.notes().iter().map(Item::copy).collect();
        let attachments: Vec<Item> = self.attachments().iter().map(Item::copy).collect();
        let data = self.data();
        let mut task = data.task.clone();
        task.recurrence = task.recurrence.copy();
        CopySnapshot {
            kind: data.kind,
            subject: data.subject.clone(),
            description: data.description.clone(),
            style: data.style.clone(),
            expanded_contexts: data.expanded_contexts.clone(),
            children,
            categories: data.categories.values().to_vec(),
            notes,
            attachments,
            task,
            attachment: data.attachment.clone(),
            filtered: data.category.filtered,
            exclusive_subcategories: data.category.exclusive_subcategories,
        }
    }

    /// Builds a new, parentless item from `snapshot`.
    pub fn from_copy_snapshot(snapshot: CopySnapshot) -> Item {
        let item = Item::builder(snapshot.kind)
            .subject(snapshot.subject)
            .description(snapshot.description)
            .style(snapshot.style)
            .expanded_contexts(snapshot.expanded_contexts)
            .children(snapshot.children)
            .categories(snapshot.categories)
            .notes(snapshot.notes)
            .attachments(snapshot.attachments)
            .task_fields(snapshot.task)
            .attachment_fields(snapshot.attachment)
            .build();
        {
            let mut data = item.data_mut();
            data.category.filtered = snapshot.filtered;
            data.category.exclusive_subcategories = snapshot.exclusive_subcategories;
        }
        item
    }

    /// Independent duplicate with fresh ids throughout the subtree.
    pub fn copy(&self) -> Item {
        Item::from_copy_snapshot(self.snapshot_for_copy())
    }
}
