//! Create, delete and edit commands.
//!
//! # Responsibility
//! - `NewItemCommand` / `NewSubItemCommand`: add fresh items to a collection.
//! - `DeleteCommand`: remove items (with descendants) and mark them deleted.
//! - `EditCommand`: apply a list of attribute edits to several items.
//!
//! # Invariants
//! - Adding below a completed task re-opens it and its completed ancestors.
//! - Undo of delete restores membership, category links and sync status.

use crate::collection::ItemCollection;
use crate::command::history::Command;
use crate::command::save_state::SaveState;
use crate::command::{completion_chain, reopen_chain_in, top_level};
use crate::event::Event;
use crate::model::item::Item;
use crate::model::recurrence::Recurrence;
use crate::model::style::{Color, Font};
use crate::model::task::Task;
use chrono::NaiveDateTime;

/// Adds new root items to a collection.
#[derive(Debug)]
pub struct NewItemCommand {
    name: String,
    collection: ItemCollection,
    items: Vec<Item>,
}

impl NewItemCommand {
    pub fn new(collection: &ItemCollection, items: Vec<Item>) -> Self {
        Self {
            name: format!("New {}", collection.kind().class_name()),
            collection: collection.clone(),
            items,
        }
    }

    /// One new item of the collection's kind.
    pub fn with_subject(collection: &ItemCollection, subject: impl Into<String>) -> Self {
        let item = Item::builder(collection.kind()).subject(subject).build();
        Self::new(collection, vec![item])
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl Command for NewItemCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_do(&self) -> bool {
        !self.items.is_empty()
    }

    fn do_command(&mut self) {
        self.collection.extend(&self.items);
    }

    fn undo_command(&mut self) {
        self.collection.remove_items(&self.items);
    }
}

/// Adds one new child below an existing member.
#[derive(Debug)]
pub struct NewSubItemCommand {
    name: String,
    collection: ItemCollection,
    parent: Item,
    items: Vec<Item>,
    save_state: SaveState,
}

impl NewSubItemCommand {
    pub fn new(collection: &ItemCollection, parent: &Item, subject: impl Into<String>) -> Self {
        let child = parent.new_child().subject(subject).build();
        Self {
            name: format!("New sub{}", parent.kind().class_name()),
            collection: collection.clone(),
            parent: parent.clone(),
            items: vec![child],
            save_state: SaveState::capture(completion_chain(parent)),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl Command for NewSubItemCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_do(&self) -> bool {
        self.collection.contains(&self.parent)
    }

    fn do_command(&mut self) {
        Event::batch(|event| {
            self.collection.extend_in(&self.items, event);
            reopen_chain_in(&self.parent, event);
        });
    }

    fn undo_command(&mut self) {
        Event::batch(|event| {
            self.save_state.undo_states_in(event);
            self.collection.remove_items_in(&self.items, event);
        });
    }

    fn redo_command(&mut self) {
        Event::batch(|event| {
            self.collection.extend_in(&self.items, event);
            self.save_state.redo_states_in(event);
        });
    }
}

/// Removes items and their descendants, marking them deleted.
#[derive(Debug)]
pub struct DeleteCommand {
    collection: ItemCollection,
    items: Vec<Item>,
    save_state: SaveState,
}

impl DeleteCommand {
    pub fn new(collection: &ItemCollection, items: &[Item]) -> Self {
        let items = top_level(items);
        let affected: Vec<Item> = items
            .iter()
            .flat_map(|item| std::iter::once(item.clone()).chain(item.children(true)))
            .collect();
        Self {
            collection: collection.clone(),
            items,
            save_state: SaveState::capture(affected),
        }
    }
}

impl Command for DeleteCommand {
    fn name(&self) -> &str {
        "Delete"
    }

    fn can_do(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| self.collection.contains(item))
    }

    fn do_command(&mut self) {
        Event::batch(|event| {
            self.collection.remove_items_in(&self.items, event);
            for item in &self.items {
                item.mark_deleted_in(event);
            }
        });
    }

    fn undo_command(&mut self) {
        Event::batch(|event| {
            self.collection.extend_in(&self.items, event);
            self.save_state.undo_states_in(event);
        });
    }
}

/// One attribute change applied by `EditCommand`.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Subject(String),
    Description(String),
    FgColor(Option<Color>),
    BgColor(Option<Color>),
    Font(Option<Font>),
    Icon(String),
    SelectedIcon(String),
    /// Tasks only.
    PlannedStart(Option<NaiveDateTime>),
    /// Tasks only.
    Due(Option<NaiveDateTime>),
    /// Tasks only.
    Recurrence(Recurrence),
    /// Attachments only.
    Location(String),
}

impl Edit {
    /// Applies the edit; task-only edits are skipped for other kinds.
    pub fn apply_in(&self, item: &Item, event: &mut Event) -> bool {
        match self {
            Self::Subject(subject) => item.set_subject_in(subject.clone(), event),
            Self::Description(description) => item.set_description_in(description.clone(), event),
            Self::FgColor(color) => item.set_fg_color_in(*color, event),
            Self::BgColor(color) => item.set_bg_color_in(*color, event),
            Self::Font(font) => item.set_font_in(font.clone(), event),
            Self::Icon(icon) => item.set_icon_in(icon.clone(), event),
            Self::SelectedIcon(icon) => item.set_selected_icon_in(icon.clone(), event),
            Self::PlannedStart(at) => Task::try_from(item.clone())
                .map(|task| task.set_planned_start_date_time_in(*at, event))
                .unwrap_or(false),
            Self::Due(at) => Task::try_from(item.clone())
                .map(|task| task.set_due_date_time_in(*at, event))
                .unwrap_or(false),
            Self::Recurrence(recurrence) => Task::try_from(item.clone())
                .map(|task| task.set_recurrence_in(*recurrence, event))
                .unwrap_or(false),
            Self::Location(location) => item.set_location_in(location.clone(), event),
        }
    }
}

/// Applies a list of edits to several items at once.
#[derive(Debug)]
pub struct EditCommand {
    items: Vec<Item>,
    edits: Vec<Edit>,
    save_state: SaveState,
}

impl EditCommand {
    pub fn new(items: &[Item], edits: Vec<Edit>) -> Self {
        Self {
            items: items.to_vec(),
            edits,
            save_state: SaveState::capture(items.iter().cloned()),
        }
    }
}

impl Command for EditCommand {
    fn name(&self) -> &str {
        "Edit"
    }

    fn can_do(&self) -> bool {
        !self.items.is_empty() && !self.edits.is_empty()
    }

    fn do_command(&mut self) {
        Event::batch(|event| {
            for item in &self.items {
                for edit in &self.edits {
                    edit.apply_in(item, event);
                }
            }
        });
    }

    fn undo_command(&mut self) {
        self.save_state.undo_states();
    }

    fn redo_command(&mut self) {
        self.save_state.redo_states();
    }
}
