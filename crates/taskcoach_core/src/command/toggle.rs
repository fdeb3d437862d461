//! Toggle commands for category membership and task completion.
//!
//! # Invariants
//! - Each selected item is toggled on its own: an item that has the
//!   category loses it, an item that lacks it gains it.
//! - Linking to a category whose parent has exclusive subcategories unlinks
//!   the sibling categories (and their subcategories) in the same event.
//! - Linking to a category with exclusive subcategories unlinks those
//!   subcategories; linking to one of them unlinks the exclusive parent.
//! - Toggling a recurring open task advances it to its next occurrence
//!   instead of completing it.

use crate::command::history::Command;
use crate::command::save_state::SaveState;
use crate::event::Event;
use crate::model::category::{link_in, unlink_in, Category};
use crate::model::item::Item;
use crate::model::task::Task;
use chrono::{Local, NaiveDateTime};

#[derive(Debug)]
pub struct ToggleCategoryCommand {
    items: Vec<Item>,
    category: Category,
    save_state: SaveState,
}

impl ToggleCategoryCommand {
    pub fn new(items: &[Item], category: &Category) -> Self {
        let items: Vec<Item> = items
            .iter()
            .filter(|item| item.is_categorizable())
            .cloned()
            .collect();
        let root = category
            .ancestors()
            .into_iter()
            .next()
            .unwrap_or_else(|| category.item().clone());
        let affected: Vec<Item> = items
            .iter()
            .cloned()
            .chain(std::iter::once(root.clone()))
            .chain(root.children(true))
            .collect();
        let save_state = SaveState::capture(affected);
        Self {
            items,
            category: category.clone(),
            save_state,
        }
    }

    fn toggle_in(&self, item: &Item, event: &mut Event) {
        if item.has_category(&self.category) {
            unlink_in(item, &self.category, event);
            return;
        }
        link_in(item, &self.category, event);
        if let Some(parent) = self
            .category
            .parent_category()
            .filter(Category::has_exclusive_subcategories)
        {
            for sibling in parent.subcategories() {
                if sibling != self.category {
                    unlink_subtree_in(item, &sibling, event);
                }
            }
            unlink_in(item, &parent, event);
        }
        if self.category.has_exclusive_subcategories() {
            for subcategory in self.category.subcategories() {
                unlink_subtree_in(item, &subcategory, event);
            }
        }
    }
}

fn unlink_subtree_in(item: &Item, category: &Category, event: &mut Event) {
    unlink_in(item, category, event);
    for nested in category
        .children(true)
        .into_iter()
        .filter_map(|nested| Category::try_from(nested).ok())
    {
        unlink_in(item, &nested, event);
    }
}

impl Command for ToggleCategoryCommand {
    fn name(&self) -> &str {
        "Toggle category"
    }

    fn can_do(&self) -> bool {
        !self.items.is_empty()
    }

    fn do_command(&mut self) {
        Event::batch(|event| {
            for item in &self.items {
                self.toggle_in(item, event);
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

#[derive(Debug)]
pub struct ToggleCompletionCommand {
    tasks: Vec<Task>,
    at: NaiveDateTime,
    save_state: SaveState,
}

impl ToggleCompletionCommand {
    /// Toggles `tasks`, completing open ones at the current local time.
    pub fn new(tasks: &[Task]) -> Self {
        Self::at(tasks, Local::now().naive_local())
    }

    pub fn at(tasks: &[Task], at: NaiveDateTime) -> Self {
        let affected = tasks
            .iter()
            .flat_map(|task| std::iter::once(task.item().clone()).chain(task.children(true)));
        Self {
            tasks: tasks.to_vec(),
            at,
            save_state: SaveState::capture(affected),
        }
    }
}

impl Command for ToggleCompletionCommand {
    fn name(&self) -> &str {
        "Toggle completion"
    }

    fn can_do(&self) -> bool {
        !self.tasks.is_empty()
    }

    fn do_command(&mut self) {
        Event::batch(|event| {
            for task in &self.tasks {
                let next = if task.completed() { None } else { Some(self.at) };
                task.set_completion_date_time_in(next, event);
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
