//! Tasks: categorizable items with planned dates, completion and recurrence.
//!
//! # Responsibility
//! - Expose the task-only date fields and their change events.
//! - Implement completion rules, including recurrence instead of completion.
//!
//! # Invariants
//! - A `Task` handle always wraps an item of kind `Task`.
//! - Completing a task with an active recurrence never sets a completion
//!   date; it advances the dates and counts one occurrence instead.
//! - Completing a non-recurring task completes its open subtasks too.

use crate::event::{Event, EventValue};
use crate::model::item::{Item, ItemError, ItemKind};
use crate::model::recurrence::Recurrence;
use chrono::NaiveDateTime;
use std::ops::Deref;

/// Task-specific fields of `ItemData`.
#[derive(Debug, Clone, Default)]
pub(crate) struct TaskFields {
    pub(crate) planned_start: Option<NaiveDateTime>,
    pub(crate) due: Option<NaiveDateTime>,
    pub(crate) completion: Option<NaiveDateTime>,
    pub(crate) recurrence: Recurrence,
}

/// Handle to an item of kind `Task`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task(Item);

impl Task {
    pub fn new(subject: impl Into<String>) -> Self {
        Self(Item::builder(ItemKind::Task).subject(subject).build())
    }

    pub fn item(&self) -> &Item {
        &self.0
    }

    pub fn into_item(self) -> Item {
        self.0
    }

    pub fn subtasks(&self) -> Vec<Task> {
        self.children(false)
            .into_iter()
            .filter_map(|child| Task::try_from(child).ok())
            .collect()
    }

    pub fn planned_start_date_time(&self) -> Option<NaiveDateTime> {
        self.data().task.planned_start
    }

    pub fn due_date_time(&self) -> Option<NaiveDateTime> {
        self.data().task.due
    }

    pub fn completion_date_time(&self) -> Option<NaiveDateTime> {
        self.data().task.completion
    }

    pub fn recurrence(&self) -> Recurrence {
        self.data().task.recurrence
    }

    pub fn completed(&self) -> bool {
        self.completion_date_time().is_some()
    }

    pub fn set_planned_start_date_time(&self, at: Option<NaiveDateTime>) -> bool {
        Event::batch(|event| self.set_planned_start_date_time_in(at, event))
    }

    pub fn set_planned_start_date_time_in(
        &self,
        at: Option<NaiveDateTime>,
        event: &mut Event,
    ) -> bool {
        if !self.replace_field(|data| &mut data.task.planned_start, at) {
            return false;
        }
        event.add_source(
            self.kind().planned_start_changed_event_type(),
            self,
            [EventValue::DateTime(at)],
        );
        true
    }

    pub fn set_due_date_time(&self, at: Option<NaiveDateTime>) -> bool {
        Event::batch(|event| self.set_due_date_time_in(at, event))
    }

    pub fn set_due_date_time_in(&self, at: Option<NaiveDateTime>, event: &mut Event) -> bool {
        if !self.replace_field(|data| &mut data.task.due, at) {
            return false;
        }
        event.add_source(
            self.kind().due_changed_event_type(),
            self,
            [EventValue::DateTime(at)],
        );
        true
    }

    pub fn set_recurrence(&self, recurrence: Recurrence) -> bool {
        Event::batch(|event| self.set_recurrence_in(recurrence, event))
    }

    /// Replaces the rule; a change of `count` alone also counts as a change.
    pub fn set_recurrence_in(&self, recurrence: Recurrence, event: &mut Event) -> bool {
        let changed = {
            let mut data = self.data_mut();
            if data.task.recurrence.same_state(&recurrence) {
                false
            } else {
                data.task.recurrence = recurrence;
                true
            }
        };
        if !changed {
            return false;
        }
        self.touch();
        event.add_source(
            self.kind().recurrence_changed_event_type(),
            self,
            [EventValue::Recurrence(recurrence)],
        );
        true
    }

    pub fn set_completion_date_time(&self, at: Option<NaiveDateTime>) -> bool {
        Event::batch(|event| self.set_completion_date_time_in(at, event))
    }

    /// Completes (`Some`) or re-opens (`None`) the task.
    ///
    /// With an active recurrence, completing advances to the next occurrence
    /// instead. Completing also completes every open subtask; re-opening
    /// only affects this task.
    pub fn set_completion_date_time_in(
        &self,
        at: Option<NaiveDateTime>,
        event: &mut Event,
    ) -> bool {
        let Some(completed_at) = at else {
            return self.replace_completion_in(None, event);
        };
        if self.recurrence().is_active() {
            return self.recur_in(completed_at, event);
        }
        let changed = self.replace_completion_in(Some(completed_at), event);
        for subtask in self.subtasks() {
            if !subtask.completed() {
                subtask.set_completion_date_time_in(Some(completed_at), event);
            }
        }
        changed
    }

    /// Moves the task to its next occurrence and re-opens it.
    ///
    /// Returns `false` when the recurrence is inactive.
    pub fn recur_in(&self, completed_at: NaiveDateTime, event: &mut Event) -> bool {
        let mut recurrence = self.recurrence();
        let rule = recurrence;
        let start = self.planned_start_date_time();
        let due = self.due_date_time();

        let next = if recurrence.recur_based_on_completion {
            recurrence
                .occurrences(&[Some(completed_at)], true)
                .and_then(|anchor| anchor.into_iter().next().flatten())
                .map(|anchor| rebase(start, due, anchor))
        } else {
            recurrence
                .occurrences(&[start, due], true)
                .and_then(|dates| match dates.as_slice() {
                    [start, due] => Some((*start, *due)),
                    _ => None,
                })
        };
        let Some((next_start, next_due)) = next else {
            return false;
        };

        self.set_planned_start_date_time_in(next_start, event);
        self.set_due_date_time_in(next_due, event);
        self.set_recurrence_in(recurrence, event);
        self.replace_completion_in(None, event);

        for descendant in self.children(true) {
            let Ok(subtask) = Task::try_from(descendant) else {
                continue;
            };
            if subtask.recurrence().is_active() {
                continue;
            }
            subtask.replace_completion_in(None, event);
            let shifted_start = subtask.planned_start_date_time().map(|at| rule.next_date(at));
            let shifted_due = subtask.due_date_time().map(|at| rule.next_date(at));
            subtask.set_planned_start_date_time_in(shifted_start, event);
            subtask.set_due_date_time_in(shifted_due, event);
        }
        true
    }

    /// Sets the completion date without recurrence or subtask rules.
    pub(crate) fn replace_completion_in(&self, at: Option<NaiveDateTime>, event: &mut Event) -> bool {
        if !self.replace_field(|data| &mut data.task.completion, at) {
            return false;
        }
        event.add_source(
            self.kind().completion_changed_event_type(),
            self,
            [EventValue::DateTime(at)],
        );
        true
    }
}

/// Places the due date on `anchor` and keeps the start -> due span. Without
/// a due date the start date lands on `anchor`.
fn rebase(
    start: Option<NaiveDateTime>,
    due: Option<NaiveDateTime>,
    anchor: NaiveDateTime,
) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    match (start, due) {
        (Some(start), Some(due)) => {
            let span = due - start;
            (anchor.checked_sub_signed(span), Some(anchor))
        }
        (None, Some(_)) => (None, Some(anchor)),
        (Some(_), None) => (Some(anchor), None),
        (None, None) => (None, None),
    }
}

impl Deref for Task {
    type Target = Item;

    fn deref(&self) -> &Item {
        &self.0
    }
}

impl TryFrom<Item> for Task {
    type Error = ItemError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        match item.kind() {
            ItemKind::Task => Ok(Self(item)),
            actual => Err(ItemError::KindMismatch {
                expected: ItemKind::Task,
                actual,
            }),
        }
    }
}

impl From<Task> for Item {
    fn from(task: Task) -> Self {
        task.0
    }
}

#[cfg(test)]
mod tests {
    use super::Task;
    use crate::model::item::{Item, ItemKind};
    use crate::model::recurrence::{Recurrence, RecurrenceUnit};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .expect("valid date-time")
    }

    #[test]
    fn completing_parent_completes_open_subtasks() {
        let child = Item::builder(ItemKind::Task).build();
        let parent = Item::builder(ItemKind::Task)
            .children([child.clone()])
            .build_task()
            .expect("task");

        parent.set_completion_date_time(Some(at(2024, 1, 2)));

        let child = Task::try_from(child).expect("task");
        assert_eq!(child.completion_date_time(), Some(at(2024, 1, 2)));
        parent.set_completion_date_time(None);
        assert!(!parent.completed());
        assert!(child.completed());
    }

    #[test]
    fn completing_recurring_task_advances_instead() {
        let rule = Recurrence::new(RecurrenceUnit::Weekly, 1).expect("rule");
        let task = Item::builder(ItemKind::Task)
            .planned_start(at(2024, 1, 1))
            .due(at(2024, 1, 3))
            .recurrence(rule)
            .build_task()
            .expect("task");

        assert!(task.set_completion_date_time(Some(at(2024, 1, 2))));

        assert!(!task.completed());
        assert_eq!(task.planned_start_date_time(), Some(at(2024, 1, 8)));
        assert_eq!(task.due_date_time(), Some(at(2024, 1, 10)));
        assert_eq!(task.recurrence().count, 1);
    }

    #[test]
    fn recurrence_based_on_completion_rebases_dates() {
        let rule = Recurrence::new(RecurrenceUnit::Daily, 2)
            .expect("rule")
            .with_recur_based_on_completion(true);
        let task = Item::builder(ItemKind::Task)
            .planned_start(at(2024, 1, 1))
            .due(at(2024, 1, 3))
            .recurrence(rule)
            .build_task()
            .expect("task");

        task.set_completion_date_time(Some(at(2024, 1, 10)));

        assert_eq!(task.due_date_time(), Some(at(2024, 1, 12)));
        assert_eq!(task.planned_start_date_time(), Some(at(2024, 1, 10)));
    }

    #[test]
    fn exhausted_recurrence_completes_normally() {
        let rule = Recurrence::new(RecurrenceUnit::Daily, 1)
            .expect("rule")
            .with_max(1);
        let task = Item::builder(ItemKind::Task)
            .due(at(2024, 1, 1))
            .recurrence(rule)
            .build_task()
            .expect("task");

        task.set_completion_date_time(Some(at(2024, 1, 1)));
        assert!(!task.completed());
        assert!(!task.recurrence().is_active());

        task.set_completion_date_time(Some(at(2024, 1, 2)));
        assert!(task.completed());
    }
}
