//! Sort keys and the events that invalidate them, per item kind.

use crate::event::EventType;
use crate::model::item::{Item, ItemKind};
use crate::model::task::Task;
use chrono::NaiveDateTime;

/// Comparable projection of an item for one sort attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Text(String),
    /// Undated items order after dated ones.
    Date {
        undated: bool,
        at: Option<NaiveDateTime>,
    },
}

impl SortValue {
    fn date(at: Option<NaiveDateTime>) -> Self {
        Self::Date {
            undated: at.is_none(),
            at,
        }
    }
}

pub type SortKey = Box<dyn Fn(&Item) -> SortValue>;

pub const SORT_BY_SUBJECT: &str = "subject";

impl ItemKind {
    /// Key function for `attribute`, or `None` if the kind cannot sort by it.
    ///
    /// In list mode the subject key is the full `parent -> child` path so
    /// children stay next to their parents.
    pub fn sort_function(
        self,
        attribute: &str,
        case_sensitive: bool,
        tree_mode: bool,
    ) -> Option<SortKey> {
        let fold = move |text: String| {
            if case_sensitive {
                text
            } else {
                text.to_lowercase()
            }
        };
        let key: SortKey = match attribute {
            SORT_BY_SUBJECT => {
                Box::new(move |item: &Item| SortValue::Text(fold(item.subject(!tree_mode))))
            }
            "description" => Box::new(move |item: &Item| SortValue::Text(fold(item.description()))),
            "categories" if self.is_categorizable() => Box::new(move |item: &Item| {
                let mut subjects: Vec<String> = item
                    .categories(false, false)
                    .iter()
                    .map(|category| fold(category.subject(true)))
                    .collect();
                subjects.sort();
                SortValue::Text(subjects.join(", "))
            }),
            "plannedStartDateTime" if self == ItemKind::Task => {
                Box::new(|item: &Item| SortValue::date(task_date(item, Task::planned_start_date_time)))
            }
            "dueDateTime" if self == ItemKind::Task => {
                Box::new(|item: &Item| SortValue::date(task_date(item, Task::due_date_time)))
            }
            "completionDateTime" if self == ItemKind::Task => {
                Box::new(|item: &Item| SortValue::date(task_date(item, Task::completion_date_time)))
            }
            _ => return None,
        };
        Some(key)
    }

    /// Event types after which a key for `attribute` may have changed.
    pub fn sort_event_types(self, attribute: &str) -> Option<Vec<EventType>> {
        let types = match attribute {
            SORT_BY_SUBJECT => vec![self.subject_changed_event_type()],
            "description" => vec![self.description_changed_event_type()],
            "categories" if self.is_categorizable() => vec![
                self.category_added_event_type(),
                self.category_removed_event_type(),
                self.category_subject_changed_event_type(),
            ],
            "plannedStartDateTime" if self == ItemKind::Task => {
                vec![self.planned_start_changed_event_type()]
            }
            "dueDateTime" if self == ItemKind::Task => vec![self.due_changed_event_type()],
            "completionDateTime" if self == ItemKind::Task => {
                vec![self.completion_changed_event_type()]
            }
            _ => return None,
        };
        Some(types)
    }
}

fn task_date(item: &Item, field: fn(&Task) -> Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    Task::try_from(item.clone()).ok().and_then(|task| field(&task))
}
