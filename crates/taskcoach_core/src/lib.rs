//! Domain core for a task and note manager.
//! Items (tasks, notes, categories, attachments), their event bus, sorted
//! collections and undoable commands live here; UI and persistence layers
//! sit on top.

pub mod collection;
pub mod command;
pub mod event;
pub mod logging;
pub mod model;

pub use collection::{CollectionError, CollectionResult, ItemCollection, Sorter, SorterConfig};
pub use command::{
    Clipboard, ClipboardContents, Command, CommandError, CommandHistory, CommandResult,
    CopyCommand, CutCommand, DeleteCommand, DragAndDropCommand, Edit, EditCommand,
    NewItemCommand, NewSubItemCommand, PasteCommand, SaveState, ToggleCategoryCommand,
    ToggleCompletionCommand,
};
pub use event::{
    Event, EventSource, EventType, EventValue, InstanceId, Observer, ObserverKey, Publisher,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attachment::AttachmentType;
pub use model::category::{link_in, unlink_in, Category};
pub use model::composite::DEFAULT_EXPANSION_CONTEXT;
pub use model::item::{Item, ItemBuilder, ItemError, ItemId, ItemKind, SUBJECT_SEPARATOR};
pub use model::recurrence::{Recurrence, RecurrenceError, RecurrenceResult, RecurrenceUnit};
pub use model::snapshot::{CopySnapshot, ItemSnapshot};
pub use model::sort_keys::{SortKey, SortValue};
pub use model::status::SyncStatus;
pub use model::style::{Color, ColorParseError, Font, FontStyle, FontWeight, Style, StyleAspect};
pub use model::task::Task;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
