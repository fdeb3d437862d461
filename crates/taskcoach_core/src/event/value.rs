//! Event type names, event sources and the values events carry.

use crate::model::category::Category;
use crate::model::item::Item;
use crate::model::recurrence::Recurrence;
use crate::model::status::SyncStatus;
use crate::model::style::{Color, Font};
use crate::model::task::Task;
use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Dotted event channel name such as `task.subject` or `category.filter`.
///
/// Domain event types embed the class name of the emitting kind, so each kind
/// publishes on its own channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventType(String);

impl EventType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Builds `<class>.<topic>`.
    pub fn for_class(class_name: &str, topic: &str) -> Self {
        Self(format!("{class_name}.{topic}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&EventType> for EventType {
    fn from(value: &EventType) -> Self {
        value.clone()
    }
}

/// Process-unique identity for non-item participants (collections, sorters,
/// observers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Originator of one `(type, source, values)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// A domain item, compared by handle identity.
    Item(Item),
    /// A collection, sorter or other registered participant.
    Instance(InstanceId),
    /// The registry itself (meta-events).
    Publisher,
}

impl EventSource {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }
}

impl From<Item> for EventSource {
    fn from(value: Item) -> Self {
        Self::Item(value)
    }
}

impl From<&Item> for EventSource {
    fn from(value: &Item) -> Self {
        Self::Item(value.clone())
    }
}

impl From<&Category> for EventSource {
    fn from(value: &Category) -> Self {
        Self::Item(value.item().clone())
    }
}

impl From<&Task> for EventSource {
    fn from(value: &Task) -> Self {
        Self::Item(value.item().clone())
    }
}

impl From<InstanceId> for EventSource {
    fn from(value: InstanceId) -> Self {
        Self::Instance(value)
    }
}

impl From<&EventSource> for EventSource {
    fn from(value: &EventSource) -> Self {
        value.clone()
    }
}

/// Payload attached to an event entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    Text(String),
    Bool(bool),
    Status(SyncStatus),
    Color(Option<Color>),
    Font(Option<Font>),
    Item(Item),
    DateTime(Option<NaiveDateTime>),
    Recurrence(Recurrence),
    EventType(EventType),
}

impl EventValue {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => *color,
            _ => None,
        }
    }

    pub fn as_status(&self) -> Option<SyncStatus> {
        match self {
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<&Item> for EventValue {
    fn from(value: &Item) -> Self {
        Self::Item(value.clone())
    }
}

impl From<&Category> for EventValue {
    fn from(value: &Category) -> Self {
        Self::Item(value.item().clone())
    }
}
