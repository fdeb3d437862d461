//! Coalesced notification packet.
//!
//! # Responsibility
//! - Accumulate `(type, source, values)` entries produced by one logical
//!   operation so observers see a single notification.
//! - Project onto the `(type, source)` pairs a given observer asked for.
//!
//! # Invariants
//! - Values are deduplicated per `(type, source)`.
//! - Equality compares the type -> source -> values maps, ignoring insertion order.

use crate::event::publisher::Publisher;
use crate::event::value::{EventSource, EventType, EventValue};
use indexmap::IndexMap;

type SourceValues = IndexMap<EventSource, Vec<EventValue>>;

/// One notification, possibly covering many types and sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    entries: IndexMap<EventType, SourceValues>,
}

impl Event {
    /// Creates an empty event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an event with one `(type, source, values)` entry.
    pub fn with_source(
        event_type: impl Into<EventType>,
        source: impl Into<EventSource>,
        values: impl IntoIterator<Item = EventValue>,
    ) -> Self {
        let mut event = Self::new();
        event.add_source(event_type, source, values);
        event
    }

    /// Runs `operation` with a fresh event and sends it afterwards.
    ///
    /// Mutators that take `&mut Event` only contribute entries; this is the
    /// scope that turns their contributions into one delivered notification.
    pub fn batch<R>(operation: impl FnOnce(&mut Event) -> R) -> R {
        let mut event = Event::new();
        let result = operation(&mut event);
        event.send();
        result
    }

    /// Appends `values` for `source` under `event_type`.
    pub fn add_source(
        &mut self,
        event_type: impl Into<EventType>,
        source: impl Into<EventSource>,
        values: impl IntoIterator<Item = EventValue>,
    ) {
        let bucket = self
            .entries
            .entry(event_type.into())
            .or_default()
            .entry(source.into())
            .or_default();
        for value in values {
            if !bucket.contains(&value) {
                bucket.push(value);
            }
        }
    }

    /// Appends values under the event's only type.
    ///
    /// Returns `false` (and adds nothing) when the event has zero or several
    /// types.
    pub fn add_source_to_sole_type(
        &mut self,
        source: impl Into<EventSource>,
        values: impl IntoIterator<Item = EventValue>,
    ) -> bool {
        if self.entries.len() != 1 {
            return false;
        }
        let Some(event_type) = self.entries.keys().next().cloned() else {
            return false;
        };
        self.add_source(event_type, source, values);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Event types in insertion order.
    pub fn types(&self) -> Vec<EventType> {
        self.entries.keys().cloned().collect()
    }

    pub fn has_type(&self, event_type: &EventType) -> bool {
        self.entries.contains_key(event_type)
    }

    /// Sources registered for any of `types`, or for every type when `types`
    /// is empty. Each source appears once.
    pub fn sources(&self, types: &[EventType]) -> Vec<EventSource> {
        let mut result: Vec<EventSource> = Vec::new();
        for (event_type, sources) in &self.entries {
            if !types.is_empty() && !types.contains(event_type) {
                continue;
            }
            for source in sources.keys() {
                if !result.contains(source) {
                    result.push(source.clone());
                }
            }
        }
        result
    }

    /// Values for `(type, source)`.
    ///
    /// A missing type defaults to the first type; a missing source defaults to
    /// the first source of that type.
    pub fn values(
        &self,
        source: Option<&EventSource>,
        event_type: Option<&EventType>,
    ) -> Vec<EventValue> {
        let sources = match event_type {
            Some(event_type) => self.entries.get(event_type),
            None => self.entries.values().next(),
        };
        let Some(sources) = sources else {
            return Vec::new();
        };
        let values = match source {
            Some(source) => sources.get(source),
            None => sources.values().next(),
        };
        values.cloned().unwrap_or_default()
    }

    /// First value for `(type, source)`, with the defaults of [`Event::values`].
    pub fn value(
        &self,
        source: Option<&EventSource>,
        event_type: Option<&EventType>,
    ) -> Option<EventValue> {
        self.values(source, event_type).into_iter().next()
    }

    /// Items carried as values for `(type, source)`.
    pub fn items(
        &self,
        source: Option<&EventSource>,
        event_type: Option<&EventType>,
    ) -> Vec<crate::model::item::Item> {
        self.values(source, event_type)
            .into_iter()
            .filter_map(|value| match value {
                EventValue::Item(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    /// Projection onto the given `(type, source)` pairs. A `None` source
    /// selects every source of that type.
    pub fn sub_event(&self, pairs: &[(EventType, Option<EventSource>)]) -> Event {
        let mut result = Event::new();
        for (event_type, source) in pairs {
            let Some(sources) = self.entries.get(event_type) else {
                continue;
            };
            match source {
                Some(source) => {
                    if let Some(values) = sources.get(source) {
                        result.add_source(event_type, source, values.iter().cloned());
                    }
                }
                None => {
                    for (source, values) in sources {
                        result.add_source(event_type, source, values.iter().cloned());
                    }
                }
            }
        }
        result
    }

    /// Delivers this event through the thread's publisher.
    pub fn send(&self) {
        if self.is_empty() {
            return;
        }
        Publisher::notify_observers(self);
    }
}

#[cfg(test)]
mod tests {
    use super::Event;
    use crate::event::value::{EventSource, EventType, EventValue, InstanceId};

    fn source() -> EventSource {
        EventSource::Instance(InstanceId::next())
    }

    #[test]
    fn add_source_deduplicates_values_per_source() {
        let origin = source();
        let mut event = Event::with_source("t", origin.clone(), [EventValue::Bool(true)]);
        event.add_source("t", origin.clone(), [EventValue::Bool(true), EventValue::Bool(false)]);

        assert_eq!(
            event.values(Some(&origin), None),
            vec![EventValue::Bool(true), EventValue::Bool(false)]
        );
    }

    #[test]
    fn sole_type_default_applies_only_when_unambiguous() {
        let mut event = Event::with_source("only", source(), []);
        assert!(event.add_source_to_sole_type(source(), [EventValue::Bool(true)]));

        event.add_source("other", source(), []);
        assert!(!event.add_source_to_sole_type(source(), []));
    }

    #[test]
    fn sub_event_with_none_source_keeps_every_source_of_that_type() {
        let first = source();
        let second = source();
        let mut event = Event::new();
        event.add_source("a", first.clone(), [EventValue::Bool(true)]);
        event.add_source("a", second.clone(), [EventValue::Bool(false)]);
        event.add_source("b", first.clone(), []);

        let projected = event.sub_event(&[(EventType::from("a"), None)]);
        assert_eq!(projected.types(), vec![EventType::from("a")]);
        assert_eq!(projected.sources(&[]), vec![first.clone(), second]);

        let narrow = event.sub_event(&[(EventType::from("a"), Some(first.clone()))]);
        assert_eq!(narrow.sources(&[]), vec![first]);
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let first = source();
        let second = source();
        let mut left = Event::new();
        left.add_source("a", first.clone(), []);
        left.add_source("b", second.clone(), []);
        let mut right = Event::new();
        right.add_source("b", second, []);
        right.add_source("a", first, []);

        assert_eq!(left, right);
    }
}
