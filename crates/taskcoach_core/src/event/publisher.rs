//! Per-thread observer registry.
//!
//! # Responsibility
//! - Keep `(event type, optional source) -> observers` buckets.
//! - Announce the first registration and the last removal for an event type.
//! - Deliver each sent event to every interested observer exactly once.
//!
//! # Invariants
//! - The registry lives in a thread-local; handles are reached through the
//!   zero-sized [`Publisher`] facade.
//! - No registry borrow is held while observer callbacks run, so callbacks may
//!   register, remove or send freely.
//! - `clear` drops everything without meta-events.

use crate::event::notification::Event;
use crate::event::value::{EventSource, EventType, EventValue, InstanceId};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Meta-event sent before the first observer for a type is stored.
pub const FIRST_OBSERVER_REGISTERED_FOR: &str = "publisher.firstObserverRegisteredFor";
/// Meta-event prefix sent when the last observer for a type is gone.
pub const LAST_OBSERVER_REMOVED_FOR: &str = "publisher.lastObserverRemovedFor";

type Callback = Rc<dyn Fn(&Event)>;
type BucketKey = (EventType, Option<EventSource>);

/// Identity of one registered callback: the owning instance plus a method
/// name, so one instance can register several handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverKey {
    pub instance: InstanceId,
    pub method: &'static str,
}

/// A callback paired with its identity.
#[derive(Clone)]
pub struct Observer {
    key: ObserverKey,
    callback: Callback,
}

impl Observer {
    pub fn new(instance: InstanceId, method: &'static str, callback: impl Fn(&Event) + 'static) -> Self {
        Self {
            key: ObserverKey { instance, method },
            callback: Rc::new(callback),
        }
    }

    pub fn key(&self) -> ObserverKey {
        self.key
    }
}

impl Debug for Observer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer").field("key", &self.key).finish()
    }
}

#[derive(Default)]
struct Registry {
    buckets: IndexMap<BucketKey, IndexMap<ObserverKey, Callback>>,
}

impl Registry {
    fn has_type(&self, event_type: &EventType) -> bool {
        self.buckets
            .iter()
            .any(|((bucket_type, _), observers)| bucket_type == event_type && !observers.is_empty())
    }
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

/// Facade over the thread's observer registry.
pub struct Publisher;

impl Publisher {
    /// Registers `observer` for `event_type`, optionally restricted to `source`.
    ///
    /// When no observer was registered for `event_type` yet, the meta-events
    /// `publisher.firstObserverRegisteredFor` and
    /// `publisher.firstObserverRegisteredFor.<type>` are sent first.
    pub fn register_observer(
        observer: Observer,
        event_type: impl Into<EventType>,
        source: Option<EventSource>,
    ) {
        let event_type = event_type.into();
        let first = REGISTRY
            .try_with(|registry| !registry.borrow().has_type(&event_type))
            .unwrap_or(false);
        if first {
            let mut meta = Event::new();
            meta.add_source(
                FIRST_OBSERVER_REGISTERED_FOR,
                EventSource::Publisher,
                [EventValue::EventType(event_type.clone())],
            );
            meta.add_source(
                format!("{FIRST_OBSERVER_REGISTERED_FOR}.{event_type}"),
                EventSource::Publisher,
                [EventValue::EventType(event_type.clone())],
            );
            meta.send();
        }
        let _ = REGISTRY.try_with(|registry| {
            registry
                .borrow_mut()
                .buckets
                .entry((event_type, source))
                .or_default()
                .insert(observer.key, observer.callback);
        });
    }

    /// Removes `key` from the matching buckets.
    ///
    /// With both filters only that bucket is touched; with one filter every
    /// bucket matching it; with none every bucket. Each event type that loses
    /// its last observer gets `publisher.lastObserverRemovedFor.<type>`.
    pub fn remove_observer(
        key: &ObserverKey,
        event_type: Option<&EventType>,
        source: Option<&EventSource>,
    ) {
        let emptied = REGISTRY
            .try_with(|registry| {
                let mut registry = registry.borrow_mut();
                let mut touched: Vec<EventType> = Vec::new();
                for ((bucket_type, bucket_source), observers) in registry.buckets.iter_mut() {
                    let type_matches = event_type.map_or(true, |wanted| wanted == bucket_type);
                    let source_matches = match source {
                        Some(wanted) => bucket_source.as_ref() == Some(wanted),
                        None => true,
                    };
                    if type_matches && source_matches && observers.shift_remove(key).is_some() {
                        touched.push(bucket_type.clone());
                    }
                }
                registry.buckets.retain(|_, observers| !observers.is_empty());
                let mut emptied: Vec<EventType> = Vec::new();
                for event_type in touched {
                    if !registry.has_type(&event_type) && !emptied.contains(&event_type) {
                        emptied.push(event_type);
                    }
                }
                emptied
            })
            .unwrap_or_default();
        Self::announce_removed(emptied);
    }

    /// Removes every callback owned by `instance`.
    pub fn remove_instance(instance: InstanceId) {
        let emptied = REGISTRY
            .try_with(|registry| {
                let mut registry = registry.borrow_mut();
                let mut touched: Vec<EventType> = Vec::new();
                for ((bucket_type, _), observers) in registry.buckets.iter_mut() {
                    let before = observers.len();
                    observers.retain(|key, _| key.instance != instance);
                    if observers.len() != before {
                        touched.push(bucket_type.clone());
                    }
                }
                registry.buckets.retain(|_, observers| !observers.is_empty());
                let mut emptied: Vec<EventType> = Vec::new();
                for event_type in touched {
                    if !registry.has_type(&event_type) && !emptied.contains(&event_type) {
                        emptied.push(event_type);
                    }
                }
                emptied
            })
            .unwrap_or_default();
        Self::announce_removed(emptied);
    }

    /// Drops every registration without sending meta-events.
    pub fn clear() {
        let _ = REGISTRY.try_with(|registry| registry.borrow_mut().buckets.clear());
    }

    /// Observer keys registered for `event_type`, or for any type.
    pub fn observers(event_type: Option<&EventType>) -> Vec<ObserverKey> {
        REGISTRY
            .try_with(|registry| {
                let registry = registry.borrow();
                let mut keys: Vec<ObserverKey> = Vec::new();
                for ((bucket_type, _), observers) in &registry.buckets {
                    if event_type.map_or(false, |wanted| wanted != bucket_type) {
                        continue;
                    }
                    for key in observers.keys() {
                        if !keys.contains(key) {
                            keys.push(*key);
                        }
                    }
                }
                keys
            })
            .unwrap_or_default()
    }

    /// Delivers `event` to every observer registered for one of its
    /// `(type, source)` or `(type, any)` pairs.
    pub fn notify_observers(event: &Event) {
        if event.is_empty() {
            return;
        }
        let deliveries = REGISTRY
            .try_with(|registry| {
                let registry = registry.borrow();
                let mut deliveries: IndexMap<ObserverKey, (Callback, Vec<BucketKey>)> =
                    IndexMap::new();
                for event_type in event.types() {
                    let mut candidates: Vec<BucketKey> = event
                        .sources(std::slice::from_ref(&event_type))
                        .into_iter()
                        .map(|source| (event_type.clone(), Some(source)))
                        .collect();
                    candidates.push((event_type.clone(), None));
                    for bucket in candidates {
                        let Some(observers) = registry.buckets.get(&bucket) else {
                            continue;
                        };
                        for (key, callback) in observers {
                            let entry = deliveries
                                .entry(*key)
                                .or_insert_with(|| (Rc::clone(callback), Vec::new()));
                            if !entry.1.contains(&bucket) {
                                entry.1.push(bucket.clone());
                            }
                        }
                    }
                }
                deliveries
            })
            .unwrap_or_default();

        for (_, (callback, pairs)) in deliveries {
            let projected = event.sub_event(&pairs);
            if !projected.is_empty() {
                callback(&projected);
            }
        }
    }

    fn announce_removed(event_types: Vec<EventType>) {
        for event_type in event_types {
            Event::with_source(
                format!("{LAST_OBSERVER_REMOVED_FOR}.{event_type}"),
                EventSource::Publisher,
                [EventValue::EventType(event_type.clone())],
            )
            .send();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Observer, Publisher};
    use crate::event::notification::Event;
    use crate::event::value::{EventSource, EventType, EventValue, InstanceId};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(instance: InstanceId) -> (Observer, Rc<RefCell<Vec<Event>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let observer = Observer::new(instance, "record", move |event: &Event| {
            sink.borrow_mut().push(event.clone())
        });
        (observer, seen)
    }

    #[test]
    fn observer_is_called_once_per_event_even_with_overlapping_buckets() {
        Publisher::clear();
        let instance = InstanceId::next();
        let origin = EventSource::Instance(InstanceId::next());
        let (observer, seen) = recorder(instance);
        Publisher::register_observer(observer.clone(), "ping", None);
        Publisher::register_observer(observer, "ping", Some(origin.clone()));

        Event::with_source("ping", origin, [EventValue::Bool(true)]).send();

        assert_eq!(seen.borrow().len(), 1);
        Publisher::clear();
    }

    #[test]
    fn source_bound_observer_ignores_other_sources() {
        Publisher::clear();
        let watched = EventSource::Instance(InstanceId::next());
        let (observer, seen) = recorder(InstanceId::next());
        Publisher::register_observer(observer, "ping", Some(watched.clone()));

        Event::with_source("ping", EventSource::Instance(InstanceId::next()), []).send();
        assert!(seen.borrow().is_empty());

        Event::with_source("ping", watched, []).send();
        assert_eq!(seen.borrow().len(), 1);
        Publisher::clear();
    }

    #[test]
    fn remove_instance_drops_all_its_callbacks() {
        Publisher::clear();
        let instance = InstanceId::next();
        let (observer, _) = recorder(instance);
        Publisher::register_observer(observer.clone(), "a", None);
        Publisher::register_observer(observer, "b", None);

        Publisher::remove_instance(instance);

        assert!(Publisher::observers(None).is_empty());
        assert!(Publisher::observers(Some(&EventType::from("a"))).is_empty());
    }
}
