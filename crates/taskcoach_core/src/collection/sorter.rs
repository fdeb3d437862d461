//! Sorted view over an `ItemCollection`.
//!
//! # Responsibility
//! - Mirror the source collection's membership.
//! - Keep the mirror ordered by one attribute, in list or tree mode.
//! - Re-sort when the source changes or when a sort-relevant attribute of
//!   any item changes.
//!
//! # Invariants
//! - `reset` is the only reordering path; it sends `<class>.sorted` only when
//!   the order actually changed.
//! - Tree mode orders siblings and keeps every parent before its descendants.
//! - Unknown sort attributes fall back to `subject`.
//! - Observer callbacks hold weak references; dropping the sorter
//!   unregisters them.

use crate::collection::item_collection::ItemCollection;
use crate::event::{Event, EventSource, EventType, EventValue, InstanceId, Observer, Publisher};
use crate::model::item::Item;
use crate::model::sort_keys::{SortKey, SortValue, SORT_BY_SUBJECT};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

/// Host-configurable sort settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    pub sort_by: String,
    pub ascending: bool,
    pub case_sensitive: bool,
    pub tree_mode: bool,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            sort_by: SORT_BY_SUBJECT.to_string(),
            ascending: true,
            case_sensitive: true,
            tree_mode: false,
        }
    }
}

struct SorterInner {
    instance: InstanceId,
    source: ItemCollection,
    config: RefCell<SorterConfig>,
    /// `config.sort_by`, or `subject` when the kind cannot sort by it.
    effective_sort_by: RefCell<String>,
    items: RefCell<Vec<Item>>,
}

/// Sorted mirror of a collection.
pub struct Sorter {
    inner: Rc<SorterInner>,
}

impl Debug for Sorter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sorter")
            .field("instance", &self.inner.instance)
            .field("config", &*self.inner.config.borrow())
            .finish_non_exhaustive()
    }
}

impl Sorter {
    pub fn new(source: &ItemCollection, config: SorterConfig) -> Self {
        let sorter = Self {
            inner: Rc::new(SorterInner {
                instance: InstanceId::next(),
                source: source.clone(),
                config: RefCell::new(config),
                effective_sort_by: RefCell::new(SORT_BY_SUBJECT.to_string()),
                items: RefCell::new(source.items()),
            }),
        };
        sorter.reconfigure();
        sorter
    }

    pub fn instance_id(&self) -> InstanceId {
        self.inner.instance
    }

    pub fn source(&self) -> EventSource {
        EventSource::Instance(self.inner.instance)
    }

    pub fn sorted_event_type(&self) -> EventType {
        self.inner.event_type("sorted")
    }

    pub fn add_item_event_type(&self) -> EventType {
        self.inner.event_type("add")
    }

    pub fn remove_item_event_type(&self) -> EventType {
        self.inner.event_type("remove")
    }

    pub fn config(&self) -> SorterConfig {
        self.inner.config.borrow().clone()
    }

    /// Attribute actually used for sorting.
    pub fn sort_by(&self) -> String {
        self.inner.effective_sort_by.borrow().clone()
    }

    pub fn items(&self) -> Vec<Item> {
        self.inner.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.inner.items.borrow().contains(item)
    }

    /// Members without a member parent, in sorted order.
    pub fn root_items(&self) -> Vec<Item> {
        let items = self.items();
        items
            .iter()
            .filter(|item| item.parent().map_or(true, |parent| !items.contains(&parent)))
            .cloned()
            .collect()
    }

    /// Member children of `item`, in sorted order.
    pub fn children_of(&self, item: &Item) -> Vec<Item> {
        self.items()
            .into_iter()
            .filter(|candidate| candidate.parent().as_ref() == Some(item))
            .collect()
    }

    pub fn set_sort_by(&self, attribute: impl Into<String>) {
        self.inner.config.borrow_mut().sort_by = attribute.into();
        self.reconfigure();
    }

    pub fn set_ascending(&self, ascending: bool) {
        self.inner.config.borrow_mut().ascending = ascending;
        self.reconfigure();
    }

    pub fn set_case_sensitive(&self, case_sensitive: bool) {
        self.inner.config.borrow_mut().case_sensitive = case_sensitive;
        self.reconfigure();
    }

    pub fn set_tree_mode(&self, tree_mode: bool) {
        self.inner.config.borrow_mut().tree_mode = tree_mode;
        self.reconfigure();
    }

    pub fn reset(&self) -> bool {
        Event::batch(|event| self.inner.reset_in(event))
    }

    pub fn reset_in(&self, event: &mut Event) -> bool {
        self.inner.reset_in(event)
    }

    fn reconfigure(&self) {
        self.inner.resolve_sort_attribute();
        Publisher::remove_instance(self.inner.instance);
        self.register_observers();
        self.reset();
    }

    fn register_observers(&self) {
        let inner = &self.inner;
        let collection_source = inner.source.source();

        let weak = Rc::downgrade(inner);
        Publisher::register_observer(
            Observer::new(inner.instance, "on_items_added", move |event: &Event| {
                with_inner(&weak, |sorter| sorter.on_items_added(event))
            }),
            inner.source.add_item_event_type(),
            Some(collection_source.clone()),
        );

        let weak = Rc::downgrade(inner);
        Publisher::register_observer(
            Observer::new(inner.instance, "on_items_removed", move |event: &Event| {
                with_inner(&weak, |sorter| sorter.on_items_removed(event))
            }),
            inner.source.remove_item_event_type(),
            Some(collection_source),
        );

        let attribute = inner.effective_sort_by.borrow().clone();
        let event_types = inner
            .source
            .kind()
            .sort_event_types(&attribute)
            .unwrap_or_default();
        for event_type in event_types {
            let weak = Rc::downgrade(inner);
            Publisher::register_observer(
                Observer::new(inner.instance, "on_attribute_changed", move |_: &Event| {
                    with_inner(&weak, |sorter| {
                        Event::batch(|event| sorter.reset_in(event));
                    })
                }),
                event_type,
                None,
            );
        }
        trace!(
            "event=sorter_observe module=sorter status=ok instance={} attribute={}",
            inner.instance.get(),
            attribute
        );
    }
}

impl Drop for Sorter {
    fn drop(&mut self) {
        Publisher::remove_instance(self.inner.instance);
    }
}

fn with_inner(weak: &Weak<SorterInner>, action: impl FnOnce(&SorterInner)) {
    if let Some(inner) = weak.upgrade() {
        action(&inner);
    }
}

impl SorterInner {
    fn class_name(&self) -> &'static str {
        if self.config.borrow().tree_mode {
            "treeSorter"
        } else {
            "sorter"
        }
    }

    fn event_type(&self, topic: &str) -> EventType {
        EventType::for_class(self.class_name(), topic)
    }

    fn source(&self) -> EventSource {
        EventSource::Instance(self.instance)
    }

    fn resolve_sort_attribute(&self) {
        let config = self.config.borrow().clone();
        let kind = self.source.kind();
        let effective = if kind
            .sort_function(&config.sort_by, config.case_sensitive, config.tree_mode)
            .is_some()
        {
            config.sort_by
        } else {
            warn!(
                "event=sort_fallback module=sorter status=fallback class={} attribute={}",
                kind.class_name(),
                config.sort_by
            );
            SORT_BY_SUBJECT.to_string()
        };
        *self.effective_sort_by.borrow_mut() = effective;
    }

    fn sort_key(&self) -> SortKey {
        let config = self.config.borrow();
        let attribute = self.effective_sort_by.borrow();
        self.source
            .kind()
            .sort_function(&attribute, config.case_sensitive, config.tree_mode)
            .unwrap_or_else(|| Box::new(|item: &Item| SortValue::Text(item.subject(false))))
    }

    fn reset_in(&self, event: &mut Event) -> bool {
        let current = self.items.borrow().clone();
        let ordered = self.ordered(&current);
        if ordered == current {
            return false;
        }
        *self.items.borrow_mut() = ordered;
        event.add_source(self.event_type("sorted"), self.source(), []);
        trace!(
            "event=sorter_sorted module=sorter status=ok instance={} count={}",
            self.instance.get(),
            current.len()
        );
        true
    }

    fn ordered(&self, items: &[Item]) -> Vec<Item> {
        let key = self.sort_key();
        let (ascending, tree_mode) = {
            let config = self.config.borrow();
            (config.ascending, config.tree_mode)
        };
        let keys: HashMap<Item, SortValue> =
            items.iter().map(|item| (item.clone(), key(item))).collect();
        let sort = |mut group: Vec<Item>| {
            group.sort_by(|left, right| {
                let ordering: Ordering = keys.get(left).cmp(&keys.get(right));
                if ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
            group
        };
        if !tree_mode {
            return sort(items.to_vec());
        }

        let roots: Vec<Item> = items
            .iter()
            .filter(|item| item.parent().map_or(true, |parent| !items.contains(&parent)))
            .cloned()
            .collect();
        let mut result = Vec::with_capacity(items.len());
        let mut pending: Vec<Item> = sort(roots).into_iter().rev().collect();
        while let Some(item) = pending.pop() {
            let children: Vec<Item> = item
                .children(false)
                .into_iter()
                .filter(|child| items.contains(child))
                .collect();
            pending.extend(sort(children).into_iter().rev());
            result.push(item);
        }
        result
    }

    fn on_items_added(&self, event: &Event) {
        let added = event.items(
            Some(&self.source.source()),
            Some(&self.source.add_item_event_type()),
        );
        Event::batch(|batch| {
            let mut new_items = Vec::new();
            {
                let mut items = self.items.borrow_mut();
                for item in added {
                    if !items.contains(&item) {
                        items.push(item.clone());
                        new_items.push(item);
                    }
                }
            }
            if !new_items.is_empty() {
                batch.add_source(
                    self.event_type("add"),
                    self.source(),
                    new_items.iter().map(EventValue::from),
                );
            }
            self.reset_in(batch);
        });
    }

    fn on_items_removed(&self, event: &Event) {
        let mut removed = event.items(
            Some(&self.source.source()),
            Some(&self.source.remove_item_event_type()),
        );
        if self.config.borrow().tree_mode {
            let descendants: Vec<Item> = removed.iter().flat_map(|item| item.children(true)).collect();
            removed.extend(descendants);
        }
        Event::batch(|batch| {
            let gone: Vec<Item> = {
                let mut items = self.items.borrow_mut();
                let gone = items
                    .iter()
                    .filter(|item| removed.contains(item))
                    .cloned()
                    .collect();
                items.retain(|item| !removed.contains(item));
                gone
            };
            if !gone.is_empty() {
                batch.add_source(
                    self.event_type("remove"),
                    self.source(),
                    gone.iter().map(EventValue::from),
                );
            }
        });
    }
}
