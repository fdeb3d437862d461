//! Publish/subscribe plumbing for domain notifications.
//!
//! # Responsibility
//! - Carry coalesced multi-aspect notifications (`Event`).
//! - Route them to observers keyed on `(event type, optional source)` (`Publisher`).
//!
//! # Invariants
//! - Delivery is synchronous and happens on the thread that owns the registry.
//! - An observer is called at most once per sent event, with the sub-event it
//!   registered for.
//! - Observers must be total: a panicking observer is not isolated.

mod notification;
mod publisher;
mod value;

pub use notification::Event;
pub use publisher::{
    Observer, ObserverKey, Publisher, FIRST_OBSERVER_REGISTERED_FOR, LAST_OBSERVER_REMOVED_FOR,
};
pub use value::{EventSource, EventType, EventValue, InstanceId};
