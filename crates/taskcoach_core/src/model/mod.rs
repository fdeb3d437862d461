//! Domain model shared by tasks, notes, categories and attachments.
//!
//! # Responsibility
//! - Define the item handle, its kinds and the class-parameterised events.
//! - Provide tree, category, ownership, recurrence and snapshot behaviour.
//!
//! # Invariants
//! - Every domain object is an `Item` identified by a stable `ItemId`.
//! - Deletion is a `Deleted` status, not removal from memory.
//! - Mutators come in pairs: `set_x` sends its own event, `set_x_in` adds to
//!   a caller-owned event.

pub mod attachment;
pub(crate) mod attribute;
pub mod categorizable;
pub mod category;
pub mod composite;
pub mod item;
pub(crate) mod owner;
pub mod recurrence;
pub mod snapshot;
pub mod sort_keys;
pub mod status;
pub mod style;
pub mod task;
