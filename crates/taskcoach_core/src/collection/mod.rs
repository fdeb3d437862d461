//! Observable item collections and sorted views over them.
//!
//! # Responsibility
//! - `ItemCollection`: closure-preserving membership with add/remove events.
//! - `Sorter`: ordered mirror of a collection, flat or tree-shaped.
//!
//! # See also
//! - `crate::model::sort_keys` for per-kind sort keys.

pub mod item_collection;
pub mod sorter;

pub use item_collection::{CollectionError, CollectionResult, ItemCollection};
pub use sorter::{Sorter, SorterConfig};
