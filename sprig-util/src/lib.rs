//! Utilities for `sprig`

// Modules
pub mod weak_set;

// Exports
pub use self::weak_set::{WeakItem, WeakSet};
