#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod comparer;

/// Per-table sizing: load factors and construction settings.
pub mod config;

/// The error type shared by every fallible table operation.
pub mod error;

/// A HashMap over the triangular-probing table.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// The open-addressing table itself, with its entry, iterator and cursor
/// types.
pub mod hash_table;

/// A hash set over the triangular-probing table.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

pub mod probe;

#[cfg(feature = "foldhash")]
pub use comparer::DefaultHashBuilder;
pub use comparer::Comparer;
pub use comparer::HashComparer;
pub use comparer::NullableComparer;
pub use config::LoadFactor;
pub use config::TableConfig;
pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
