//! # ordmap
//!
//! An ordered associative container for Rust: a comparator-driven
//! red-black tree map with cursor iteration, bulk-load collectors,
//! and pull-based streams.
//!
//! ## Overview
//!
//! The centerpiece is [`TreeMap`](tree::TreeMap), a self-balancing binary
//! search tree that keeps entries sorted under a caller-supplied comparator
//! and guarantees O(log N) lookup, insertion, update, and removal, with
//! O(N) in-order traversal. Around it the crate provides:
//!
//! - **Comparators**: the [`Compare`](compare::Compare) trait with a
//!   [`NaturalOrder`](compare::NaturalOrder) default for `Ord` keys and a
//!   [`Reversed`](compare::Reversed) adapter
//! - **Capability surface**: the [`Map`](map::Map) trait generic consumers
//!   program against
//! - **Cursors**: shared in-order iteration plus a mutating cursor that can
//!   edit and remove entries mid-traversal
//! - **Streams**: a lazy, demand-driven element stream protocol with
//!   producer sources and a [`Collector`](stream::Collector) bulk-load
//!   interface
//!
//! ## Example
//!
//! ```rust
//! use ordmap::tree::TreeMap;
//!
//! let mut map = TreeMap::new();
//! map.insert(3, "three");
//! map.insert(1, "one");
//! map.insert(2, "two");
//!
//! // Entries are always in sorted order
//! let keys: Vec<i32> = map.keys();
//! assert_eq!(keys, vec![1, 2, 3]);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` implementations for `TreeMap`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use ordmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::compare::{Compare, NaturalOrder, Reversed, from_fn};
    pub use crate::map::{KeyNotFound, Map};
    pub use crate::stream::{Collector, Stream};
    pub use crate::tree::{TreeMap, TreeMapCollector};
}

pub mod compare;
pub mod map;
pub mod stream;
pub mod tree;
