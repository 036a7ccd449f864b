//! The ordered-map capability surface.
//!
//! This module defines the [`Map`] trait that generic consumers program
//! against, together with the [`KeyNotFound`] error returned by the failing
//! accessors. [`TreeMap`](crate::tree::TreeMap) is the tree-backed
//! implementation; synchronized wrappers or other containers can implement
//! the same surface.
//!
//! # Lookup taxonomy
//!
//! - [`Map::get`] / [`Map::get_mut`]: safe lookup, `None` on an absent key
//! - [`Map::fetch`] / [`Map::fetch_mut`]: failing lookup, `Err(KeyNotFound)`
//!   on an absent key — for call sites where absence is a bug
//! - [`Map::contains_key`]: presence check only
//!
//! `remove` of an absent key is a silent no-op and `insert` of a duplicate
//! key is a silent overwrite; neither ever fails.

use std::fmt;

/// Error returned by [`Map::fetch`] and [`Map::fetch_mut`] when the
/// requested key is not present.
///
/// Safe callers use [`Map::get`] or [`Map::contains_key`] instead; `fetch`
/// exists for call sites where a missing key indicates a bug and the caller
/// wants to surface it through its own error-handling layer.
///
/// # Examples
///
/// ```rust
/// use ordmap::map::{KeyNotFound, Map};
/// use ordmap::tree::TreeMap;
///
/// let map: TreeMap<i32, &str> = TreeMap::new();
/// assert_eq!(map.fetch(&1), Err(KeyNotFound));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("key not found in map")
    }
}

impl std::error::Error for KeyNotFound {}

/// An associative container mapping unique keys to values.
///
/// The trait captures the operations every map container in this family
/// supports: size query, lookup in both safe and failing flavors, upsert,
/// removal, clearing, and ordered key extraction. Implementations that
/// maintain a key order (such as [`TreeMap`](crate::tree::TreeMap)) return
/// `keys` in that order; unordered implementations may return any
/// permutation.
///
/// Cloning goes through the standard [`Clone`] trait and iteration through
/// [`IntoIterator`] on the concrete type; neither is part of this surface.
pub trait Map<K, V> {
    /// Returns the number of entries in the map.
    fn len(&self) -> usize;

    /// Returns `true` if the map contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the map contains the specified key.
    fn contains_key(&self, key: &K) -> bool;

    /// Returns a reference to the value associated with the key, or `None`
    /// if the key is not present.
    fn get(&self, key: &K) -> Option<&V>;

    /// Returns a mutable reference to the value associated with the key,
    /// or `None` if the key is not present.
    fn get_mut(&mut self, key: &K) -> Option<&mut V>;

    /// Returns a reference to the value associated with the key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] if the key is not present.
    fn fetch(&self, key: &K) -> Result<&V, KeyNotFound> {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Returns a mutable reference to the value associated with the key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] if the key is not present.
    fn fetch_mut(&mut self, key: &K) -> Result<&mut V, KeyNotFound> {
        self.get_mut(key).ok_or(KeyNotFound)
    }

    /// Sets the value associated with the key.
    ///
    /// Returns the previous value if the key was already present (the new
    /// value wins), or `None` if the key was inserted fresh.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes the entry with the specified key, returning its value.
    ///
    /// Does nothing and returns `None` if the key is not present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes all entries from the map.
    fn clear(&mut self);

    /// Returns all keys in the map, in iteration order.
    fn keys(&self) -> Vec<K>
    where
        K: Clone;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_display() {
        assert_eq!(format!("{KeyNotFound}"), "key not found in map");
    }

    #[test]
    fn test_key_not_found_is_error() {
        fn assert_error<E: std::error::Error>(_error: &E) {}
        assert_error(&KeyNotFound);
    }
}
