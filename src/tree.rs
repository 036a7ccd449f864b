//! Ordered map based on a mutable Red-Black Tree.
//!
//! This module provides [`TreeMap`], an ordered associative container that
//! keeps its entries sorted under a caller-supplied comparator.
//!
//! # Overview
//!
//! `TreeMap` is a self-balancing binary search tree with colored nodes:
//!
//! - O(log N) get
//! - O(log N) insert
//! - O(log N) remove
//! - O(log N) min/max
//! - O(1) len and `is_empty`
//! - O(N) in-order traversal and structural clone
//!
//! Nodes live in an arena — a slot vector owned by the tree — and refer to
//! each other through stable integer handles instead of pointers. Freed
//! slots are threaded into a free list and reused by later insertions.
//!
//! # Internal Structure
//!
//! The Red-Black Tree maintains the following invariants after every public
//! operation:
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. A red node never has a red child
//! 4. Every path from a node to its descendant leaves contains the same
//!    number of black nodes
//! 5. The entry count equals the number of reachable nodes
//!
//! These invariants bound the tree height by `2·log2(N + 1)`.
//!
//! # Examples
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
//! assert_eq!(map.keys(), vec![1, 2, 3]);
//! assert_eq!(map.get(&2), Some(&"two"));
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::num::NonZeroUsize;
use std::ops::{Index, IndexMut};

use static_assertions::assert_eq_size;

use crate::compare::{Compare, NaturalOrder};
use crate::map::{KeyNotFound, Map};
use crate::stream::{Collector, Stream};

// =============================================================================
// Handles and Colors
// =============================================================================

/// Stable handle to a node slot in the tree's arena.
///
/// Index zero is stored as one so that `Option<NodeId>` has a niche and
/// stays pointer-sized.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct NodeId(NonZeroUsize);

assert_eq_size!(Option<NodeId>, usize);

impl NodeId {
    fn from_index(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    const fn index(self) -> usize {
        self.0.get() - 1
    }
}

type Link = Option<NodeId>;

/// The color of a Red-Black Tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure.
///
/// `parent` is a non-owning back-handle used only for upward navigation
/// during fixups and successor lookup.
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    parent: Link,
    left: Link,
    right: Link,
}

impl<K, V> Node<K, V> {
    /// Creates an unlinked copy carrying the same key, value, and color.
    /// The tree's clone routine wires the links separately.
    fn duplicate(&self) -> Self
    where
        K: Clone,
        V: Clone,
    {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            color: self.color,
            parent: None,
            left: None,
            right: None,
        }
    }
}

/// An arena slot: either a live node or a link in the free list.
#[derive(Debug)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant(Link),
}

// =============================================================================
// TreeMap Definition
// =============================================================================

/// An ordered map backed by a mutable Red-Black Tree.
///
/// Keys are ordered by a comparator of type `C` supplied at construction;
/// [`TreeMap::new`] uses [`NaturalOrder`] for keys that implement [`Ord`],
/// and [`TreeMap::with_comparator`] accepts any [`Compare`] implementation.
/// The comparator must be a strict total order; an inconsistent comparator
/// silently corrupts the tree structure (see [`Compare`]).
///
/// The map is not internally synchronized. Shared iteration borrows the
/// map, so the borrow checker rules out structural mutation during a
/// traversal; concurrent use requires an external synchronization wrapper
/// or iteration over a [`Clone`] snapshot.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `new`          | O(1)       |
/// | `get`          | O(log N)   |
/// | `insert`       | O(log N)   |
/// | `remove`       | O(log N)   |
/// | `contains_key` | O(log N)   |
/// | `min`/`max`    | O(log N)   |
/// | `len`          | O(1)       |
/// | `clear`        | O(N)       |
/// | `keys`/`iter`  | O(N)       |
/// | `clone`        | O(N)       |
///
/// # Examples
///
/// ```rust
/// use ordmap::tree::TreeMap;
///
/// let mut map = TreeMap::new();
/// map.insert(2, "two");
/// map.insert(1, "one");
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.min(), Some((&1, &"one")));
///
/// map.remove(&1);
/// assert!(!map.contains_key(&1));
/// ```
pub struct TreeMap<K, V, C = NaturalOrder> {
    slots: Vec<Slot<K, V>>,
    free_head: Link,
    root: Link,
    length: usize,
    comparator: C,
}

impl<K, V> TreeMap<K, V> {
    /// Creates an empty map ordered by the standard ordering of `K`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let map: TreeMap<i32, String> = TreeMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates a map containing a single entry, ordered naturally.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let map = TreeMap::singleton(42, "answer");
    /// assert_eq!(map.get(&42), Some(&"answer"));
    /// ```
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self
    where
        K: Ord,
    {
        let mut map = Self::new();
        map.insert(key, value);
        map
    }
}

impl<K, V, C> TreeMap<K, V, C> {
    /// Creates an empty map ordered by the specified comparator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::compare::{NaturalOrder, Reversed};
    /// use ordmap::tree::TreeMap;
    ///
    /// let mut map = TreeMap::with_comparator(Reversed(NaturalOrder));
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    /// assert_eq!(map.keys(), vec![2, 1]);
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            root: None,
            length: 0,
            comparator,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes all entries from the map.
    ///
    /// Drops the whole arena at once; no per-node traversal is needed.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.root = None;
        self.length = 0;
    }

    /// Returns an iterator over the entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert(2, "two");
    /// map.insert(1, "one");
    ///
    /// let entries: Vec<(&i32, &&str)> = map.iter().collect();
    /// assert_eq!(entries, vec![(&1, &"one"), (&2, &"two")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: self,
            current: self.root.map(|root| self.min_in(root)),
            remaining: self.length,
        }
    }

    /// Returns all keys in ascending order.
    ///
    /// The returned vector has exactly [`len`](Self::len) elements.
    #[must_use]
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Returns an iterator over the values in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert(2, "two");
    /// map.insert(1, "one");
    ///
    /// let values: Vec<&str> = map.values().copied().collect();
    /// assert_eq!(values, vec!["one", "two"]);
    /// ```
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { entries: self.iter() }
    }

    /// Returns the entry with the smallest key, or `None` if the map is
    /// empty.
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        let root = self.root?;
        let node = self.node(self.min_in(root));
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key, or `None` if the map is
    /// empty.
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        let root = self.root?;
        let node = self.node(self.max_in(root));
        Some((&node.key, &node.value))
    }

    /// Returns a mutating cursor positioned at the smallest entry.
    ///
    /// The cursor borrows the map exclusively, so no other access can
    /// interleave with a cursor traversal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert(1, 10);
    /// map.insert(2, 20);
    ///
    /// let mut cursor = map.cursor_mut();
    /// while cursor.is_valid() {
    ///     if let Some(value) = cursor.value_mut() {
    ///         *value *= 2;
    ///     }
    ///     cursor.move_next();
    /// }
    /// assert_eq!(map.get(&2), Some(&40));
    /// ```
    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, C> {
        let current = self.root.map(|root| self.min_in(root));
        CursorMut {
            tree: self,
            current,
        }
    }
}

impl<K, V, C: Compare<K>> TreeMap<K, V, C> {
    /// Returns `true` if the map contains the specified key.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the value associated with the key, or `None`
    /// if the key is not present.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let map = TreeMap::singleton(1, "one");
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = self.find(key)?;
        Some(&self.node(id).value)
    }

    /// Returns a mutable reference to the value associated with the key,
    /// or `None` if the key is not present.
    #[must_use]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find(key)?;
        Some(&mut self.node_mut(id).value)
    }

    /// Returns a reference to the value associated with the key.
    ///
    /// Call sites that treat an absent key as a bug use this accessor and
    /// surface the error through their own handling layer; safe lookups use
    /// [`get`](Self::get) or [`contains_key`](Self::contains_key).
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] if the key is not present.
    pub fn fetch(&self, key: &K) -> Result<&V, KeyNotFound> {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Returns a mutable reference to the value associated with the key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] if the key is not present.
    pub fn fetch_mut(&mut self, key: &K) -> Result<&mut V, KeyNotFound> {
        self.get_mut(key).ok_or(KeyNotFound)
    }

    /// Sets the value associated with the key.
    ///
    /// If the key is already present its value is overwritten in place and
    /// the previous value is returned; no rebalancing happens and the size
    /// does not change. Otherwise the key is inserted as a red leaf at the
    /// position found by descent and the insertion fixup restores the tree
    /// invariants. The very first node is created black as the root.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// assert_eq!(map.insert(1, "one"), None);
    /// assert_eq!(map.insert(1, "ONE"), Some("one"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent: Link = None;
        let mut went_left = false;
        let mut current = self.root;

        while let Some(id) = current {
            parent = Some(id);
            match self.comparator.compare(&key, &self.node(id).key) {
                std::cmp::Ordering::Less => {
                    went_left = true;
                    current = self.node(id).left;
                }
                std::cmp::Ordering::Greater => {
                    went_left = false;
                    current = self.node(id).right;
                }
                std::cmp::Ordering::Equal => {
                    return Some(std::mem::replace(&mut self.node_mut(id).value, value));
                }
            }
        }

        let color = if parent.is_none() {
            Color::Black
        } else {
            Color::Red
        };
        let id = self.allocate(Node {
            key,
            value,
            color,
            parent,
            left: None,
            right: None,
        });
        self.length += 1;

        match parent {
            None => self.root = Some(id),
            Some(parent) => {
                if went_left {
                    self.node_mut(parent).left = Some(id);
                } else {
                    self.node_mut(parent).right = Some(id);
                }
                self.fix_insert(id);
            }
        }

        None
    }

    /// Removes the entry with the specified key, returning its value.
    ///
    /// Does nothing and returns `None` if the key is not present. When the
    /// located node has two children, its entry is exchanged with the
    /// in-order successor's and the successor node — which has at most one
    /// child — is the one physically removed, so every splice operates on a
    /// node with at most one child.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let mut map = TreeMap::singleton(1, "one");
    /// assert_eq!(map.remove(&1), Some("one"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.find(key)?;
        let (_, value) = self.remove_node(id);
        Some(value)
    }

    /// Locates the node holding the specified key.
    fn find(&self, key: &K) -> Link {
        let mut current = self.root;
        while let Some(id) = current {
            current = match self.comparator.compare(key, &self.node(id).key) {
                std::cmp::Ordering::Less => self.node(id).left,
                std::cmp::Ordering::Greater => self.node(id).right,
                std::cmp::Ordering::Equal => return Some(id),
            };
        }
        None
    }
}

impl<K, V, C> TreeMap<K, V, C>
where
    K: Send + 'static,
    V: Send + 'static,
    C: Send + 'static,
{
    /// Adapts the map to a lazy pull-based stream of owned entries in
    /// ascending key order.
    ///
    /// The map moves into a producer thread that yields one entry per
    /// consumer demand; dropping the stream terminates the producer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::tree::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert(2, "two");
    /// map.insert(1, "one");
    ///
    /// let entries: Vec<(i32, &str)> = map.into_stream().collect();
    /// assert_eq!(entries, vec![(1, "one"), (2, "two")]);
    /// ```
    #[must_use]
    pub fn into_stream(self) -> Stream<(K, V)> {
        Stream::from_iterator(self)
    }
}

// =============================================================================
// Arena Primitives
// =============================================================================

impl<K, V, C> TreeMap<K, V, C> {
    fn node(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("dangling node handle"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("dangling node handle"),
        }
    }

    /// Stores a node, reusing a free slot when one is available.
    fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free_head {
            let slot = std::mem::replace(&mut self.slots[id.index()], Slot::Occupied(node));
            match slot {
                Slot::Vacant(next_free) => self.free_head = next_free,
                Slot::Occupied(_) => unreachable!("free list pointed at an occupied slot"),
            }
            id
        } else {
            self.slots.push(Slot::Occupied(node));
            NodeId::from_index(self.slots.len() - 1)
        }
    }

    /// Vacates a slot, threading it onto the free list, and returns the
    /// node it held.
    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let slot = std::mem::replace(&mut self.slots[id.index()], Slot::Vacant(self.free_head));
        self.free_head = Some(id);
        match slot {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("released a vacant arena slot"),
        }
    }

    fn is_red(&self, link: Link) -> bool {
        link.is_some_and(|id| self.node(id).color == Color::Red)
    }

    /// Exchanges the key/value payloads of two distinct nodes, leaving
    /// colors and links in place.
    fn swap_entries(&mut self, first: NodeId, second: NodeId) {
        let (low, high) = if first.index() < second.index() {
            (first.index(), second.index())
        } else {
            (second.index(), first.index())
        };
        let (front, back) = self.slots.split_at_mut(high);
        match (&mut front[low], &mut back[0]) {
            (Slot::Occupied(first_node), Slot::Occupied(second_node)) => {
                std::mem::swap(&mut first_node.key, &mut second_node.key);
                std::mem::swap(&mut first_node.value, &mut second_node.value);
            }
            _ => unreachable!("swapping vacant arena slots"),
        }
    }
}

// =============================================================================
// Navigation
// =============================================================================

impl<K, V, C> TreeMap<K, V, C> {
    /// Descends to the smallest node of the subtree rooted at `id`.
    fn min_in(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    /// Descends to the largest node of the subtree rooted at `id`.
    fn max_in(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.node(id).right {
            id = right;
        }
        id
    }

    /// Returns the in-order successor: the minimum of the right subtree, or
    /// the nearest ancestor reached from a left child.
    fn successor(&self, id: NodeId) -> Link {
        if let Some(right) = self.node(id).right {
            return Some(self.min_in(right));
        }
        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(current) = parent {
            if self.node(current).left == Some(child) {
                return Some(current);
            }
            child = current;
            parent = self.node(current).parent;
        }
        None
    }

    /// Returns the in-order predecessor, the mirror image of
    /// [`successor`](Self::successor).
    fn predecessor(&self, id: NodeId) -> Link {
        if let Some(left) = self.node(id).left {
            return Some(self.max_in(left));
        }
        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(current) = parent {
            if self.node(current).right == Some(child) {
                return Some(current);
            }
            child = current;
            parent = self.node(current).parent;
        }
        None
    }
}

// =============================================================================
// Rotations and Fixups
// =============================================================================

impl<K, V, C> TreeMap<K, V, C> {
    /// Rotates the subtree rooted at `pivot` to the left: the right child
    /// takes the pivot's place and the pivot becomes its left child.
    /// In-order sequence is preserved.
    fn rotate_left(&mut self, pivot: NodeId) {
        let Some(riser) = self.node(pivot).right else {
            unreachable!("left rotation requires a right child")
        };
        let transferred = self.node(riser).left;

        self.node_mut(pivot).right = transferred;
        if let Some(child) = transferred {
            self.node_mut(child).parent = Some(pivot);
        }

        let parent = self.node(pivot).parent;
        self.node_mut(riser).parent = parent;
        self.replace_child(parent, pivot, Some(riser));

        self.node_mut(riser).left = Some(pivot);
        self.node_mut(pivot).parent = Some(riser);
    }

    /// Mirror image of [`rotate_left`](Self::rotate_left).
    fn rotate_right(&mut self, pivot: NodeId) {
        let Some(riser) = self.node(pivot).left else {
            unreachable!("right rotation requires a left child")
        };
        let transferred = self.node(riser).right;

        self.node_mut(pivot).left = transferred;
        if let Some(child) = transferred {
            self.node_mut(child).parent = Some(pivot);
        }

        let parent = self.node(pivot).parent;
        self.node_mut(riser).parent = parent;
        self.replace_child(parent, pivot, Some(riser));

        self.node_mut(riser).right = Some(pivot);
        self.node_mut(pivot).parent = Some(riser);
    }

    /// Redirects the link that `parent` holds to `old_child` (or the root
    /// link when `parent` is `None`) to `new_child`.
    fn replace_child(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            None => self.root = new_child,
            Some(parent) => {
                if self.node(parent).left == Some(old_child) {
                    self.node_mut(parent).left = new_child;
                } else {
                    self.node_mut(parent).right = new_child;
                }
            }
        }
    }

    /// Restores the color invariants after inserting the red leaf `node`.
    ///
    /// While the parent is red: a red uncle means recolor and continue at
    /// the grandparent; a black uncle takes one rotation (two for the
    /// triangle shape) and terminates. The root is recolored black
    /// unconditionally afterward.
    fn fix_insert(&mut self, mut node: NodeId) {
        loop {
            let Some(parent) = self.node(node).parent else {
                break;
            };
            if self.node(parent).color == Color::Black {
                break;
            }
            let Some(grandparent) = self.node(parent).parent else {
                break;
            };

            let parent_is_left = self.node(grandparent).left == Some(parent);
            let uncle = if parent_is_left {
                self.node(grandparent).right
            } else {
                self.node(grandparent).left
            };

            if self.is_red(uncle) {
                self.node_mut(parent).color = Color::Black;
                if let Some(uncle) = uncle {
                    self.node_mut(uncle).color = Color::Black;
                }
                self.node_mut(grandparent).color = Color::Red;
                node = grandparent;
                continue;
            }

            if parent_is_left {
                // triangle: rotate the parent so the pivot lies on a line
                let pivot = if self.node(parent).right == Some(node) {
                    self.rotate_left(parent);
                    node
                } else {
                    parent
                };
                self.node_mut(pivot).color = Color::Black;
                self.node_mut(grandparent).color = Color::Red;
                self.rotate_right(grandparent);
            } else {
                let pivot = if self.node(parent).left == Some(node) {
                    self.rotate_right(parent);
                    node
                } else {
                    parent
                };
                self.node_mut(pivot).color = Color::Black;
                self.node_mut(grandparent).color = Color::Red;
                self.rotate_left(grandparent);
            }
            break;
        }

        if let Some(root) = self.root {
            self.node_mut(root).color = Color::Black;
        }
    }

    /// Restores the color invariants at a node that absorbed a removed
    /// black node's deficiency.
    ///
    /// Runs until the deficient position is the root or red, then colors it
    /// black. A red sibling is rotated above the parent first; a black
    /// sibling with black children pushes the deficiency upward; otherwise
    /// one or two rotations around the sibling terminate the loop.
    fn fix_remove(&mut self, mut node: NodeId) {
        loop {
            let Some(parent) = self.node(node).parent else {
                break;
            };
            if self.node(node).color == Color::Red {
                break;
            }

            let node_is_left = self.node(parent).left == Some(node);
            let sibling_link = if node_is_left {
                self.node(parent).right
            } else {
                self.node(parent).left
            };
            let Some(mut sibling) = sibling_link else {
                unreachable!("a black-deficient node always has a sibling")
            };

            if self.node(sibling).color == Color::Red {
                self.node_mut(sibling).color = Color::Black;
                self.node_mut(parent).color = Color::Red;
                if node_is_left {
                    self.rotate_left(parent);
                } else {
                    self.rotate_right(parent);
                }
                // the new sibling is black; retry from the same position
                continue;
            }

            let sibling_left = self.node(sibling).left;
            let sibling_right = self.node(sibling).right;
            if !self.is_red(sibling_left) && !self.is_red(sibling_right) {
                self.node_mut(sibling).color = Color::Red;
                node = parent;
                continue;
            }

            if node_is_left {
                if !self.is_red(sibling_right) {
                    // near child red, far child black: straighten first
                    if let Some(near) = sibling_left {
                        self.node_mut(near).color = Color::Black;
                    }
                    self.node_mut(sibling).color = Color::Red;
                    self.rotate_right(sibling);
                    let Some(new_sibling) = self.node(parent).right else {
                        unreachable!("rotation preserved the sibling position")
                    };
                    sibling = new_sibling;
                }
                self.node_mut(sibling).color = self.node(parent).color;
                self.node_mut(parent).color = Color::Black;
                if let Some(far) = self.node(sibling).right {
                    self.node_mut(far).color = Color::Black;
                }
                self.rotate_left(parent);
            } else {
                if !self.is_red(sibling_left) {
                    if let Some(near) = sibling_right {
                        self.node_mut(near).color = Color::Black;
                    }
                    self.node_mut(sibling).color = Color::Red;
                    self.rotate_left(sibling);
                    let Some(new_sibling) = self.node(parent).left else {
                        unreachable!("rotation preserved the sibling position")
                    };
                    sibling = new_sibling;
                }
                self.node_mut(sibling).color = self.node(parent).color;
                self.node_mut(parent).color = Color::Black;
                if let Some(far) = self.node(sibling).left {
                    self.node_mut(far).color = Color::Black;
                }
                self.rotate_right(parent);
            }
            break;
        }

        self.node_mut(node).color = Color::Black;
    }

    /// Physically removes a node, returning its entry.
    ///
    /// A node with two children first exchanges entries with its in-order
    /// successor so that the node actually spliced out has at most one
    /// child. A childless black node is fixed up while still linked, then
    /// unlinked through its (possibly rotated) parent.
    fn remove_node(&mut self, mut node: NodeId) -> (K, V) {
        if let (Some(_), Some(right)) = (self.node(node).left, self.node(node).right) {
            let successor = self.min_in(right);
            self.swap_entries(node, successor);
            node = successor;
        }

        let removed_color = self.node(node).color;
        let parent = self.node(node).parent;
        let child = self.node(node).left.or(self.node(node).right);

        if let Some(child) = child {
            self.node_mut(child).parent = parent;
            self.replace_child(parent, node, Some(child));
            if removed_color == Color::Black {
                self.fix_remove(child);
            }
        } else if parent.is_none() {
            self.root = None;
        } else {
            if removed_color == Color::Black {
                self.fix_remove(node);
            }
            let current_parent = self.node(node).parent;
            self.replace_child(current_parent, node, None);
        }

        self.length -= 1;
        let removed = self.release(node);
        (removed.key, removed.value)
    }
}

// =============================================================================
// Structural Clone
// =============================================================================

/// Structural deep copy.
///
/// The clone is built by a breadth-first walk over a queue of
/// (original, copy) handle pairs into a fresh arena, so it shares no
/// storage with the original and its slots are compact regardless of how
/// fragmented the original's free list was.
impl<K: Clone, V: Clone, C: Clone> Clone for TreeMap<K, V, C> {
    fn clone(&self) -> Self {
        let mut cloned = Self {
            slots: Vec::with_capacity(self.length),
            free_head: None,
            root: None,
            length: self.length,
            comparator: self.comparator.clone(),
        };

        let Some(root) = self.root else {
            return cloned;
        };
        let cloned_root = cloned.allocate(self.node(root).duplicate());
        cloned.root = Some(cloned_root);

        let mut queue: VecDeque<(NodeId, NodeId)> = VecDeque::new();
        queue.push_back((root, cloned_root));

        while let Some((original, copy)) = queue.pop_front() {
            if let Some(left) = self.node(original).left {
                let cloned_left = cloned.allocate(self.node(left).duplicate());
                cloned.node_mut(cloned_left).parent = Some(copy);
                cloned.node_mut(copy).left = Some(cloned_left);
                queue.push_back((left, cloned_left));
            }
            if let Some(right) = self.node(original).right {
                let cloned_right = cloned.allocate(self.node(right).duplicate());
                cloned.node_mut(cloned_right).parent = Some(copy);
                cloned.node_mut(copy).right = Some(cloned_right);
                queue.push_back((right, cloned_right));
            }
        }

        cloned
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// A borrowed in-order iterator over the entries of a [`TreeMap`].
///
/// Starts at the minimum node and advances by in-order successor; once
/// exhausted it never becomes valid again.
pub struct Iter<'a, K, V, C = NaturalOrder> {
    tree: &'a TreeMap<K, V, C>,
    current: Link,
    remaining: usize,
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.successor(id);
        self.remaining -= 1;
        let tree = self.tree;
        let node = tree.node(id);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

/// An iterator over the values of a [`TreeMap`] in ascending key order.
pub struct Values<'a, K, V, C = NaturalOrder> {
    entries: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

/// An owning in-order iterator over the entries of a [`TreeMap`].
///
/// Drains the arena with an explicit left-spine stack; released slots are
/// never navigated again.
pub struct IntoIter<K, V, C = NaturalOrder> {
    tree: TreeMap<K, V, C>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<K, V, C> IntoIter<K, V, C> {
    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.tree.node(id).left;
        }
    }
}

impl<K, V, C> Iterator for IntoIter<K, V, C> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.release(id);
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> ExactSizeIterator for IntoIter<K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for IntoIter<K, V, C> {}

impl<K, V, C> IntoIterator for TreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C>;

    fn into_iter(mut self) -> Self::IntoIter {
        let remaining = self.length;
        let root = self.root.take();
        self.length = 0;
        let mut iterator = IntoIter {
            tree: self,
            stack: Vec::new(),
            remaining,
        };
        iterator.push_left_spine(root);
        iterator
    }
}

impl<'a, K, V, C> IntoIterator for &'a TreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Mutating Cursor
// =============================================================================

/// A mutating cursor over a [`TreeMap`], the modifying counterpart of
/// [`Iter`].
///
/// The cursor is either *valid* (positioned on an entry) or *exhausted*.
/// [`move_next`](Self::move_next) walks toward the maximum and eventually
/// exhausts the cursor; [`remove`](Self::remove) deletes the current entry
/// and advances to its in-order successor, or exhausts the cursor when the
/// removed entry was the maximum.
///
/// # Examples
///
/// ```rust
/// use ordmap::tree::TreeMap;
///
/// let mut map = TreeMap::new();
/// for key in 1..=4 {
///     map.insert(key, key * 10);
/// }
///
/// // Remove odd keys during traversal
/// let mut cursor = map.cursor_mut();
/// while let Some(key) = cursor.key().copied() {
///     if key % 2 == 1 {
///         cursor.remove();
///     } else {
///         cursor.move_next();
///     }
/// }
/// assert_eq!(map.keys(), vec![2, 4]);
/// ```
pub struct CursorMut<'a, K, V, C = NaturalOrder> {
    tree: &'a mut TreeMap<K, V, C>,
    current: Link,
}

impl<K, V, C> CursorMut<'_, K, V, C> {
    /// Returns `true` while the cursor is positioned on an entry.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the key of the current entry.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.current.map(|id| &self.tree.node(id).key)
    }

    /// Returns the value of the current entry.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.current.map(|id| &self.tree.node(id).value)
    }

    /// Returns a mutable reference to the value of the current entry.
    #[must_use]
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.current.map(|id| &mut self.tree.node_mut(id).value)
    }

    /// Returns the current entry as a key/value pair.
    #[must_use]
    pub fn entry(&self) -> Option<(&K, &V)> {
        self.current.map(|id| {
            let node = self.tree.node(id);
            (&node.key, &node.value)
        })
    }

    /// Overwrites the value of the current entry, returning the previous
    /// value, or `None` if the cursor is exhausted.
    pub fn set_value(&mut self, value: V) -> Option<V> {
        let id = self.current?;
        Some(std::mem::replace(&mut self.tree.node_mut(id).value, value))
    }

    /// Advances to the in-order successor. Once exhausted the cursor stays
    /// exhausted.
    pub fn move_next(&mut self) {
        if let Some(id) = self.current {
            self.current = self.tree.successor(id);
        }
    }

    /// Steps back to the in-order predecessor. Does nothing when the cursor
    /// is exhausted.
    pub fn move_prev(&mut self) {
        if let Some(id) = self.current {
            self.current = self.tree.predecessor(id);
        }
    }

    /// Removes the current entry and returns it.
    ///
    /// The cursor advances to the in-order successor of the removed entry,
    /// or becomes exhausted when the removed entry was the maximum. Returns
    /// `None` if the cursor is already exhausted.
    pub fn remove(&mut self) -> Option<(K, V)> {
        let id = self.current?;
        let node = self.tree.node(id);
        if node.left.is_some() && node.right.is_some() {
            // the successor's entry moves into this handle, so the cursor
            // is already positioned on the successor
            Some(self.tree.remove_node(id))
        } else {
            let next = self.tree.successor(id);
            let removed = self.tree.remove_node(id);
            self.current = next;
            Some(removed)
        }
    }
}

// =============================================================================
// Bulk-Load Collector
// =============================================================================

/// A [`Collector`] that accumulates key/value pairs into a [`TreeMap`].
///
/// Used to bulk-load a tree from a [`Stream`]; duplicate keys follow the
/// usual upsert rule, so the last occurrence wins.
///
/// # Examples
///
/// ```rust
/// use ordmap::stream::Stream;
/// use ordmap::tree::TreeMapCollector;
///
/// let stream = Stream::from_iterator(vec![(2, "two"), (1, "one")]);
/// let map = stream.collect_with(TreeMapCollector::new());
/// assert_eq!(map.keys(), vec![1, 2]);
/// ```
pub struct TreeMapCollector<K, V, C = NaturalOrder> {
    map: TreeMap<K, V, C>,
}

impl<K, V> TreeMapCollector<K, V> {
    /// Creates a collector targeting a naturally ordered map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            map: TreeMap::new(),
        }
    }
}

impl<K, V, C> TreeMapCollector<K, V, C> {
    /// Creates a collector targeting a map with the specified comparator.
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            map: TreeMap::with_comparator(comparator),
        }
    }
}

impl<K, V> Default for TreeMapCollector<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Compare<K>> Collector<(K, V)> for TreeMapCollector<K, V, C> {
    type Output = TreeMap<K, V, C>;

    fn supply(&mut self, (key, value): (K, V)) {
        self.map.insert(key, value);
    }

    fn finish(self) -> TreeMap<K, V, C> {
        self.map
    }
}

// =============================================================================
// Capability Surface
// =============================================================================

impl<K, V, C: Compare<K>> Map<K, V> for TreeMap<K, V, C> {
    fn len(&self) -> usize {
        self.length
    }

    fn contains_key(&self, key: &K) -> bool {
        Self::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        Self::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        Self::get_mut(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Self::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Self::remove(self, key)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        Self::keys(self)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, C: Default> Default for TreeMap<K, V, C> {
    #[inline]
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for TreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterable: I) -> Self {
        let mut map = Self::new();
        map.extend(iterable);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for TreeMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            self.insert(key, value);
        }
    }
}

/// Aborting accessor: panics on an absent key.
///
/// This is the caller-opt-in convenience counterpart of
/// [`TreeMap::fetch`]; code that wants to handle absence uses
/// [`TreeMap::get`] instead.
impl<K, V, C: Compare<K>> Index<&K> for TreeMap<K, V, C> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, C: Compare<K>> IndexMut<&K> for TreeMap<K, V, C> {
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index_mut(&mut self, key: &K) -> &mut V {
        self.get_mut(key).expect("no entry found for key")
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for TreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for TreeMap<K, V, C> {}

/// Hashes the length, then each entry in key order, so equal maps hash
/// equally regardless of insertion order.
impl<K: Hash, V: Hash, C> Hash for TreeMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for TreeMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, C> fmt::Display for TreeMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, C> serde::Serialize for TreeMap<K, V, C>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct TreeMapVisitor<K, V, C> {
    marker: std::marker::PhantomData<TreeMap<K, V, C>>,
}

#[cfg(feature = "serde")]
impl<K, V, C> TreeMapVisitor<K, V, C> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::de::Visitor<'de> for TreeMapVisitor<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Compare<K> + Default,
{
    type Value = TreeMap<K, V, C>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = TreeMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::Deserialize<'de> for TreeMap<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Compare<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(TreeMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
