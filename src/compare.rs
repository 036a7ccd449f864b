//! Comparators: injected total orders over keys.
//!
//! A [`TreeMap`](crate::tree::TreeMap) never synthesizes a key ordering on
//! its own; every tree carries a comparator supplied at construction. This
//! module provides the [`Compare`] trait, the [`NaturalOrder`] comparator
//! for keys that are `Ord`, the [`Reversed`] adapter, and the [`from_fn`]
//! wrapper for closure comparators.
//!
//! ```rust
//! use ordmap::compare::from_fn;
//! use ordmap::tree::TreeMap;
//!
//! let mut by_length = TreeMap::with_comparator(from_fn(|left: &String, right: &String| {
//!     left.len().cmp(&right.len())
//! }));
//! by_length.insert("ccc".to_string(), 3);
//! by_length.insert("a".to_string(), 1);
//! assert_eq!(by_length.keys(), vec!["a".to_string(), "ccc".to_string()]);
//! ```

use std::cmp::Ordering;

/// A three-way total order over keys of type `K`.
///
/// Implementations must be **strict, total, and transitive**: for any keys
/// `a`, `b`, `c`, exactly one of `Less`/`Equal`/`Greater` holds for
/// `(a, b)`, `compare(a, b)` is the inverse of `compare(b, a)`, and
/// `a <= b <= c` implies `a <= c`. A comparator that violates this contract
/// (or answers inconsistently across calls) is a caller precondition breach:
/// the tree does not detect it at runtime and its structure becomes
/// unspecified.
pub trait Compare<K: ?Sized> {
    /// Compares two keys, returning their relative order.
    fn compare(&self, left: &K, right: &K) -> Ordering;
}

/// The standard ordering comparator for keys that implement [`Ord`].
///
/// This is what [`TreeMap::new`](crate::tree::TreeMap::new) supplies, so
/// naturally ordered key types need no explicit comparator.
///
/// # Examples
///
/// ```rust
/// use ordmap::compare::{Compare, NaturalOrder};
/// use std::cmp::Ordering;
///
/// assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
/// assert_eq!(NaturalOrder.compare(&2, &2), Ordering::Equal);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Compare<K> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Adapter that inverts another comparator.
///
/// # Examples
///
/// ```rust
/// use ordmap::compare::{NaturalOrder, Reversed};
/// use ordmap::tree::TreeMap;
///
/// let mut map = TreeMap::with_comparator(Reversed(NaturalOrder));
/// map.insert(1, "one");
/// map.insert(3, "three");
/// map.insert(2, "two");
/// assert_eq!(map.keys(), vec![3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reversed<C>(pub C);

impl<K: ?Sized, C: Compare<K>> Compare<K> for Reversed<C> {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self.0.compare(left, right).reverse()
    }
}

/// A comparator backed by a plain ordering function.
///
/// Constructed with [`from_fn`].
#[derive(Clone, Copy, Debug)]
pub struct FromFn<F>(F);

/// Wraps an ordering function into a [`Compare`] implementation.
///
/// # Examples
///
/// ```rust
/// use ordmap::compare::{Compare, from_fn};
/// use std::cmp::Ordering;
///
/// let descending = from_fn(|left: &i32, right: &i32| right.cmp(left));
/// assert_eq!(descending.compare(&1, &2), Ordering::Greater);
/// ```
#[inline]
pub const fn from_fn<K: ?Sized, F>(function: F) -> FromFn<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    FromFn(function)
}

impl<K: ?Sized, F> Compare<K> for FromFn<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        (self.0)(left, right)
    }
}

// =============================================================================
// Tests
// =============================================================================
