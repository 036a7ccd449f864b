//! Property-based laws for TreeMap.

use ordmap::map::{KeyNotFound, Map};
use ordmap::tree::TreeMap;
use proptest::prelude::*;

fn build(pairs: &[(i32, i32)]) -> TreeMap<i32, i32> {
    pairs.iter().copied().collect()
}

proptest! {
    /// get returns the value just inserted.
    #[test]
    fn prop_get_after_insert(pairs in prop::collection::vec((0i32..100, any::<i32>()), 0..50), key in 0i32..100, value in any::<i32>()) {
        let mut map = build(&pairs);
        map.insert(key, value);
        prop_assert_eq!(map.get(&key), Some(&value));
        prop_assert_eq!(map.fetch(&key), Ok(&value));
    }

    /// Inserting one key never disturbs another.
    #[test]
    fn prop_insert_preserves_other_keys(pairs in prop::collection::vec((0i32..100, any::<i32>()), 0..50), key in 0i32..100, value in any::<i32>(), probe in 0i32..100) {
        let mut map = build(&pairs);
        let before = map.get(&probe).copied();
        map.insert(key, value);
        if probe != key {
            prop_assert_eq!(map.get(&probe).copied(), before);
        }
    }

    /// A removed key is gone; removal reports the stored value.
    #[test]
    fn prop_remove_deletes_key(pairs in prop::collection::vec((0i32..100, any::<i32>()), 0..50), key in 0i32..100) {
        let mut map = build(&pairs);
        let stored = map.get(&key).copied();
        prop_assert_eq!(map.remove(&key), stored);
        prop_assert_eq!(map.get(&key), None);
        prop_assert_eq!(map.fetch(&key), Err(KeyNotFound));
    }

    /// Removing one key never disturbs another.
    #[test]
    fn prop_remove_preserves_other_keys(pairs in prop::collection::vec((0i32..100, any::<i32>()), 0..50), key in 0i32..100, probe in 0i32..100) {
        let mut map = build(&pairs);
        let before = map.get(&probe).copied();
        map.remove(&key);
        if probe != key {
            prop_assert_eq!(map.get(&probe).copied(), before);
        }
    }

    /// len counts distinct keys, and insert/remove adjust it by one.
    #[test]
    fn prop_len_tracks_distinct_keys(pairs in prop::collection::vec((0i32..100, any::<i32>()), 0..50), key in 0i32..100) {
        let mut map = build(&pairs);
        let distinct: std::collections::BTreeSet<i32> = pairs.iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(map.len(), distinct.len());

        let had_key = map.contains_key(&key);
        let before = map.len();
        map.insert(key, 0);
        prop_assert_eq!(map.len(), if had_key { before } else { before + 1 });
        map.remove(&key);
        prop_assert_eq!(map.len(), if had_key { before - 1 } else { before });
    }

    /// Re-inserting an existing key replaces the value without growing the map.
    #[test]
    fn prop_duplicate_insert_keeps_size(pairs in prop::collection::vec((0i32..100, any::<i32>()), 1..50), value in any::<i32>()) {
        let mut map = build(&pairs);
        let key = pairs[0].0;
        let before = map.len();
        map.insert(key, value);
        prop_assert_eq!(map.len(), before);
        prop_assert_eq!(map.get(&key), Some(&value));
    }

    /// keys are strictly ascending, and iter agrees with keys.
    #[test]
    fn prop_keys_sorted_and_distinct(pairs in prop::collection::vec((any::<i32>(), any::<i32>()), 0..100)) {
        let map = build(&pairs);
        let keys = map.keys();
        prop_assert!(keys.windows(2).all(|window| window[0] < window[1]));
        let iterated: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
        prop_assert_eq!(iterated, keys);
    }

    /// min and max agree with the sorted key sequence.
    #[test]
    fn prop_min_max_are_extremes(pairs in prop::collection::vec((any::<i32>(), any::<i32>()), 0..100)) {
        let map = build(&pairs);
        let keys = map.keys();
        prop_assert_eq!(map.min().map(|(key, _)| *key), keys.first().copied());
        prop_assert_eq!(map.max().map(|(key, _)| *key), keys.last().copied());
    }

    /// A clone observes the same entries and absorbs edits independently.
    #[test]
    fn prop_clone_is_independent(pairs in prop::collection::vec((0i32..100, any::<i32>()), 0..50), key in 0i32..100) {
        let map = build(&pairs);
        let mut cloned = map.clone();
        prop_assert_eq!(&cloned, &map);

        cloned.insert(key, i32::MIN);
        cloned.remove(&key);
        prop_assert_eq!(map.keys().contains(&key), map.contains_key(&key));
        for (probe, value) in map.iter() {
            if *probe != key {
                prop_assert_eq!(cloned.get(probe), Some(value));
            }
        }
    }

    /// into_iter yields exactly the entries, in key order.
    #[test]
    fn prop_into_iter_matches_entries(pairs in prop::collection::vec((any::<i32>(), any::<i32>()), 0..100)) {
        let map = build(&pairs);
        let expected: Vec<(i32, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();
        let owned: Vec<(i32, i32)> = map.into_iter().collect();
        prop_assert_eq!(owned, expected);
    }
}
