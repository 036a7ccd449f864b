//! Integration tests for lazy streams and collectors.

use ordmap::stream::{Collector, Stream};
use ordmap::tree::{TreeMap, TreeMapCollector};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// Source Tests
// =============================================================================

#[rstest]
fn test_from_iterator_preserves_order() {
    let collected: Vec<i32> = Stream::from_iterator(vec![3, 1, 4, 1, 5]).collect();
    assert_eq!(collected, vec![3, 1, 4, 1, 5]);
}

#[rstest]
fn test_from_iterator_over_range() {
    let collected: Vec<i32> = Stream::from_iterator(1..=5).collect();
    assert_eq!(collected, vec![1, 2, 3, 4, 5]);
}

#[rstest]
fn test_supply_is_infinite_until_stopped() {
    let mut counter = 0;
    let collected: Vec<i32> = Stream::supply(move || {
        counter += 1;
        counter
    })
    .take(5)
    .collect();
    assert_eq!(collected, vec![1, 2, 3, 4, 5]);
}

#[rstest]
fn test_generate_yields_seed_first() {
    let collected: Vec<i32> = Stream::generate(5, |value| value + 10).take(3).collect();
    assert_eq!(collected, vec![5, 15, 25]);
}

// =============================================================================
// Laziness Tests
// =============================================================================

#[rstest]
fn test_no_production_without_demand() {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&produced);
    let stream = Stream::supply(move || counter.fetch_add(1, Ordering::SeqCst));

    assert_eq!(produced.load(Ordering::SeqCst), 0);
    stream.stop();
}

#[rstest]
fn test_production_matches_demand_exactly() {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&produced);
    let mut stream = Stream::supply(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..3 {
        stream.next();
    }
    assert_eq!(produced.load(Ordering::SeqCst), 3);
    drop(stream);
}

#[rstest]
fn test_stop_after_partial_consumption() {
    let mut stream = Stream::from_iterator(1..);
    assert_eq!(stream.next(), Some(1));
    assert_eq!(stream.next(), Some(2));
    stream.stop();
}

// =============================================================================
// Adaptation and Terminal Tests
// =============================================================================

#[rstest]
fn test_map_filter_pipeline() {
    let collected: Vec<i32> = Stream::from_iterator(1..=10)
        .map(|value| value * value)
        .filter(|value| value % 2 == 0)
        .collect();
    assert_eq!(collected, vec![4, 16, 36, 64, 100]);
}

#[rstest]
fn test_fold_terminal() {
    let product: i64 = Stream::from_iterator(1..=5i64).product();
    assert_eq!(product, 120);
}

#[rstest]
fn test_collect_with_tree_map_collector() {
    let stream = Stream::from_iterator(vec![(3, "three"), (1, "one"), (2, "two")]);
    let map = stream.collect_with(TreeMapCollector::new());

    assert_eq!(map.keys(), vec![1, 2, 3]);
    assert_eq!(map.get(&2), Some(&"two"));
}

#[rstest]
fn test_collector_last_duplicate_wins() {
    let stream = Stream::from_iterator(vec![(1, "first"), (1, "second")]);
    let map = stream.collect_with(TreeMapCollector::new());

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), Some(&"second"));
}

#[rstest]
fn test_custom_collector() {
    struct Joiner(String);

    impl Collector<char> for Joiner {
        type Output = String;

        fn supply(&mut self, item: char) {
            self.0.push(item);
        }

        fn finish(self) -> String {
            self.0
        }
    }

    let word = Stream::from_iterator("rust".chars()).collect_with(Joiner(String::new()));
    assert_eq!(word, "rust");
}

// =============================================================================
// Map-to-Stream Tests
// =============================================================================

#[rstest]
fn test_into_stream_yields_sorted_entries() {
    let mut map = TreeMap::new();
    map.insert(3, "three");
    map.insert(1, "one");
    map.insert(2, "two");

    let entries: Vec<(i32, &str)> = map.into_stream().collect();
    assert_eq!(entries, vec![(1, "one"), (2, "two"), (3, "three")]);
}

#[rstest]
fn test_into_stream_supports_early_stop() {
    let mut map = TreeMap::new();
    for key in 1..=100 {
        map.insert(key, ());
    }

    let first_two: Vec<i32> = map.into_stream().map(|(key, ())| key).take(2).collect();
    assert_eq!(first_two, vec![1, 2]);
}

#[rstest]
fn test_stream_round_trip_through_collector() {
    let mut map = TreeMap::new();
    for key in [5, 2, 8, 1] {
        map.insert(key, key * 10);
    }

    let rebuilt = map
        .clone()
        .into_stream()
        .collect_with(TreeMapCollector::new());
    assert_eq!(rebuilt, map);
}
