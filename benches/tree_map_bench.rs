//! Benchmarks comparing TreeMap with std::collections::BTreeMap.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ordmap::tree::TreeMap;
use std::collections::BTreeMap;

const SIZES: &[usize] = &[100, 1_000, 10_000];

fn bench_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for &size in SIZES {
        group.bench_with_input(BenchmarkId::new("TreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = TreeMap::new();
                for key in 0..size {
                    map.insert(black_box(key), key * 2);
                }
                map
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = BTreeMap::new();
                for key in 0..size {
                    map.insert(black_box(key), key * 2);
                }
                map
            });
        });
    }

    group.finish();
}

fn bench_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for &size in SIZES {
        let tree_map: TreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();
        let btree_map: BTreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();

        group.bench_with_input(BenchmarkId::new("TreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for key in 0..size {
                    black_box(tree_map.get(&key));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for key in 0..size {
                    black_box(btree_map.get(&key));
                }
            });
        });
    }

    group.finish();
}

fn bench_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("remove");

    for &size in SIZES {
        let tree_map: TreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();
        let btree_map: BTreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();

        group.bench_with_input(BenchmarkId::new("TreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = tree_map.clone();
                for key in 0..size {
                    map.remove(black_box(&key));
                }
                map
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = btree_map.clone();
                for key in 0..size {
                    map.remove(black_box(&key));
                }
                map
            });
        });
    }

    group.finish();
}

fn bench_iterate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iterate");

    for &size in SIZES {
        let tree_map: TreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();
        let btree_map: BTreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();

        group.bench_with_input(BenchmarkId::new("TreeMap", size), &size, |bencher, _| {
            bencher.iter(|| tree_map.values().sum::<usize>());
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, _| {
            bencher.iter(|| btree_map.values().sum::<usize>());
        });
    }

    group.finish();
}

fn bench_clone(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("clone");

    for &size in SIZES {
        let tree_map: TreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();
        let btree_map: BTreeMap<usize, usize> = (0..size).map(|key| (key, key * 2)).collect();

        group.bench_with_input(BenchmarkId::new("TreeMap", size), &size, |bencher, _| {
            bencher.iter(|| tree_map.clone());
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, _| {
            bencher.iter(|| btree_map.clone());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_get,
    bench_remove,
    bench_iterate,
    bench_clone
);
criterion_main!(benches);
