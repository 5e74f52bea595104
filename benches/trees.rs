// Tree engine benchmarks: insertion, search, and deletion across the
// three balanced engines and the plain BST baseline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use arboretum::{AvlTree, BTree, Bst, OrderedSet, RbTree};

fn shuffled_keys(size: usize) -> Vec<i64> {
    // Multiplicative stepping over a prime span gives a stable
    // pseudo-random order without seeding an RNG per iteration.
    let span = (2 * size + 1) as i64;
    (0..size as i64).map(|i| (i * 48271) % span).collect()
}

const ENGINE_NAMES: [&str; 4] = ["avl", "rbtree", "btree", "bst"];

fn engines(degree: usize) -> Vec<(&'static str, Box<dyn OrderedSet>)> {
    vec![
        ("avl", Box::new(AvlTree::new())),
        ("rbtree", Box::new(RbTree::new())),
        (
            "btree",
            Box::new(BTree::new(degree).expect("valid degree")),
        ),
        ("bst", Box::new(Bst::new())),
    ]
}

fn make_engine(name: &str) -> Box<dyn OrderedSet> {
    match name {
        "avl" => Box::new(AvlTree::new()),
        "rbtree" => Box::new(RbTree::new()),
        "btree" => Box::new(BTree::new(8).expect("valid degree")),
        _ => Box::new(Bst::new()),
    }
}

/// Benchmark insertion performance across engines
fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion");

    for size in [100, 1000, 10000].iter() {
        let keys = shuffled_keys(*size);
        for name in ENGINE_NAMES {
            group.bench_with_input(BenchmarkId::new(name, size), &keys, |b, keys| {
                b.iter(|| {
                    let mut set = make_engine(name);
                    for &k in keys {
                        set.insert(k).expect("insert");
                    }
                    black_box(set.len())
                });
            });
        }
    }

    group.finish();
}

/// Benchmark search performance on a pre-built structure
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1000, 10000].iter() {
        let keys = shuffled_keys(*size);
        for (name, mut set) in engines(8) {
            for &k in &keys {
                set.insert(k).expect("insert");
            }
            let probes: Vec<i64> = keys.iter().step_by(4).copied().collect();

            group.bench_with_input(BenchmarkId::new(name, size), &probes, |b, probes| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for &k in probes {
                        if set.contains(k) {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                });
            });
        }
    }

    group.finish();
}

/// Benchmark full drain: delete every key from a populated structure
fn bench_deletion(c: &mut Criterion) {
    let mut group = c.benchmark_group("deletion");

    for size in [100, 1000].iter() {
        let keys = shuffled_keys(*size);
        for name in ENGINE_NAMES {
            group.bench_with_input(BenchmarkId::new(name, size), &keys, |b, keys| {
                b.iter(|| {
                    let mut set = make_engine(name);
                    for &k in keys {
                        set.insert(k).expect("insert");
                    }
                    for &k in keys {
                        set.delete(k).expect("delete");
                    }
                    black_box(set.is_empty())
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_insertion, bench_search, bench_deletion);
criterion_main!(benches);
