//! Benchmarks for exact-level follower resolution
//!
//! Run with: cargo bench -p nth-level-followers

use challenge_api::{NodeId, UserRecord};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nth_level_followers::graph::{find_at_level, Graph};
use rand::prelude::*;

// ============================================================================
// Helpers for synthetic graph generation
// ============================================================================

/// 0 -> 1 -> 2 -> ... -> n-1
fn generate_linear_chain(n: NodeId) -> Graph {
    let records = (0..n)
        .map(|id| {
            let follows = if id + 1 < n { vec![id + 1] } else { vec![] };
            UserRecord::new(id, follows)
        })
        .collect::<Vec<_>>();
    Graph::from_records(records)
}

/// Root follows every other node directly
fn generate_wide_graph(n: NodeId) -> Graph {
    let mut records = vec![UserRecord::new(0, (1..n).collect())];
    records.extend((1..n).map(|id| UserRecord::new(id, vec![])));
    Graph::from_records(records)
}

/// Random follows with a fixed seed, so runs are comparable
fn generate_random_graph(n: NodeId, out_degree: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = (0..n)
        .map(|id| {
            let follows = (0..out_degree).map(|_| rng.gen_range(0..n)).collect();
            UserRecord::new(id, follows)
        })
        .collect::<Vec<_>>();
    Graph::from_records(records)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_linear_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_linear_chain");

    for size in [100, 1_000, 10_000] {
        let graph = generate_linear_chain(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| find_at_level(black_box(&graph), 0, size - 1));
        });
    }

    group.finish();
}

fn bench_wide_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_wide_graph");

    for size in [100, 1_000, 10_000] {
        let graph = generate_wide_graph(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| find_at_level(black_box(&graph), 0, 1));
        });
    }

    group.finish();
}

fn bench_random_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_random_graph");

    for (nodes, level) in [(1_000, 2), (1_000, 4), (10_000, 3), (10_000, 6)] {
        let graph = generate_random_graph(nodes, 4, 42);
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("{}_nodes", nodes), level),
            &level,
            |b, &level| {
                b.iter(|| find_at_level(black_box(&graph), 0, level));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_linear_chain,
    bench_wide_graph,
    bench_random_graph
);
criterion_main!(benches);
