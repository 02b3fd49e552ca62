//! Criterion micro-benchmarks for growth policies.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use vessel_bench::policy_matrix;
use vessel_growth::GrowthPolicy;

/// Walk a policy from zero to `target` one element at a time and count the
/// capacity changes a container would make.
fn reallocations<P: GrowthPolicy>(policy: &P, target: usize) -> usize {
    let mut cap = 0;
    let mut moves = 0;
    for required in 1..=target {
        if required > cap {
            cap = policy
                .next_capacity(cap, required)
                .map_or(required, |c| c.max(required));
            moves += 1;
        }
    }
    moves
}

/// Benchmark: cost of the capacity decisions for one million pushes.
fn bench_policy_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_walk_1m");
    for (name, policy) in policy_matrix() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(reallocations(&policy, black_box(1_000_000))));
        });
    }
    group.finish();
}

/// Benchmark: a single capacity query far from the origin.
fn bench_next_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_capacity");
    for (name, policy) in policy_matrix() {
        group.bench_function(name, |b| {
            b.iter(|| policy.next_capacity(black_box(1 << 20), black_box((1 << 20) + 1)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_policy_walk, bench_next_capacity);
criterion_main!(benches);
