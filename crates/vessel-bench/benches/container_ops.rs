//! Criterion micro-benchmarks for container mutation against `Vec`.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vessel_bench::{insert_positions, policy_matrix, workload, SIZES};
use vessel_vec::{DynArray, RemapArray, StaticArray};

/// Benchmark: append `n` values one at a time.
fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    for &n in &SIZES {
        let values = workload(n, 42);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("std_vec", n), &values, |b, values| {
            b.iter(|| {
                let mut v = Vec::new();
                for &x in values {
                    v.push(x);
                }
                black_box(v.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("dyn_array", n), &values, |b, values| {
            b.iter(|| {
                let mut a = DynArray::new();
                for &x in values {
                    a.push(x).unwrap();
                }
                black_box(a.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("remap_array", n), &values, |b, values| {
            b.iter(|| {
                let mut a = RemapArray::new();
                for &x in values {
                    a.push(x).unwrap();
                }
                black_box(a.len());
            });
        });
    }
    group.finish();
}

/// Benchmark: append 4096 values under each growth policy.
fn bench_push_by_policy(c: &mut Criterion) {
    let values = workload(4096, 7);
    let mut group = c.benchmark_group("push_by_policy");
    for (name, policy) in policy_matrix() {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut a = DynArray::with_policy(policy.clone());
                for &x in &values {
                    a.push(x).unwrap();
                }
                black_box(a.capacity());
            });
        });
    }
    group.finish();
}

/// Benchmark: fill an inline array versus a pre-reserved `Vec`.
fn bench_static_push(c: &mut Criterion) {
    let values = workload(256, 3);
    let mut group = c.benchmark_group("static_push_256");
    group.bench_function("std_vec_reserved", |b| {
        b.iter(|| {
            let mut v = Vec::with_capacity(256);
            for &x in &values {
                v.push(x);
            }
            black_box(v.len());
        });
    });
    group.bench_function("static_array", |b| {
        b.iter(|| {
            let mut a = StaticArray::<u64, 256>::new();
            for &x in &values {
                a.push(x).unwrap();
            }
            black_box(a.len());
        });
    });
    group.finish();
}

/// Benchmark: 2048 single-element inserts at seeded positions.
fn bench_insert(c: &mut Criterion) {
    let values = workload(2048, 11);
    let positions = insert_positions(2048, 11);
    let mut group = c.benchmark_group("insert_2048");

    group.bench_function("std_vec", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for (&pos, &x) in positions.iter().zip(&values) {
                v.insert(pos, x);
            }
            black_box(v.len());
        });
    });

    group.bench_function("dyn_array", |b| {
        b.iter(|| {
            let mut a = DynArray::new();
            for (&pos, &x) in positions.iter().zip(&values) {
                a.insert(pos, x).unwrap();
            }
            black_box(a.len());
        });
    });

    group.bench_function("remap_array", |b| {
        b.iter(|| {
            let mut a = RemapArray::new();
            for (&pos, &x) in positions.iter().zip(&values) {
                a.insert(pos, x).unwrap();
            }
            black_box(a.len());
        });
    });
    group.finish();
}

/// Benchmark: bulk insert of `n` copies into the middle of a 1024-element array.
fn bench_insert_n(c: &mut Criterion) {
    let base = workload(1024, 5);
    let mut group = c.benchmark_group("insert_n");
    for &n in &SIZES {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("std_vec", n), &n, |b, &n| {
            b.iter(|| {
                let mut v = base.clone();
                v.splice(512..512, std::iter::repeat_n(9u64, n));
                black_box(v.len());
            });
        });
        group.bench_with_input(BenchmarkId::new("dyn_array", n), &n, |b, &n| {
            b.iter(|| {
                let mut a = DynArray::from_slice(&base).unwrap();
                a.insert_n(512, n, &9).unwrap();
                black_box(a.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_push,
    bench_push_by_policy,
    bench_static_push,
    bench_insert,
    bench_insert_n
);
criterion_main!(benches);
