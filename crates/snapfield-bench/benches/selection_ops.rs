//! Criterion micro-benchmarks for selector refinement and set algebra.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use snapfield_bench::{every_nth, BenchProfile};
use snapfield_snapshot::ParticleMask;

/// Benchmark: refine the 120K-particle `all` selector keeping every 3rd.
fn bench_select_every_third(c: &mut Criterion) {
    let snap = BenchProfile::reference().open().unwrap();
    let all = snap.all();
    let keep = every_nth(all.count(), 3);

    c.bench_function("select_every_third_120k", |b| {
        b.iter(|| black_box(all.select(&keep).unwrap()));
    });
}

/// Benchmark: union, intersection and difference of two overlapping
/// refinements.
fn bench_set_ops(c: &mut Criterion) {
    let snap = BenchProfile::reference().open().unwrap();
    let all = snap.all();
    let a = all.select(&every_nth(all.count(), 2)).unwrap();
    let b = all.select(&every_nth(all.count(), 3)).unwrap();

    c.bench_function("selector_union_120k", |bench| {
        bench.iter(|| black_box(a.union(&b).unwrap()));
    });
    c.bench_function("selector_intersection_120k", |bench| {
        bench.iter(|| black_box(a.intersection(&b).unwrap()));
    });
    c.bench_function("selector_difference_120k", |bench| {
        bench.iter(|| black_box(a.difference(&b).unwrap()));
    });
}

/// Benchmark: raw mask algebra without selector bookkeeping.
fn bench_mask_ops(c: &mut Criterion) {
    let a = ParticleMask::from_bools(&every_nth(1_000_000, 2));
    let b = ParticleMask::from_bools(&every_nth(1_000_000, 5));

    c.bench_function("mask_xor_1m", |bench| {
        bench.iter(|| black_box(a.symmetric_difference(&b)));
    });
    c.bench_function("mask_count_1m", |bench| {
        bench.iter(|| black_box(a.count()));
    });
}

/// Benchmark: filter gas by density.
fn bench_filter(c: &mut Criterion) {
    let snap = BenchProfile::reference().open().unwrap();
    let gas = snap.selector("gas").unwrap();

    c.bench_function("filter_dense_gas_100k", |b| {
        b.iter(|| black_box(gas.filter("rho", |row| row[0] > 0.5).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_select_every_third,
    bench_set_ops,
    bench_mask_ops,
    bench_filter,
);
criterion_main!(benches);
