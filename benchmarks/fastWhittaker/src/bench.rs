//! Whittaker baseline benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Scalability (1K to 50K points)
//! - Weighting methods on one spectrum
//! - Smoothing parameter and difference order
//! - Unevenly sampled spectra
//! - Stacks of spectra fitted row by row
//!
//! For serial execution over rows, use `FASTWHITTAKER_MODE=serial cargo bench`.
//! For parallel execution over rows, use `FASTWHITTAKER_MODE=parallel cargo bench`.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fastWhittaker::prelude::*;
use spectra::{fluorescence_spectrum, raman_spectrum, spectrum_stack, uneven_spectrum};
use std::env;
use std::hint::black_box;

// ============================================================================
// Helper Functions
// ============================================================================

fn get_config() -> (bool, &'static str) {
    match env::var("FASTWHITTAKER_MODE").ok().as_deref() {
        Some("serial") => (false, "serial"),
        Some("parallel") | _ => (true, "parallel"),
    }
}

// ============================================================================
// Benchmark Functions
// ============================================================================

fn bench_scalability(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalability");
    group.sample_size(30);

    for size in [1_000, 5_000, 10_000, 50_000] {
        group.throughput(Throughput::Elements(size as u64));
        let (_, y) = raman_spectrum(size, 42);

        group.bench_with_input(BenchmarkId::new("arpls", size), &size, |b, _| {
            b.iter(|| {
                Whittaker::new()
                    .method(ArPLS)
                    .lambda(1e6)
                    .adapter(Batch)
                    .build()
                    .unwrap()
                    .fit(black_box(&y))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("methods");
    group.sample_size(50);

    let (_, y) = raman_spectrum(5_000, 42);
    for method in WeightingMethod::ALL {
        group.bench_with_input(BenchmarkId::new("fit", method), &method, |b, &method| {
            b.iter(|| {
                Whittaker::new()
                    .method(method)
                    .adapter(Batch)
                    .build()
                    .unwrap()
                    .fit(black_box(&y))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_lambda(c: &mut Criterion) {
    let mut group = c.benchmark_group("lambda");
    group.sample_size(50);

    let (_, y) = fluorescence_spectrum(5_000, 42);
    for lambda in [1e2, 1e4, 1e6, 1e8] {
        group.bench_with_input(BenchmarkId::new("asls", lambda), &lambda, |b, &lambda| {
            b.iter(|| {
                Whittaker::new()
                    .method(AsLS)
                    .lambda(lambda)
                    .p(0.01)
                    .adapter(Batch)
                    .build()
                    .unwrap()
                    .fit(black_box(&y))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_difference_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("difference_order");
    group.sample_size(50);

    let (_, y) = raman_spectrum(5_000, 42);
    for order in [1, 2, 3, 4] {
        group.bench_with_input(BenchmarkId::new("airpls", order), &order, |b, &order| {
            b.iter(|| {
                Whittaker::new()
                    .method(AirPLS)
                    .difference_order(order)
                    .adapter(Batch)
                    .build()
                    .unwrap()
                    .fit(black_box(&y))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_uneven(c: &mut Criterion) {
    let mut group = c.benchmark_group("uneven");
    group.sample_size(50);

    for size in [1_000, 5_000] {
        let (x, y) = uneven_spectrum(size, 42);
        group.bench_with_input(BenchmarkId::new("drpls", size), &size, |b, _| {
            b.iter(|| {
                Whittaker::new()
                    .method(DrPLS)
                    .adapter(Batch)
                    .build()
                    .unwrap()
                    .fit_with_x(black_box(&x), black_box(&y))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_stack(c: &mut Criterion) {
    let (use_parallel, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("stack_{}", mode_name));
    group.sample_size(20);

    for rows in [16, 64, 256] {
        let signals = spectrum_stack(rows, 2_000, 42);
        group.throughput(Throughput::Elements((rows * 2_000) as u64));

        group.bench_with_input(BenchmarkId::new("arpls", rows), &rows, |b, _| {
            b.iter(|| {
                Whittaker::new()
                    .method(ArPLS)
                    .adapter(Batch)
                    .parallel(use_parallel)
                    .build()
                    .unwrap()
                    .fit_rows(black_box(&signals))
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_scalability,
    bench_methods,
    bench_lambda,
    bench_difference_order,
    bench_uneven,
    bench_stack,
);

criterion_main!(benches);
