//! Image filtering benchmarks on a 1200x800 image.
//!
//! # Usage:
//! ```bash
//! cargo bench --bench image
//!
//! # One kernel family
//! cargo bench --bench image -- convolve
//! ```

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lanewise::harness::{fill_uniform, gaussian_kernel, seeded, DEFAULT_SEED};
use lanewise::image::{convolve, histogram, mean, threshold};
use lanewise::Image;

const WIDTH: usize = 1200;
const HEIGHT: usize = 800;

const MAX_PIXEL_U16: u16 = 2000;

fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve");
    let mut src = Image::<f32>::new(WIDTH, HEIGHT);
    fill_uniform(&mut src, 0.0, 255.0, &mut seeded(DEFAULT_SEED));
    let mut dst = src.create_same_shape();

    // kernel widths 5 and 31
    for radius in [2, 15] {
        let kernel = gaussian_kernel(radius);
        let width = kernel.width();

        group.bench_with_input(BenchmarkId::new("horizontal", width), &width, |b, _| {
            b.iter(|| convolve::horizontal(black_box(&kernel), black_box(&src), &mut dst))
        });
        group.bench_with_input(BenchmarkId::new("horizontal_vector", width), &width, |b, _| {
            b.iter(|| convolve::horizontal_vector(black_box(&kernel), black_box(&src), &mut dst))
        });
        group.bench_with_input(BenchmarkId::new("vertical", width), &width, |b, _| {
            b.iter(|| convolve::vertical(black_box(&kernel), black_box(&src), &mut dst))
        });
        group.bench_with_input(BenchmarkId::new("vertical_vector", width), &width, |b, _| {
            b.iter(|| convolve::vertical_vector(black_box(&kernel), black_box(&src), &mut dst))
        });
    }

    group.finish();
}

fn bench_u8(c: &mut Criterion) {
    let mut src = Image::<u8>::new(WIDTH, HEIGHT);
    fill_uniform(&mut src, 0, 255, &mut seeded(DEFAULT_SEED));
    let mut dst = src.create_same_shape();

    let mut group = c.benchmark_group("mean");
    group.bench_function("horizontal", |b| {
        b.iter(|| mean::horizontal(black_box(&src), &mut dst, 5, 11))
    });
    group.bench_function("horizontal_vector", |b| {
        b.iter(|| mean::horizontal_vector(black_box(&src), &mut dst, 5, 11))
    });
    group.finish();

    let mut group = c.benchmark_group("threshold");
    group.bench_function("scalar", |b| {
        b.iter(|| threshold::threshold(black_box(&src), &mut dst, 125))
    });
    group.bench_function("vector", |b| {
        b.iter(|| threshold::threshold_vector(black_box(&src), &mut dst, 125))
    });
    group.bench_function("vector_biased", |b| {
        b.iter(|| threshold::threshold_vector_biased(black_box(&src), &mut dst, 125))
    });
    group.finish();
}

fn bench_histogram(c: &mut Criterion) {
    let mut src = Image::<u16>::new(WIDTH, HEIGHT);
    fill_uniform(&mut src, 0, MAX_PIXEL_U16 - 1, &mut seeded(DEFAULT_SEED));
    let mut counts = vec![0u32; usize::from(MAX_PIXEL_U16)];

    let mut group = c.benchmark_group("histogram");
    group.bench_function("scalar", |b| {
        b.iter(|| histogram::histogram(black_box(&src), 0, &mut counts))
    });
    group.bench_function("vector", |b| {
        b.iter(|| histogram::histogram_vector(black_box(&src), 0, &mut counts))
    });
    group.finish();
}

criterion_group!(benches, bench_convolve, bench_u8, bench_histogram);
criterion_main!(benches);
