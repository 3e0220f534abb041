//! Value histograms of `u16` images.
//!
//! Sample `s` is counted in bucket `s - min_value`. Every sample must be at
//! least `min_value` and the count slice must reach the largest bucket;
//! [`crate::KernelConfig::histogram`] checks both.

use rayon::prelude::*;

use crate::{
    config::{Parallelism, Variant},
    image::Image,
};

/// Number of interleaved sub-histograms used by the vector form.
const SUB_HISTOGRAMS: usize = 4;

/// Zeroes `counts` and counts every sample of `src` into it.
pub fn histogram(src: &Image<u16>, min_value: u16, counts: &mut [u32]) {
    compute(src, min_value, counts, Variant::Scalar, Parallelism::Sequential);
}

/// Same counts as [`histogram`], accumulated into four sub-histograms (one
/// per lane of a four-sample group) that are merged at the end.
///
/// Consecutive equal samples land in different sub-histograms, so the
/// increments of one group never depend on each other.
pub fn histogram_vector(src: &Image<u16>, min_value: u16, counts: &mut [u32]) {
    compute(src, min_value, counts, Variant::Vector, Parallelism::Sequential);
}

pub(crate) fn compute(
    src: &Image<u16>,
    min_value: u16,
    counts: &mut [u32],
    variant: Variant,
    parallelism: Parallelism<'_>,
) {
    let ways = match variant {
        Variant::Scalar => 1,
        Variant::Vector => SUB_HISTOGRAMS,
    };
    let len = counts.len() * ways;

    let partial = match parallelism {
        Parallelism::Sequential if ways == 1 => {
            counts.fill(0);
            for y in 0..src.height() {
                count_row(src.row(y), min_value, counts, variant);
            }
            return;
        }
        Parallelism::Sequential => {
            let mut partial = vec![0u32; len];
            for y in 0..src.height() {
                count_row(src.row(y), min_value, &mut partial, variant);
            }
            partial
        }
        Parallelism::Global => fold_rows(src, min_value, len, variant),
        Parallelism::Pool(pool) => pool.install(|| fold_rows(src, min_value, len, variant)),
    };

    for (count, group) in counts.iter_mut().zip(partial.chunks_exact(ways)) {
        *count = group.iter().sum();
    }
}

/// Per-thread partial histograms over blocks of rows, summed pairwise.
fn fold_rows(src: &Image<u16>, min_value: u16, len: usize, variant: Variant) -> Vec<u32> {
    (0..src.height())
        .into_par_iter()
        .fold(
            || vec![0u32; len],
            |mut partial, y| {
                count_row(src.row(y), min_value, &mut partial, variant);
                partial
            },
        )
        .reduce(
            || vec![0u32; len],
            |mut left, right| {
                for (l, r) in left.iter_mut().zip(&right) {
                    *l += r;
                }
                left
            },
        )
}

#[inline(always)]
fn bucket(sample: u16, min_value: u16) -> usize {
    usize::from(sample) - usize::from(min_value)
}

/// Adds the samples of one row to `partial`.
///
/// The scalar layout is one slot per bucket; the vector layout gives every
/// bucket [`SUB_HISTOGRAMS`] adjacent slots, one per lane.
fn count_row(row: &[u16], min_value: u16, partial: &mut [u32], variant: Variant) {
    match variant {
        Variant::Scalar => {
            for &s in row {
                partial[bucket(s, min_value)] += 1;
            }
        }
        Variant::Vector => {
            let mut groups = row.chunks_exact(SUB_HISTOGRAMS);
            for group in &mut groups {
                for (lane, &s) in group.iter().enumerate() {
                    partial[bucket(s, min_value) * SUB_HISTOGRAMS + lane] += 1;
                }
            }
            for &s in groups.remainder() {
                partial[bucket(s, min_value) * SUB_HISTOGRAMS] += 1;
            }
        }
    }
}
