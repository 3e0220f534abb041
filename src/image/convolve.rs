//! 1D convolution of `f32` images without border handling.
//!
//! For a kernel of width `w` and anchor `offset`:
//!
//! - [`horizontal`] writes `dst[y][i + offset] = Σ_t src[y][i + t] * k[t]` for
//!   `0 <= i < width - (w - 1)`;
//! - [`vertical`] writes `dst[y][x] = Σ_t src[y - offset + t][x] * k[t]` for
//!   `offset <= y < height - (w - offset - 1)`.
//!
//! Pixels outside those ranges are the border and are never written.
//!
//! The horizontal vector form sums taps in lane groups and reduces each group
//! horizontally, so it agrees with the scalar form only to a tolerance. The
//! vertical vector form gives each lane its own column and matches exactly.

use crate::{
    config::{Parallelism, Variant},
    image::{Image, Kernel1D},
    simd::{lanes::F32x8, Backend},
};

/// Scalar horizontal convolution.
pub fn horizontal(kernel: &Kernel1D, src: &Image<f32>, dst: &mut Image<f32>) {
    convolve_horizontal(
        kernel,
        src,
        dst,
        Variant::Scalar,
        Backend::Portable,
        Parallelism::Sequential,
    );
}

/// Lane-vectorized horizontal convolution on the detected backend.
pub fn horizontal_vector(kernel: &Kernel1D, src: &Image<f32>, dst: &mut Image<f32>) {
    convolve_horizontal(
        kernel,
        src,
        dst,
        Variant::Vector,
        Backend::detect(),
        Parallelism::Sequential,
    );
}

/// Scalar vertical convolution.
pub fn vertical(kernel: &Kernel1D, src: &Image<f32>, dst: &mut Image<f32>) {
    convolve_vertical(
        kernel,
        src,
        dst,
        Variant::Scalar,
        Backend::Portable,
        Parallelism::Sequential,
    );
}

/// Lane-vectorized vertical convolution on the detected backend.
pub fn vertical_vector(kernel: &Kernel1D, src: &Image<f32>, dst: &mut Image<f32>) {
    convolve_vertical(
        kernel,
        src,
        dst,
        Variant::Vector,
        Backend::detect(),
        Parallelism::Sequential,
    );
}

pub(crate) fn convolve_horizontal(
    kernel: &Kernel1D,
    src: &Image<f32>,
    dst: &mut Image<f32>,
    variant: Variant,
    backend: Backend,
    parallelism: Parallelism<'_>,
) {
    let taps = kernel.data();
    let offset = kernel.offset();

    dst.for_each_row_mut(parallelism, |y, dst_row| {
        let src_row = src.row(y);
        match variant {
            Variant::Scalar => horizontal_row(taps, offset, src_row, dst_row),
            Variant::Vector => horizontal_row_vector(taps, offset, src_row, dst_row, backend),
        }
    });
}

pub(crate) fn convolve_vertical(
    kernel: &Kernel1D,
    src: &Image<f32>,
    dst: &mut Image<f32>,
    variant: Variant,
    backend: Backend,
    parallelism: Parallelism<'_>,
) {
    let taps = kernel.data();
    let offset = kernel.offset();
    let tail = taps.len() - offset - 1;
    let height = src.height();

    dst.for_each_row_mut(parallelism, |y, dst_row| {
        if y < offset || y + tail >= height {
            return;
        }

        let first_row = y - offset;
        match variant {
            Variant::Scalar => vertical_row(taps, src, first_row, dst_row),
            Variant::Vector => vertical_row_vector(taps, src, first_row, dst_row, backend),
        }
    });
}

fn horizontal_row(taps: &[f32], offset: usize, src: &[f32], dst: &mut [f32]) {
    if src.len() < taps.len() {
        return;
    }

    for (i, window) in src.windows(taps.len()).enumerate() {
        let mut total = 0.0f32;
        for (s, k) in window.iter().zip(taps) {
            total += s * k;
        }
        dst[i + offset] = total;
    }
}

fn horizontal_row_vector(
    taps: &[f32],
    offset: usize,
    src: &[f32],
    dst: &mut [f32],
    backend: Backend,
) {
    match backend {
        #[cfg(all(avx2, target_arch = "x86_64"))]
        Backend::Avx2 => unsafe {
            crate::simd::avx2::convolve::horizontal_row(taps, offset, src, dst)
        },
        _ => horizontal_row_lanes(taps, offset, src, dst),
    }
}

fn horizontal_row_lanes(taps: &[f32], offset: usize, src: &[f32], dst: &mut [f32]) {
    if src.len() < taps.len() {
        return;
    }

    for (i, window) in src.windows(taps.len()).enumerate() {
        let mut acc = F32x8::zeros();

        let mut s_chunks = window.chunks_exact(F32x8::LANES);
        let mut k_chunks = taps.chunks_exact(F32x8::LANES);
        for (s, k) in (&mut s_chunks).zip(&mut k_chunks) {
            acc = acc + F32x8::load(s) * F32x8::load(k);
        }

        let mut total = acc.reduce_sum();
        for (s, k) in s_chunks.remainder().iter().zip(k_chunks.remainder()) {
            total += s * k;
        }

        dst[i + offset] = total;
    }
}

fn vertical_row(taps: &[f32], src: &Image<f32>, first_row: usize, dst: &mut [f32]) {
    for (x, out) in dst.iter_mut().enumerate() {
        let mut total = 0.0f32;
        for (t, k) in taps.iter().enumerate() {
            total += src.row(first_row + t)[x] * k;
        }
        *out = total;
    }
}

fn vertical_row_vector(
    taps: &[f32],
    src: &Image<f32>,
    first_row: usize,
    dst: &mut [f32],
    backend: Backend,
) {
    match backend {
        #[cfg(all(avx2, target_arch = "x86_64"))]
        Backend::Avx2 => unsafe {
            crate::simd::avx2::convolve::vertical_row(taps, src, first_row, dst)
        },
        _ => vertical_row_lanes(taps, src, first_row, dst),
    }
}

fn vertical_row_lanes(taps: &[f32], src: &Image<f32>, first_row: usize, dst: &mut [f32]) {
    let body = dst.len() - dst.len() % F32x8::LANES;

    for (x, out) in (0..body)
        .step_by(F32x8::LANES)
        .zip(dst.chunks_exact_mut(F32x8::LANES))
    {
        let mut acc = F32x8::zeros();
        for (t, &k) in taps.iter().enumerate() {
            acc = acc + F32x8::load(&src.row(first_row + t)[x..]) * F32x8::splat(k);
        }
        acc.store(out);
    }

    for (x, out) in dst.iter_mut().enumerate().skip(body) {
        let mut total = 0.0f32;
        for (t, k) in taps.iter().enumerate() {
            total += src.row(first_row + t)[x] * k;
        }
        *out = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Image<f32> {
        let data = (0..width * height).map(|v| v as f32).collect();
        Image::from_parts(data, width, height, width, 0).unwrap()
    }

    #[test]
    fn horizontal_writes_anchor_aligned_columns() {
        let src = ramp(6, 1);
        let kernel = Kernel1D::new(vec![1.0, 10.0, 100.0], 1).unwrap();
        let mut dst = Image::from_parts(vec![-1.0; 6], 6, 1, 6, 0).unwrap();

        horizontal(&kernel, &src, &mut dst);

        // src = 0 1 2 3 4 5
        assert_eq!(dst.row(0), &[-1.0, 210.0, 321.0, 432.0, 543.0, -1.0]);
    }

    #[test]
    fn vertical_writes_anchor_aligned_rows() {
        let src = ramp(2, 4);
        let kernel = Kernel1D::new(vec![1.0, 1.0], 0).unwrap();
        let mut dst = Image::from_parts(vec![-1.0; 8], 2, 4, 2, 0).unwrap();

        vertical(&kernel, &src, &mut dst);

        assert_eq!(dst.row(0), &[2.0, 4.0]);
        assert_eq!(dst.row(2), &[10.0, 12.0]);
        assert_eq!(dst.row(3), &[-1.0, -1.0]);
    }

    #[test]
    fn lane_forms_handle_short_and_long_kernels() {
        let src = ramp(40, 3);
        for width in [1usize, 7, 8, 9, 17] {
            let taps: Vec<f32> = (0..width).map(|t| 0.5 / (t + 1) as f32).collect();
            let kernel = Kernel1D::new(taps, width / 2).unwrap();

            let mut expected = src.create_same_shape();
            let mut found = src.create_same_shape();
            horizontal(&kernel, &src, &mut expected);
            convolve_horizontal(
                &kernel,
                &src,
                &mut found,
                Variant::Vector,
                Backend::Portable,
                Parallelism::Sequential,
            );

            for (e, f) in expected.data().iter().zip(found.data()) {
                assert!((e - f).abs() <= 1e-4 * e.abs().max(1.0), "width {width}: {e} != {f}");
            }
        }
    }

    #[test]
    fn vertical_lanes_match_scalar_exactly() {
        let src = ramp(21, 9);
        let kernel = Kernel1D::new(vec![0.25, 0.5, 0.125, 0.0625], 2).unwrap();

        let mut expected = src.create_same_shape();
        let mut found = src.create_same_shape();
        vertical(&kernel, &src, &mut expected);
        convolve_vertical(
            &kernel,
            &src,
            &mut found,
            Variant::Vector,
            Backend::Portable,
            Parallelism::Sequential,
        );

        assert_eq!(expected, found);
    }

    #[test]
    fn kernel_wider_than_image_leaves_destination_alone() {
        let src = ramp(3, 2);
        let kernel = Kernel1D::new(vec![1.0; 5], 2).unwrap();
        let mut dst = Image::from_parts(vec![7.0; 6], 3, 2, 3, 0).unwrap();

        horizontal_vector(&kernel, &src, &mut dst);
        vertical_vector(&kernel, &src, &mut dst);

        assert!(dst.data().iter().all(|&v| v == 7.0));
    }
}
