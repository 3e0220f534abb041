//! AVX2 row loops for the 1D convolutions.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::F32_LANES;
use crate::image::Image;

/// Horizontal sum of the 8 lanes of `v`.
#[target_feature(enable = "avx2")]
unsafe fn hsum(v: __m256) -> f32 {
    let hi = _mm256_extractf128_ps::<1>(v);
    let lo = _mm256_castps256_ps128(v);
    let sum4 = _mm_add_ps(hi, lo);
    let hi2 = _mm_movehl_ps(sum4, sum4);
    let sum2 = _mm_add_ps(sum4, hi2);
    let hi1 = _mm_shuffle_ps::<0x01>(sum2, sum2);
    _mm_cvtss_f32(_mm_add_ss(sum2, hi1))
}

/// Convolves one row horizontally, accumulating taps 8 at a time.
///
/// Each output pixel reduces its tap accumulator with [`hsum`] and then adds
/// the remaining `width % 8` taps in scalar order.
///
/// # Safety
///
/// The CPU must support AVX2, and `dst` must hold at least
/// `src.len() - (taps.len() - 1) + offset` elements.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn horizontal_row(taps: &[f32], offset: usize, src: &[f32], dst: &mut [f32]) {
    let width = taps.len();
    if width == 0 || src.len() < width {
        return;
    }

    let body = width - width % F32_LANES;

    for (i, window) in src.windows(width).enumerate() {
        let mut acc = _mm256_setzero_ps();

        let mut t = 0;
        while t < body {
            let s = _mm256_loadu_ps(window.as_ptr().add(t));
            let k = _mm256_loadu_ps(taps.as_ptr().add(t));
            acc = _mm256_add_ps(acc, _mm256_mul_ps(s, k));
            t += F32_LANES;
        }

        let mut total = hsum(acc);
        for (s, k) in window[body..].iter().zip(&taps[body..]) {
            total += s * k;
        }

        dst[i + offset] = total;
    }
}

/// Convolves one output row vertically, 8 columns per register.
///
/// Lane `l` of the accumulator only ever holds column `x + l`, so every pixel
/// is summed in tap order exactly like the scalar loop.
///
/// # Safety
///
/// The CPU must support AVX2. Rows `first_row..first_row + taps.len()` must
/// exist in `src` and be at least `dst.len()` wide.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn vertical_row(
    taps: &[f32],
    src: &Image<f32>,
    first_row: usize,
    dst: &mut [f32],
) {
    let n = dst.len();
    let body = n - n % F32_LANES;

    let mut x = 0;
    while x < body {
        let mut acc = _mm256_setzero_ps();
        for (t, &k) in taps.iter().enumerate() {
            let row = &src.row(first_row + t)[..n];
            let s = _mm256_loadu_ps(row.as_ptr().add(x));
            acc = _mm256_add_ps(acc, _mm256_mul_ps(s, _mm256_set1_ps(k)));
        }
        _mm256_storeu_ps(dst.as_mut_ptr().add(x), acc);
        x += F32_LANES;
    }

    for (x, out) in dst.iter_mut().enumerate().skip(body) {
        let mut total = 0.0f32;
        for (t, &k) in taps.iter().enumerate() {
            total += src.row(first_row + t)[x] * k;
        }
        *out = total;
    }
}
