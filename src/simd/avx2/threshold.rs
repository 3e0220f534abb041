//! AVX2 byte thresholds.
//!
//! AVX2 has no unsigned byte comparison. `_mm256_cmpgt_epi8` compares signed
//! bytes, so a sample of 200 reads as -56 and passes a `<= 125` test. The two
//! correct strategies below either build the compare from an unsigned max or
//! shift both operands into signed range first; [`threshold_signed`] keeps the
//! broken form for tests that demonstrate the failure.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::U8_LANES;

/// `dst[x] = (src[x] <= threshold) as u8` via `max_epu8(x, t) == t`.
///
/// # Safety
///
/// The CPU must support AVX2 and `dst` must be at least as long as `src`.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn threshold_unsigned(src: &[u8], dst: &mut [u8], threshold: u8) {
    let n = src.len();
    let dst = &mut dst[..n];
    let body = n - n % U8_LANES;

    let vt = _mm256_set1_epi8(threshold as i8);
    let one = _mm256_set1_epi8(1);

    let mut x = 0;
    while x < body {
        let v = _mm256_loadu_si256(src.as_ptr().add(x) as *const __m256i);
        let le = _mm256_cmpeq_epi8(_mm256_max_epu8(v, vt), vt);
        let out = _mm256_and_si256(le, one);
        _mm256_storeu_si256(dst.as_mut_ptr().add(x) as *mut __m256i, out);
        x += U8_LANES;
    }

    for (out, &s) in dst[body..].iter_mut().zip(&src[body..]) {
        *out = u8::from(s <= threshold);
    }
}

/// Same result as [`threshold_unsigned`], computed by flipping the top bit of
/// both operands and using the signed `cmpgt`.
///
/// # Safety
///
/// The CPU must support AVX2 and `dst` must be at least as long as `src`.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn threshold_biased(src: &[u8], dst: &mut [u8], threshold: u8) {
    let n = src.len();
    let dst = &mut dst[..n];
    let body = n - n % U8_LANES;

    let bias = _mm256_set1_epi8(i8::MIN);
    let vt = _mm256_set1_epi8((threshold ^ 0x80) as i8);
    let one = _mm256_set1_epi8(1);

    let mut x = 0;
    while x < body {
        let v = _mm256_loadu_si256(src.as_ptr().add(x) as *const __m256i);
        let gt = _mm256_cmpgt_epi8(_mm256_xor_si256(v, bias), vt);
        let out = _mm256_andnot_si256(gt, one);
        _mm256_storeu_si256(dst.as_mut_ptr().add(x) as *mut __m256i, out);
        x += U8_LANES;
    }

    for (out, &s) in dst[body..].iter_mut().zip(&src[body..]) {
        *out = u8::from(s <= threshold);
    }
}

/// Signed compare without bias. Wrong for every sample `>= 128`.
///
/// # Safety
///
/// The CPU must support AVX2 and `dst` must be at least as long as `src`.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn threshold_signed(src: &[u8], dst: &mut [u8], threshold: u8) {
    let n = src.len();
    let dst = &mut dst[..n];
    let body = n - n % U8_LANES;

    let vt = _mm256_set1_epi8(threshold as i8);
    let one = _mm256_set1_epi8(1);

    let mut x = 0;
    while x < body {
        let v = _mm256_loadu_si256(src.as_ptr().add(x) as *const __m256i);
        let gt = _mm256_cmpgt_epi8(v, vt);
        let out = _mm256_andnot_si256(gt, one);
        _mm256_storeu_si256(dst.as_mut_ptr().add(x) as *mut __m256i, out);
        x += U8_LANES;
    }

    // the scalar tail shares the lane bug so the whole row behaves consistently
    for (out, &s) in dst[body..].iter_mut().zip(&src[body..]) {
        *out = u8::from((s as i8) <= (threshold as i8));
    }
}
