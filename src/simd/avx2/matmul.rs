//! AVX2 row update for the real IKJ multiply.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::F64_LANES;
use crate::matrix::RealMatrix;

/// Computes one row of `C = A·B` in IKJ order with 4-lane `f64` groups.
///
/// For `k = 0` the lane group of `C` is overwritten with `A[i][0] * B[0][j..]`;
/// for `k > 0` the product is added to it. The multiply and the add are
/// separate instructions so every element is rounded exactly like the scalar
/// `c += a * b`.
///
/// # Safety
///
/// The CPU must support AVX2. `c_row` must not be longer than the rows of `b`,
/// and `a_row` must not be longer than `b.rows()`.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn row_ikj(a_row: &[f64], b: &RealMatrix, c_row: &mut [f64]) {
    let n = c_row.len();
    let body = n - n % F64_LANES;

    for (k, &val_a) in a_row.iter().enumerate() {
        let b_row = &b.row(k)[..n];
        let va = _mm256_set1_pd(val_a);

        let mut j = 0;
        while j < body {
            let prod = _mm256_mul_pd(_mm256_loadu_pd(b_row.as_ptr().add(j)), va);
            let out = match k {
                0 => prod,
                _ => _mm256_add_pd(_mm256_loadu_pd(c_row.as_ptr().add(j)), prod),
            };
            _mm256_storeu_pd(c_row.as_mut_ptr().add(j), out);
            j += F64_LANES;
        }

        // tail columns
        for (c, &b_val) in c_row[body..].iter_mut().zip(&b_row[body..]) {
            match k {
                0 => *c = val_a * b_val,
                _ => *c += val_a * b_val,
            }
        }
    }
}
