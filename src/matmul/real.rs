//! Real `f64` matrix products.

use crate::{
    config::{Parallelism, Variant},
    matrix::RealMatrix,
    simd::{lanes::F64x4, Backend},
};

/// Scalar IKJ product, iterating rows as slices.
pub fn mult_ikj(a: &RealMatrix, b: &RealMatrix, c: &mut RealMatrix) {
    multiply(a, b, c, Variant::Scalar, Backend::Portable, Parallelism::Sequential);
}

/// Scalar IKJ product written with explicit `(row, col)` indexing.
///
/// Same loop order and rounding as [`mult_ikj`]. Kept as the plain reference
/// the other kernels are checked against.
pub fn mult_ikj_simple(a: &RealMatrix, b: &RealMatrix, c: &mut RealMatrix) {
    let (m, inner, n) = (a.rows(), a.cols(), b.cols());
    c.reshape(m, n);
    if inner == 0 {
        return;
    }

    for i in 0..m {
        let val_a = a.get(i, 0);
        for j in 0..n {
            c.set(i, j, val_a * b.get(0, j));
        }

        for k in 1..inner {
            let val_a = a.get(i, k);
            for j in 0..n {
                let index = c.index(i, j);
                c.data_mut()[index] += val_a * b.get(k, j);
            }
        }
    }
}

/// Lane-vectorized IKJ product on the detected backend.
pub fn mult_ikj_vector(a: &RealMatrix, b: &RealMatrix, c: &mut RealMatrix) {
    multiply(a, b, c, Variant::Vector, Backend::detect(), Parallelism::Sequential);
}

/// Naive inner-product (IJK) product.
///
/// Each cell is a single dot product accumulated from zero, so results may
/// differ from the IKJ kernels in the last bits.
pub fn mult_inner(a: &RealMatrix, b: &RealMatrix, c: &mut RealMatrix) {
    let (m, n) = (a.rows(), b.cols());
    c.reshape(m, n);

    for i in 0..m {
        let a_row = a.row(i);
        for j in 0..n {
            let mut total = 0.0;
            for (k, &val_a) in a_row.iter().enumerate() {
                total += val_a * b.get(k, j);
            }
            c.set(i, j, total);
        }
    }
}

pub(crate) fn multiply(
    a: &RealMatrix,
    b: &RealMatrix,
    c: &mut RealMatrix,
    variant: Variant,
    backend: Backend,
    parallelism: Parallelism<'_>,
) {
    let (m, n) = (a.rows(), b.cols());
    c.reshape(m, n);

    parallelism.for_each_row(c.data_mut(), n, m, n, |i, c_row| {
        let a_row = a.row(i);
        match variant {
            Variant::Scalar => row_ikj(a_row, b, c_row),
            Variant::Vector => row_ikj_vector(a_row, b, c_row, backend),
        }
    });
}

fn row_ikj(a_row: &[f64], b: &RealMatrix, c_row: &mut [f64]) {
    for (k, &val_a) in a_row.iter().enumerate() {
        let b_row = b.row(k);
        match k {
            0 => {
                for (c, &val_b) in c_row.iter_mut().zip(b_row) {
                    *c = val_a * val_b;
                }
            }
            _ => {
                for (c, &val_b) in c_row.iter_mut().zip(b_row) {
                    *c += val_a * val_b;
                }
            }
        }
    }
}

fn row_ikj_vector(a_row: &[f64], b: &RealMatrix, c_row: &mut [f64], backend: Backend) {
    match backend {
        #[cfg(all(avx2, target_arch = "x86_64"))]
        Backend::Avx2 => unsafe { crate::simd::avx2::matmul::row_ikj(a_row, b, c_row) },
        _ => row_ikj_lanes(a_row, b, c_row),
    }
}

fn row_ikj_lanes(a_row: &[f64], b: &RealMatrix, c_row: &mut [f64]) {
    for (k, &val_a) in a_row.iter().enumerate() {
        let va = F64x4::splat(val_a);

        let mut c_chunks = c_row.chunks_exact_mut(F64x4::LANES);
        let mut b_chunks = b.row(k).chunks_exact(F64x4::LANES);
        for (c, b_lanes) in (&mut c_chunks).zip(&mut b_chunks) {
            let prod = F64x4::load(b_lanes) * va;
            let out = match k {
                0 => prod,
                _ => F64x4::load(c) + prod,
            };
            out.store(c);
        }

        // tail columns
        let tail = c_chunks.into_remainder().iter_mut().zip(b_chunks.remainder());
        for (c, &val_b) in tail {
            match k {
                0 => *c = val_a * val_b,
                _ => *c += val_a * val_b,
            }
        }
    }
}
