//! Operator-style entry points for the kernels.
//!
//! Each trait exposes the same computation three ways: `scalar_*` (the
//! reference loop), `simd_*` (lane-vectorized on the detected backend) and
//! `par_simd_*` (lane-vectorized with rows spread over rayon's global pool).

use crate::{
    config::{Parallelism, Variant},
    matmul::{self, complex::LaneWidth},
    matrix::{ComplexMatrix, RealMatrix},
    simd::Backend,
};

/// Matrix product returning a freshly allocated result.
///
/// Operands must be conformable (`self.cols() == rhs.rows()`); use
/// [`crate::KernelConfig::multiply`] for a checked call.
pub trait SimdMultiply<Rhs = Self> {
    type Output;

    fn scalar_mult(self, rhs: Rhs) -> Self::Output;
    fn simd_mult(self, rhs: Rhs) -> Self::Output;
    fn par_simd_mult(self, rhs: Rhs) -> Self::Output;
}

impl SimdMultiply<&RealMatrix> for &RealMatrix {
    type Output = RealMatrix;

    fn scalar_mult(self, rhs: &RealMatrix) -> Self::Output {
        let mut c = RealMatrix::new(0, 0);
        matmul::real::mult_ikj(self, rhs, &mut c);
        c
    }

    fn simd_mult(self, rhs: &RealMatrix) -> Self::Output {
        let mut c = RealMatrix::new(0, 0);
        matmul::real::mult_ikj_vector(self, rhs, &mut c);
        c
    }

    fn par_simd_mult(self, rhs: &RealMatrix) -> Self::Output {
        let mut c = RealMatrix::new(0, 0);
        matmul::real::multiply(
            self,
            rhs,
            &mut c,
            Variant::Vector,
            Backend::detect(),
            Parallelism::Global,
        );
        c
    }
}

impl SimdMultiply<&ComplexMatrix> for &ComplexMatrix {
    type Output = ComplexMatrix;

    fn scalar_mult(self, rhs: &ComplexMatrix) -> Self::Output {
        let mut c = ComplexMatrix::new(0, 0);
        matmul::complex::mult_ikj(self, rhs, &mut c);
        c
    }

    fn simd_mult(self, rhs: &ComplexMatrix) -> Self::Output {
        let mut c = ComplexMatrix::new(0, 0);
        matmul::complex::multiply(
            self,
            rhs,
            &mut c,
            Variant::Vector,
            LaneWidth::DEFAULT,
            Parallelism::Sequential,
        );
        c
    }

    fn par_simd_mult(self, rhs: &ComplexMatrix) -> Self::Output {
        let mut c = ComplexMatrix::new(0, 0);
        matmul::complex::multiply(
            self,
            rhs,
            &mut c,
            Variant::Vector,
            LaneWidth::DEFAULT,
            Parallelism::Global,
        );
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_forms_agree() {
        let a = RealMatrix::from_vec(3, 9, (0..27).map(|v| v as f64 * 0.5).collect()).unwrap();
        let b = RealMatrix::from_vec(9, 6, (0..54).map(|v| 1.0 - v as f64).collect()).unwrap();

        let expected = a.scalar_mult(&b);
        assert_eq!(expected, a.simd_mult(&b));
        assert_eq!(expected, a.par_simd_mult(&b));
    }

    #[test]
    fn complex_forms_agree() {
        let a = ComplexMatrix::from_vec(2, 5, (0..20).map(|v| v as f64 - 7.5).collect()).unwrap();
        let b = ComplexMatrix::from_vec(5, 3, (0..30).map(|v| v as f64 * 0.125).collect()).unwrap();

        let expected = a.scalar_mult(&b);
        assert_eq!(expected, a.simd_mult(&b));
        assert_eq!(expected, a.par_simd_mult(&b));
    }
}
