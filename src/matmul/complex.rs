//! Complex `f64` matrix products over interleaved `(real, imag)` storage.
//!
//! With `A[i][k] = ar + ai·i` and `B[k][j] = br + bi·i`, each step adds
//! `(ar·br - ai·bi) + (ar·bi + ai·br)·i` to `C[i][j]`.
//!
//! The vector form processes `B[k]` in groups of `lane_width` slots (half as
//! many cells). Each group is multiplied by the broadcast real part into one
//! scratch buffer and by the broadcast imaginary part into another; pair `p`
//! of the group is then recombined as
//!
//! ```text
//! re = rr[2p]     - ii[2p + 1]
//! im = rr[2p + 1] + ii[2p]
//! ```
//!
//! which is the scalar formula with the same operand order.

use crate::{
    config::{Parallelism, Variant},
    error::{invalid_lane_width, Result},
    matrix::ComplexMatrix,
};

/// Lane width of the complex vector kernel, in `f64` slots.
///
/// Always even and non-zero, so a lane group holds whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneWidth(usize);

impl LaneWidth {
    /// Four cells per group.
    pub const DEFAULT: LaneWidth = LaneWidth(8);

    pub fn new(lane_width: usize) -> Result<Self> {
        if lane_width == 0 || lane_width % 2 != 0 {
            log::warn!("rejecting complex lane width {lane_width}");
            return Err(invalid_lane_width(lane_width));
        }
        Ok(Self(lane_width))
    }

    #[inline(always)]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for LaneWidth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Scalar complex IKJ product.
pub fn mult_ikj(a: &ComplexMatrix, b: &ComplexMatrix, c: &mut ComplexMatrix) {
    multiply(a, b, c, Variant::Scalar, LaneWidth::DEFAULT, Parallelism::Sequential);
}

/// Lane-vectorized complex IKJ product.
///
/// # Errors
///
/// Returns [`KernelError::InvalidLaneWidth`](crate::KernelError::InvalidLaneWidth)
/// when `lane_width` is odd or zero. `c` is left untouched in that case.
pub fn mult_ikj_vector(
    a: &ComplexMatrix,
    b: &ComplexMatrix,
    c: &mut ComplexMatrix,
    lane_width: usize,
) -> Result<()> {
    let lanes = LaneWidth::new(lane_width)?;
    multiply(a, b, c, Variant::Vector, lanes, Parallelism::Sequential);
    Ok(())
}

pub(crate) fn multiply(
    a: &ComplexMatrix,
    b: &ComplexMatrix,
    c: &mut ComplexMatrix,
    variant: Variant,
    lanes: LaneWidth,
    parallelism: Parallelism<'_>,
) {
    let (m, n) = (a.rows(), b.cols());
    c.reshape(m, n);

    parallelism.for_each_row(c.data_mut(), 2 * n, m, 2 * n, |i, c_row| {
        let a_row = a.row(i);
        match variant {
            Variant::Scalar => row_ikj(a_row, b, c_row),
            Variant::Vector => row_ikj_lanes(a_row, b, c_row, lanes.get()),
        }
    });
}

fn row_ikj(a_row: &[f64], b: &ComplexMatrix, c_row: &mut [f64]) {
    for (k, a_cell) in a_row.chunks_exact(2).enumerate() {
        accumulate_cells(a_cell[0], a_cell[1], b.row(k), c_row, k == 0);
    }
}

/// `c += (ar + ai·i) * b` cell by cell, or `c = ...` when `first`.
#[inline(always)]
fn accumulate_cells(ar: f64, ai: f64, b: &[f64], c: &mut [f64], first: bool) {
    for (c_cell, b_cell) in c.chunks_exact_mut(2).zip(b.chunks_exact(2)) {
        let re = ar * b_cell[0] - ai * b_cell[1];
        let im = ar * b_cell[1] + ai * b_cell[0];
        if first {
            c_cell[0] = re;
            c_cell[1] = im;
        } else {
            c_cell[0] += re;
            c_cell[1] += im;
        }
    }
}

fn row_ikj_lanes(a_row: &[f64], b: &ComplexMatrix, c_row: &mut [f64], lane_width: usize) {
    let mut rr = vec![0.0; lane_width];
    let mut ii = vec![0.0; lane_width];

    for (k, a_cell) in a_row.chunks_exact(2).enumerate() {
        let (ar, ai) = (a_cell[0], a_cell[1]);
        let first = k == 0;

        let mut c_groups = c_row.chunks_exact_mut(lane_width);
        let mut b_groups = b.row(k).chunks_exact(lane_width);
        for (c_group, b_group) in (&mut c_groups).zip(&mut b_groups) {
            for ((r, i), &val_b) in rr.iter_mut().zip(ii.iter_mut()).zip(b_group) {
                *r = val_b * ar;
                *i = val_b * ai;
            }

            for (p, c_cell) in c_group.chunks_exact_mut(2).enumerate() {
                let re = rr[2 * p] - ii[2 * p + 1];
                let im = rr[2 * p + 1] + ii[2 * p];
                if first {
                    c_cell[0] = re;
                    c_cell[1] = im;
                } else {
                    c_cell[0] += re;
                    c_cell[1] += im;
                }
            }
        }

        // cells past the last full group
        accumulate_cells(
            ar,
            ai,
            b_groups.remainder(),
            c_groups.into_remainder(),
            first,
        );
    }
}

#[cfg(test)]
mod tests {
    use num::Complex;

    use super::*;
    use crate::error::KernelError;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn hand_computed_two_by_two() {
        // A = [[1, i], [0, 1]], B = [[1, 0], [i, 1]]
        let a_cells = [c(1.0, 0.0), c(0.0, 1.0), c(0.0, 0.0), c(1.0, 0.0)];
        let b_cells = [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 1.0), c(1.0, 0.0)];
        let a = ComplexMatrix::from_cells(2, 2, &a_cells).unwrap();
        let b = ComplexMatrix::from_cells(2, 2, &b_cells).unwrap();
        let expected = [c(0.0, 0.0), c(0.0, 1.0), c(0.0, 1.0), c(1.0, 0.0)];

        let mut scalar = ComplexMatrix::new(0, 0);
        mult_ikj(&a, &b, &mut scalar);
        let mut vector = ComplexMatrix::new(0, 0);
        mult_ikj_vector(&a, &b, &mut vector, 2).unwrap();

        for (index, cell) in expected.iter().enumerate() {
            assert_eq!(scalar.get(index / 2, index % 2), *cell);
            assert_eq!(vector.get(index / 2, index % 2), *cell);
        }
    }

    #[test]
    fn lane_widths_agree_with_scalar() {
        let cells: Vec<Complex<f64>> = (0..5 * 7)
            .map(|v| c(v as f64 * 0.5 - 3.0, 1.0 - v as f64 * 0.25))
            .collect();
        let a = ComplexMatrix::from_cells(5, 7, &cells).unwrap();
        let b = ComplexMatrix::from_cells(7, 5, &cells).unwrap();

        let mut expected = ComplexMatrix::new(0, 0);
        mult_ikj(&a, &b, &mut expected);

        for lane_width in [2, 4, 6, 8, 10, 16] {
            let mut found = ComplexMatrix::new(0, 0);
            mult_ikj_vector(&a, &b, &mut found, lane_width).unwrap();
            assert_eq!(expected, found, "lane width {lane_width}");
        }
    }

    #[test]
    fn invalid_lane_width_leaves_output_alone() {
        let a = ComplexMatrix::new(2, 2);
        let b = ComplexMatrix::new(2, 2);
        let mut out = ComplexMatrix::from_vec(1, 1, vec![3.0, 4.0]).unwrap();

        for lane_width in [0, 1, 3, 7] {
            let err = mult_ikj_vector(&a, &b, &mut out, lane_width).unwrap_err();
            assert_eq!(err, KernelError::InvalidLaneWidth { lane_width });
        }
        assert_eq!(out.data(), &[3.0, 4.0]);
    }

    #[test]
    fn default_lane_width_is_valid() {
        assert_eq!(LaneWidth::default().get(), 8);
        assert_eq!(LaneWidth::new(8).unwrap(), LaneWidth::DEFAULT);
    }
}
