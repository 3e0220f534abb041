//! Equivalence harness: seeded operand generators and comparisons that
//! report the first differing cell.
//!
//! Every scalar/vector kernel pair is checked by running both on the same
//! generated input and comparing the outputs here. Generators take any
//! [`rand::Rng`]; tests use [`seeded`] so failures reproduce.
//!
//! ```rust
//! use lanewise::harness::{compare_matrices, random_matrix, seeded};
//! use lanewise::matmul::real::{mult_ikj, mult_ikj_vector};
//! use lanewise::RealMatrix;
//!
//! let mut rng = seeded(345);
//! let a = random_matrix(16, 16, -1.0, 1.0, &mut rng);
//! let b = random_matrix(16, 16, -1.0, 1.0, &mut rng);
//!
//! let mut scalar = RealMatrix::new(0, 0);
//! let mut vector = RealMatrix::new(0, 0);
//! mult_ikj(&a, &b, &mut scalar);
//! mult_ikj_vector(&a, &b, &mut vector);
//!
//! assert!(compare_matrices(&scalar, &vector, 1e-8).is_ok());
//! ```

use rand::{distr::uniform::SampleUniform, rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use crate::{
    error::{validation_error, Result},
    image::{Image, Kernel1D, Sample},
    matrix::{ComplexMatrix, RealMatrix},
};

/// Seed used by the benchmarks and the demo.
pub const DEFAULT_SEED: u64 = 345;

/// First difference found between an expected and a computed output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mismatch {
    /// The two outputs do not even have the same shape.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    Shape {
        /// `(rows, cols)` or `(height, width)` of the expected output.
        expected: (usize, usize),
        /// Same for the computed output.
        found: (usize, usize),
    },
    /// A cell differs by more than the tolerance.
    #[error("mismatch at row {row}, col {col} (index {index}): expected {expected}, found {found}")]
    Value {
        row: usize,
        col: usize,
        /// Position of the offending element in the computed buffer.
        index: usize,
        expected: f64,
        found: f64,
    },
}

/// A `StdRng` seeded from `seed`.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A `rows × cols` matrix with entries drawn uniformly from `[min, max]`.
pub fn random_matrix<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    min: f64,
    max: f64,
    rng: &mut R,
) -> RealMatrix {
    let mut matrix = RealMatrix::new(rows, cols);
    matrix
        .data_mut()
        .iter_mut()
        .for_each(|slot| *slot = rng.random_range(min..=max));
    matrix
}

/// A complex matrix whose real and imaginary parts are drawn from `[min, max]`.
pub fn random_complex_matrix<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    min: f64,
    max: f64,
    rng: &mut R,
) -> ComplexMatrix {
    let mut matrix = ComplexMatrix::new(rows, cols);
    matrix
        .data_mut()
        .iter_mut()
        .for_each(|slot| *slot = rng.random_range(min..=max));
    matrix
}

/// Overwrites every pixel of `image` with a value drawn from `[min, max]`.
///
/// Padding between rows and before `start_offset` keeps its contents.
pub fn fill_uniform<T, R>(image: &mut Image<T>, min: T, max: T, rng: &mut R)
where
    T: Sample + SampleUniform + PartialOrd,
    R: Rng + ?Sized,
{
    for y in 0..image.height() {
        for pixel in image.row_mut(y) {
            *pixel = rng.random_range(min..=max);
        }
    }
}

/// A kernel of `width` taps drawn from `[min, max]`, anchored at `offset`.
///
/// When `normalize` is set the taps are scaled to sum to one.
pub fn random_kernel<R: Rng + ?Sized>(
    width: usize,
    offset: usize,
    min: f32,
    max: f32,
    normalize: bool,
    rng: &mut R,
) -> Result<Kernel1D> {
    let taps = (0..width).map(|_| rng.random_range(min..=max)).collect();
    let kernel = Kernel1D::new(taps, offset)?;
    Ok(match normalize {
        true => kernel.normalized(),
        false => kernel,
    })
}

/// The normalized Gaussian of the given radius used by the benchmarks.
pub fn gaussian_kernel(radius: usize) -> Kernel1D {
    Kernel1D::gaussian(radius, -1.0)
}

/// `A·B` computed by `ndarray`, independent of this crate's kernels.
pub fn reference_product(a: &RealMatrix, b: &RealMatrix) -> RealMatrix {
    RealMatrix::from(a.to_array2().dot(&b.to_array2()))
}

/// A tight copy of `image` whose row `y` is row `order[y]` of the input.
pub fn permute_rows<T: Sample>(image: &Image<T>, order: &[usize]) -> Result<Image<T>> {
    if order.len() != image.height() || order.iter().any(|&y| y >= image.height()) {
        return Err(validation_error(format!(
            "row order must pick {} rows below {}",
            image.height(),
            image.height()
        )));
    }

    let data = order
        .iter()
        .flat_map(|&y| image.row(y).iter().copied())
        .collect();
    Image::from_parts(data, image.width(), image.height(), image.width(), 0)
}

#[inline(always)]
fn within(expected: f64, found: f64, tolerance: f64) -> bool {
    let scale = expected.abs().max(found.abs()).max(1.0);
    (expected - found).abs() <= tolerance * scale
}

/// Compares two real matrices cell by cell with a relative tolerance.
///
/// A cell passes when `|e - f| <= tolerance * max(1, |e|, |f|)`. NaN never
/// passes.
pub fn compare_matrices(
    expected: &RealMatrix,
    found: &RealMatrix,
    tolerance: f64,
) -> std::result::Result<(), Mismatch> {
    check_shape((expected.rows(), expected.cols()), (found.rows(), found.cols()))?;

    for row in 0..expected.rows() {
        for col in 0..expected.cols() {
            let (e, f) = (expected.get(row, col), found.get(row, col));
            if !within(e, f, tolerance) {
                return Err(Mismatch::Value {
                    row,
                    col,
                    index: found.index(row, col),
                    expected: e,
                    found: f,
                });
            }
        }
    }
    Ok(())
}

/// Compares two complex matrices part by part with a relative tolerance.
///
/// The reported `index` is the slot of the offending real or imaginary part.
pub fn compare_complex_matrices(
    expected: &ComplexMatrix,
    found: &ComplexMatrix,
    tolerance: f64,
) -> std::result::Result<(), Mismatch> {
    check_shape((expected.rows(), expected.cols()), (found.rows(), found.cols()))?;

    for row in 0..expected.rows() {
        let pairs = expected.row(row).iter().zip(found.row(row));
        for (slot, (&e, &f)) in pairs.enumerate() {
            if !within(e, f, tolerance) {
                return Err(Mismatch::Value {
                    row,
                    col: slot / 2,
                    index: found.index(row, 0) + slot,
                    expected: e,
                    found: f,
                });
            }
        }
    }
    Ok(())
}

/// Compares two `f32` images with a relative tolerance.
pub fn compare_images_f32(
    expected: &Image<f32>,
    found: &Image<f32>,
    tolerance: f32,
) -> std::result::Result<(), Mismatch> {
    compare_images_by(expected, found, |e, f| {
        within(f64::from(e), f64::from(f), f64::from(tolerance))
    })
}

/// Compares two images for exact equality.
pub fn compare_images_exact<T>(
    expected: &Image<T>,
    found: &Image<T>,
) -> std::result::Result<(), Mismatch>
where
    T: Sample + Into<f64>,
{
    compare_images_by(expected, found, |e, f| e == f)
}

fn compare_images_by<T, F>(
    expected: &Image<T>,
    found: &Image<T>,
    accept: F,
) -> std::result::Result<(), Mismatch>
where
    T: Sample + Into<f64>,
    F: Fn(T, T) -> bool,
{
    check_shape((expected.height(), expected.width()), (found.height(), found.width()))?;

    for y in 0..expected.height() {
        let pairs = expected.row(y).iter().zip(found.row(y));
        for (x, (&e, &f)) in pairs.enumerate() {
            if !accept(e, f) {
                return Err(Mismatch::Value {
                    row: y,
                    col: x,
                    index: found.index(x, y),
                    expected: e.into(),
                    found: f.into(),
                });
            }
        }
    }
    Ok(())
}

fn check_shape(
    expected: (usize, usize),
    found: (usize, usize),
) -> std::result::Result<(), Mismatch> {
    match expected == found {
        true => Ok(()),
        false => Err(Mismatch::Shape { expected, found }),
    }
}
