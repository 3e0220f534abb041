//! Kernel selection and execution configuration.
//!
//! Two things are chosen per call rather than globally:
//!
//! - the [`Variant`]: the scalar reference loop or its lane-vectorized twin;
//! - the [`Parallelism`]: run the per-row body sequentially, on rayon's global
//!   pool, or on a caller-supplied [`rayon::ThreadPool`].
//!
//! [`KernelConfig`] bundles these with the complex lane width and the vector
//! [`Backend`], and is also the validation boundary: its methods check operand
//! shapes and return [`KernelError`](crate::KernelError) before calling the
//! unchecked kernels.
//!
//! # Example
//!
//! ```rust
//! use lanewise::{KernelConfig, Parallelism, RealMatrix, Variant};
//!
//! let a = RealMatrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let b = RealMatrix::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
//! let mut c = RealMatrix::new(0, 0);
//!
//! KernelConfig::new()
//!     .with_variant(Variant::Vector)
//!     .with_parallelism(Parallelism::Global)
//!     .multiply(&a, &b, &mut c)
//!     .unwrap();
//!
//! assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
//! ```

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::{
    error::{buffer_too_small, dimension_mismatch, invalid_kernel, validation_error, Result},
    image::{self, Image, Kernel1D},
    matmul::{self, complex::LaneWidth},
    matrix::{ComplexMatrix, RealMatrix},
    simd::Backend,
};

/// Which implementation of a kernel to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    /// Scalar reference loop.
    #[default]
    Scalar,
    /// Lane-vectorized loop.
    Vector,
}

/// How the independent output rows of a kernel are scheduled.
#[derive(Clone, Copy, Debug, Default)]
pub enum Parallelism<'p> {
    /// One row after another on the calling thread.
    #[default]
    Sequential,
    /// Rows spread over rayon's global thread pool.
    Global,
    /// Rows spread over the given pool.
    Pool(&'p ThreadPool),
}

impl Parallelism<'_> {
    /// Runs `f(y, row)` for the first `rows` rows of a strided buffer.
    ///
    /// `data` starts at row 0, rows begin `stride` elements apart and `row` is
    /// the first `width` elements of each. The rows are disjoint `&mut`
    /// slices, so `f` can never touch an output row other than the one it is
    /// handed.
    pub(crate) fn for_each_row<T, F>(
        &self,
        data: &mut [T],
        stride: usize,
        rows: usize,
        width: usize,
        f: F,
    ) where
        T: Send,
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        if rows == 0 || width == 0 {
            return;
        }

        match self {
            Parallelism::Sequential => data
                .chunks_mut(stride)
                .take(rows)
                .enumerate()
                .for_each(|(y, row)| f(y, &mut row[..width])),
            Parallelism::Global => data
                .par_chunks_mut(stride)
                .take(rows)
                .enumerate()
                .for_each(|(y, row)| f(y, &mut row[..width])),
            Parallelism::Pool(pool) => pool.install(|| {
                data.par_chunks_mut(stride)
                    .take(rows)
                    .enumerate()
                    .for_each(|(y, row)| f(y, &mut row[..width]))
            }),
        }
    }

    pub fn is_parallel(&self) -> bool {
        !matches!(self, Parallelism::Sequential)
    }
}

/// Variant, parallelism and lane settings for a family of kernel calls.
#[derive(Clone, Copy, Debug)]
pub struct KernelConfig<'p> {
    variant: Variant,
    parallelism: Parallelism<'p>,
    complex_lane_width: usize,
    backend: Backend,
}

impl Default for KernelConfig<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> KernelConfig<'p> {
    /// Scalar, sequential, default complex lane width, detected backend.
    pub fn new() -> Self {
        Self {
            variant: Variant::Scalar,
            parallelism: Parallelism::Sequential,
            complex_lane_width: LaneWidth::DEFAULT.get(),
            backend: Backend::detect(),
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism<'p>) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Lane width, in `f64` slots, of the complex vector multiply.
    ///
    /// Not validated here; [`KernelConfig::multiply_complex`] rejects odd or
    /// zero widths.
    pub fn with_complex_lane_width(mut self, lane_width: usize) -> Self {
        self.complex_lane_width = lane_width;
        self
    }

    /// Forces a vector backend. A backend the CPU cannot run is ignored.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        if backend.is_available() {
            self.backend = backend;
        } else {
            log::warn!(
                "backend {} is not available on this CPU, keeping {}",
                backend.name(),
                self.backend.name()
            );
        }
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn parallelism(&self) -> Parallelism<'p> {
        self.parallelism
    }

    pub fn complex_lane_width(&self) -> usize {
        self.complex_lane_width
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// `C = A·B` for real matrices; `c` is reshaped to `a.rows() × b.cols()`.
    pub fn multiply(&self, a: &RealMatrix, b: &RealMatrix, c: &mut RealMatrix) -> Result<()> {
        if a.cols() != b.rows() {
            return Err(dimension_mismatch(
                "multiply",
                format!("A is {}x{} but B is {}x{}", a.rows(), a.cols(), b.rows(), b.cols()),
            ));
        }

        log::debug!(
            "multiply {}x{} by {}x{} ({:?}, {})",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols(),
            self.variant,
            self.backend.name()
        );

        matmul::real::multiply(a, b, c, self.variant, self.backend, self.parallelism);
        Ok(())
    }

    /// `C = A·B` for complex matrices; `c` is reshaped to `a.rows() × b.cols()`.
    pub fn multiply_complex(
        &self,
        a: &ComplexMatrix,
        b: &ComplexMatrix,
        c: &mut ComplexMatrix,
    ) -> Result<()> {
        let lanes = LaneWidth::new(self.complex_lane_width)?;

        if a.cols() != b.rows() {
            return Err(dimension_mismatch(
                "multiply_complex",
                format!("A is {}x{} but B is {}x{}", a.rows(), a.cols(), b.rows(), b.cols()),
            ));
        }

        matmul::complex::multiply(a, b, c, self.variant, lanes, self.parallelism);
        Ok(())
    }

    /// Horizontal 1D convolution; border columns of `dst` are left untouched.
    pub fn convolve_horizontal(
        &self,
        kernel: &Kernel1D,
        src: &Image<f32>,
        dst: &mut Image<f32>,
    ) -> Result<()> {
        check_same_shape("convolve_horizontal", src, dst)?;
        image::convolve::convolve_horizontal(
            kernel,
            src,
            dst,
            self.variant,
            self.backend,
            self.parallelism,
        );
        Ok(())
    }

    /// Vertical 1D convolution; border rows of `dst` are left untouched.
    pub fn convolve_vertical(
        &self,
        kernel: &Kernel1D,
        src: &Image<f32>,
        dst: &mut Image<f32>,
    ) -> Result<()> {
        check_same_shape("convolve_vertical", src, dst)?;
        image::convolve::convolve_vertical(
            kernel,
            src,
            dst,
            self.variant,
            self.backend,
            self.parallelism,
        );
        Ok(())
    }

    /// Horizontal box mean of `length` samples written starting at column `offset`.
    pub fn mean_horizontal(
        &self,
        src: &Image<u8>,
        dst: &mut Image<u8>,
        offset: usize,
        length: usize,
    ) -> Result<()> {
        check_same_shape("mean_horizontal", src, dst)?;
        if length == 0 || offset >= length {
            return Err(invalid_kernel(format!(
                "box mean needs 0 <= offset < length, got offset {offset} and length {length}"
            )));
        }

        image::mean::mean_horizontal(src, dst, offset, length, self.variant, self.parallelism);
        Ok(())
    }

    /// `dst = (src <= threshold) as u8`, using the correct unsigned compare.
    pub fn threshold(&self, src: &Image<u8>, dst: &mut Image<u8>, threshold: u8) -> Result<()> {
        check_same_shape("threshold", src, dst)?;

        let strategy = match self.variant {
            Variant::Scalar => image::threshold::Strategy::Scalar,
            Variant::Vector => image::threshold::Strategy::Unsigned,
        };
        image::threshold::apply(src, dst, threshold, strategy, self.backend, self.parallelism);
        Ok(())
    }

    /// Counts the samples of `src` into `counts[sample - min_value]`.
    ///
    /// `counts` is zeroed first. Every sample must be `>= min_value` and
    /// `counts` must have a bucket for the largest one.
    pub fn histogram(&self, src: &Image<u16>, min_value: u16, counts: &mut [u32]) -> Result<()> {
        let (low, high) = (0..src.height())
            .flat_map(|y| src.row(y).iter().copied())
            .fold((u16::MAX, u16::MIN), |(low, high), s| (low.min(s), high.max(s)));

        if src.width() > 0 && src.height() > 0 {
            if low < min_value {
                return Err(validation_error(format!(
                    "sample {low} is below the histogram bias {min_value}"
                )));
            }
            let required = usize::from(high - min_value) + 1;
            if counts.len() < required {
                return Err(buffer_too_small(required, counts.len(), "histogram buckets"));
            }
        }

        image::histogram::compute(src, min_value, counts, self.variant, self.parallelism);
        Ok(())
    }
}

fn check_same_shape<S, D>(operation: &'static str, src: &Image<S>, dst: &Image<D>) -> Result<()>
where
    S: image::Sample,
    D: image::Sample,
{
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(dimension_mismatch(
            operation,
            format!(
                "source is {}x{} but destination is {}x{}",
                src.width(),
                src.height(),
                dst.width(),
                dst.height()
            ),
        ));
    }
    Ok(())
}
