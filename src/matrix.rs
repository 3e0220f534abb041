//! Dense row-major matrices of `f64` and interleaved complex `f64`.
//!
//! Both types carry an explicit row stride so that a matrix can describe a
//! padded buffer. Cell `(r, c)` of a [`RealMatrix`] lives at
//! `data[r * stride + c]`; cell `(r, c)` of a [`ComplexMatrix`] occupies the two
//! slots `data[r * stride + 2c]` (real) and `data[r * stride + 2c + 1]` (imaginary).

use ndarray::Array2;
use num::Complex;

use crate::error::{buffer_too_small, invalid_shape, Result};

/// Number of elements a strided buffer must hold for `rows` rows of `width` elements.
fn required_len(rows: usize, width: usize, stride: usize) -> usize {
    match rows {
        0 => 0,
        _ => (rows - 1) * stride + width,
    }
}

/// Row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct RealMatrix {
    rows: usize,
    cols: usize,
    stride: usize,
    data: Vec<f64>,
}

impl RealMatrix {
    /// Creates a zero-filled `rows × cols` matrix with a tight stride.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            stride: cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wraps a tight row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        Self::with_stride(rows, cols, cols, data)
    }

    /// Wraps a row-major buffer whose rows start `stride` elements apart.
    pub fn with_stride(rows: usize, cols: usize, stride: usize, data: Vec<f64>) -> Result<Self> {
        if stride < cols {
            return Err(invalid_shape(cols, stride, "row stride must be >= cols"));
        }

        let required = required_len(rows, cols, stride);
        if data.len() < required {
            return Err(buffer_too_small(required, data.len(), "real matrix data"));
        }

        Ok(Self {
            rows,
            cols,
            stride,
            data,
        })
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline(always)]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline(always)]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.stride + col
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let index = self.index(row, col);
        self.data[index] = value;
    }

    /// The `cols` logical elements of row `row`.
    #[inline(always)]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.stride;
        &self.data[start..start + self.cols]
    }

    /// Changes the shape to `rows × cols` with a tight stride.
    ///
    /// This is destructive: the previous contents are discarded and the new
    /// cells are zero.
    pub fn reshape(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.stride = cols;
        self.data.clear();
        self.data.resize(rows * cols, 0.0);
    }

    /// Copies the logical cells into an `ndarray` matrix.
    pub fn to_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows, self.cols), |(r, c)| self.get(r, c))
    }
}

impl From<Array2<f64>> for RealMatrix {
    fn from(array: Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        Self {
            rows,
            cols,
            stride: cols,
            data: array.iter().copied().collect(),
        }
    }
}

/// Row-major matrix of complex `f64` stored as interleaved `(real, imag)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    cols: usize,
    /// Distance between rows in `f64` slots (always even).
    stride: usize,
    data: Vec<f64>,
}

impl ComplexMatrix {
    /// Creates a zero-filled `rows × cols` complex matrix with a tight stride.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            stride: 2 * cols,
            data: vec![0.0; rows * cols * 2],
        }
    }

    /// Wraps a tight interleaved buffer of `rows * cols * 2` slots.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        Self::with_stride(rows, cols, 2 * cols, data)
    }

    /// Wraps an interleaved buffer whose rows start `stride` slots apart.
    pub fn with_stride(rows: usize, cols: usize, stride: usize, data: Vec<f64>) -> Result<Self> {
        let width = 2 * cols;
        if stride % 2 != 0 {
            return Err(invalid_shape(
                width,
                stride,
                "complex stride must be even so cells stay paired",
            ));
        }
        if stride < width {
            return Err(invalid_shape(width, stride, "row stride must be >= 2 * cols"));
        }

        let required = required_len(rows, width, stride);
        if data.len() < required {
            return Err(buffer_too_small(required, data.len(), "complex matrix data"));
        }

        Ok(Self {
            rows,
            cols,
            stride,
            data,
        })
    }

    /// Builds a tight matrix from row-major complex cells.
    pub fn from_cells(rows: usize, cols: usize, cells: &[Complex<f64>]) -> Result<Self> {
        if cells.len() < rows * cols {
            return Err(buffer_too_small(rows * cols, cells.len(), "complex cells"));
        }

        let data = cells[..rows * cols]
            .iter()
            .flat_map(|cell| [cell.re, cell.im])
            .collect();

        Self::from_vec(rows, cols, data)
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline(always)]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Slot index of the real part of cell `(row, col)`.
    #[inline(always)]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.stride + 2 * col
    }

    pub fn get(&self, row: usize, col: usize) -> Complex<f64> {
        let index = self.index(row, col);
        Complex::new(self.data[index], self.data[index + 1])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Complex<f64>) {
        let index = self.index(row, col);
        self.data[index] = value.re;
        self.data[index + 1] = value.im;
    }

    /// The `2 * cols` interleaved slots of row `row`.
    #[inline(always)]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.stride;
        &self.data[start..start + 2 * self.cols]
    }

    /// Changes the shape to `rows × cols` with a tight stride, discarding the contents.
    pub fn reshape(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.stride = 2 * cols;
        self.data.clear();
        self.data.resize(rows * cols * 2, 0.0);
    }
}
