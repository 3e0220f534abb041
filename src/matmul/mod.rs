//! Dense matrix multiplication in IKJ loop order.
//!
//! For each row `i` of `C`, row `i` is first set to `A[i][0] * B[0][..]` and
//! then every following `A[i][k] * B[k][..]` is added to it. The innermost loop
//! walks one row of `B` and one row of `C` contiguously, which is what makes
//! the `j` loop vectorizable.
//!
//! Each kernel exists as a scalar loop and a lane-vectorized twin. Multiply
//! and add stay separate instructions in the vector form, so both produce the
//! same rounding for every element.
//!
//! All operations reshape `c` to `a.rows() × b.cols()` and discard its
//! previous contents. The free functions assume `a.cols() == b.rows()`;
//! [`crate::KernelConfig`] checks it and can also run the rows in parallel.

pub mod complex;

pub mod real;
