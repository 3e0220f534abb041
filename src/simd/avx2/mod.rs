//! AVX2 implementations of the vector kernels' row loops.
//!
//! Each function enables `avx2` for its own body with `#[target_feature]`,
//! so the crate does not need to be compiled with `-C target-feature=+avx2`.
//! In exchange every function here is `unsafe`: callers must have confirmed
//! AVX2 support at runtime, which [`crate::Backend::detect`] does.
//!
//! # Register widths
//!
//! - `__m256d`: 4 × f64 (matrix rows)
//! - `__m256`: 8 × f32 (convolution)
//! - `__m256i`: 32 × u8 (threshold)

pub mod convolve;

pub mod matmul;

pub mod threshold;

/// Number of `f64` lanes in a 256-bit register.
pub(crate) const F64_LANES: usize = 4;

/// Number of `f32` lanes in a 256-bit register.
pub(crate) const F32_LANES: usize = 8;

/// Number of `u8` lanes in a 256-bit register.
pub(crate) const U8_LANES: usize = 32;
