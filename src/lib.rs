//! Paired scalar and lane-vectorized numeric kernels.
//!
//! Every kernel in this crate comes twice: a plain scalar loop that serves as
//! the reference, and a vectorized twin that processes a fixed number of
//! lanes per step and finishes the leftover elements with scalar code. The
//! [`harness`] module generates seeded inputs and compares each pair.
//!
//! - [`matmul`]: dense real and complex matrix products in IKJ order.
//! - [`image`]: horizontal and vertical 1D convolution, horizontal box mean,
//!   threshold and histogram over row-major strided images.
//!
//! The vector kernels run on AVX2 intrinsics when the build script found the
//! feature and the CPU confirms it at runtime, and on portable fixed-width
//! lane groups otherwise (see [`simd::Backend`]).
//!
//! # Usage
//!
//! Free functions run one variant sequentially and assume valid operands:
//!
//! ```rust
//! use lanewise::image::threshold::{threshold, threshold_vector};
//! use lanewise::Image;
//!
//! let src = Image::from_parts((0..=255).collect(), 256, 1, 256, 0).unwrap();
//! let mut scalar = src.create_same_shape();
//! let mut vector = src.create_same_shape();
//!
//! threshold(&src, &mut scalar, 125);
//! threshold_vector(&src, &mut vector, 125);
//! assert_eq!(scalar, vector);
//! ```
//!
//! [`KernelConfig`] validates operands, picks the variant and can spread
//! output rows over a rayon pool:
//!
//! ```rust
//! use lanewise::{KernelConfig, Parallelism, RealMatrix, Variant};
//!
//! let a = RealMatrix::from_vec(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
//! let b = RealMatrix::from_vec(3, 1, vec![4.0, 5.0, 6.0]).unwrap();
//! let mut c = RealMatrix::new(0, 0);
//!
//! KernelConfig::new()
//!     .with_variant(Variant::Vector)
//!     .with_parallelism(Parallelism::Global)
//!     .multiply(&a, &b, &mut c)
//!     .unwrap();
//! assert_eq!(c.data(), &[32.0]);
//! ```

pub mod config;

pub mod error;

pub mod harness;

pub mod image;

pub mod matmul;

pub mod matrix;

pub mod simd;

pub use config::{KernelConfig, Parallelism, Variant};
pub use error::{KernelError, Result};
pub use image::{Image, Kernel1D, Sample};
pub use matrix::{ComplexMatrix, RealMatrix};
pub use simd::{traits::SimdMultiply, Backend};
