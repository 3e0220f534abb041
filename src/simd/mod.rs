//! Lane-group primitives and backend selection.
//!
//! Every vector kernel in this crate has two implementations of its inner
//! row loop: one written against the portable [`lanes::Lanes`] groups and,
//! on x86_64 builds where the build script found AVX2, one written with
//! `std::arch` intrinsics. [`Backend::detect`] picks between them once per
//! process; the AVX2 functions are `unsafe` and must only be reached through
//! a backend that reported itself available.

use std::sync::OnceLock;

#[cfg(all(avx2, target_arch = "x86_64"))]
pub mod avx2;

pub mod lanes;

pub mod traits;

/// Instruction set used by the vector kernels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Fixed-width array lanes lowered by the compiler.
    Portable,
    /// Explicit 256-bit AVX2 intrinsics.
    Avx2,
}

impl Backend {
    /// Returns the best backend for the running CPU, probing it only once.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Backend> = OnceLock::new();

        *DETECTED.get_or_init(|| {
            let backend = Self::probe();
            log::debug!("lanewise vector backend: {}", backend.name());
            backend
        })
    }

    fn probe() -> Self {
        #[cfg(all(avx2, target_arch = "x86_64"))]
        {
            if std::arch::is_x86_feature_detected!("avx2") {
                return Backend::Avx2;
            }
        }

        Backend::Portable
    }

    /// Whether kernels may run on this backend on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Portable => true,
            Backend::Avx2 => Self::detect() == Backend::Avx2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Portable => "portable",
            Backend::Avx2 => "avx2",
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::detect()
    }
}
