//! Portable fixed-width lane groups.
//!
//! [`Lanes`] wraps a `[T; N]` array and exposes the handful of element-wise
//! operations the vector kernels need. The loops are branch-free over a
//! constant width, which the compiler lowers to the target's vector
//! instructions. This is the backend used when no explicit intrinsics
//! are available for the running CPU.

use std::ops::{Add, BitXor, Mul, Sub};

use num::Zero;

/// A group of `N` values processed together.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lanes<T, const N: usize>(pub [T; N]);

/// Four `f64` lanes, the width of one 256-bit register.
pub type F64x4 = Lanes<f64, 4>;

/// Eight `f32` lanes, the width of one 256-bit register.
pub type F32x8 = Lanes<f32, 8>;

/// Eight widened integer lanes used by the box-mean kernel.
pub type I32x8 = Lanes<i32, 8>;

/// Thirty-two byte lanes used by the threshold kernel.
pub type U8x32 = Lanes<u8, 32>;

impl<T: Copy + Zero, const N: usize> Lanes<T, N> {
    /// Number of lanes in the group.
    pub const LANES: usize = N;

    #[inline(always)]
    pub fn zeros() -> Self {
        Self([T::zero(); N])
    }

    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Self([value; N])
    }

    /// Loads the first `N` elements of `slice`.
    ///
    /// # Panics
    ///
    /// Panics if `slice` holds fewer than `N` elements.
    #[inline(always)]
    pub fn load(slice: &[T]) -> Self {
        let mut lanes = [T::zero(); N];
        lanes.copy_from_slice(&slice[..N]);
        Self(lanes)
    }

    /// Loads up to `N` elements, zero-filling the lanes past the end of `slice`.
    #[inline(always)]
    pub fn load_partial(slice: &[T]) -> Self {
        let size = slice.len().min(N);
        let mut lanes = [T::zero(); N];
        lanes[..size].copy_from_slice(&slice[..size]);
        Self(lanes)
    }

    /// Stores all `N` lanes at the front of `slice`.
    ///
    /// # Panics
    ///
    /// Panics if `slice` holds fewer than `N` elements.
    #[inline(always)]
    pub fn store(self, slice: &mut [T]) {
        slice[..N].copy_from_slice(&self.0);
    }

    /// Stores as many lanes as `slice` can hold.
    #[inline(always)]
    pub fn store_partial(self, slice: &mut [T]) {
        let size = slice.len().min(N);
        slice[..size].copy_from_slice(&self.0[..size]);
    }

    /// Horizontal sum using a pairwise reduction tree.
    ///
    /// The association order matches a register-halving reduction, not a
    /// left-to-right scalar sum.
    #[inline(always)]
    pub fn reduce_sum(self) -> T {
        let mut lanes = self.0;
        let mut width = N;
        while width > 1 {
            let half = width / 2;
            for i in 0..half {
                lanes[i] = lanes[i] + lanes[i + half];
            }
            if width % 2 == 1 {
                lanes[0] = lanes[0] + lanes[width - 1];
            }
            width = half;
        }
        lanes[0]
    }
}

impl<T: Copy + Add<Output = T>, const N: usize> Add for Lanes<T, N> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl<T: Copy + Sub<Output = T>, const N: usize> Sub for Lanes<T, N> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl<T: Copy + Mul<Output = T>, const N: usize> Mul for Lanes<T, N> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] * rhs.0[i]))
    }
}

impl<T: Copy + BitXor<Output = T>, const N: usize> BitXor for Lanes<T, N> {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] ^ rhs.0[i]))
    }
}

impl<const N: usize> Lanes<i32, N> {
    /// Zero-extends the first `N` bytes of `slice` into integer lanes.
    #[inline(always)]
    pub fn widen_u8(slice: &[u8]) -> Self {
        let bytes = &slice[..N];
        Self(std::array::from_fn(|i| i32::from(bytes[i])))
    }
}

impl<const N: usize> Lanes<u8, N> {
    /// Unsigned compare: lane is `1` where `self <= threshold`, else `0`.
    #[inline(always)]
    pub fn le_unsigned(self, threshold: u8) -> Self {
        Self(std::array::from_fn(|i| u8::from(self.0[i] <= threshold)))
    }

    /// Signed compare on the raw bits: each byte is read as `i8`.
    ///
    /// Bytes `>= 128` read as negative values, so this is only an unsigned
    /// compare after both operands have been biased by `0x80`.
    #[inline(always)]
    pub fn le_signed(self, threshold: u8) -> Self {
        let threshold = threshold as i8;
        Self(std::array::from_fn(|i| u8::from((self.0[i] as i8) <= threshold)))
    }
}
