//! Row-major strided images and the filtering kernels that operate on them.
//!
//! Pixel `(x, y)` of an [`Image`] lives at
//! `data[start_offset + y * stride + x]`. The stride may exceed the width and
//! the first pixel may sit anywhere in the buffer, which is how an image
//! describes a region of a larger buffer.
//!
//! Every kernel computes each output row from a fixed set of input rows, so
//! rows are handed out as disjoint slices and may be processed in parallel.

pub mod convolve;

pub mod histogram;

pub mod mean;

pub mod threshold;

use std::fmt::Debug;

use crate::{
    config::Parallelism,
    error::{buffer_too_small, invalid_kernel, invalid_shape, Result},
};

/// Pixel types the kernels understand.
pub trait Sample: Copy + Default + PartialEq + Debug + Send + Sync + 'static {}

impl Sample for u8 {}

impl Sample for u16 {}

impl Sample for f32 {}

/// A single-band image over a (possibly padded) row-major buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T: Sample> {
    width: usize,
    height: usize,
    stride: usize,
    start_offset: usize,
    data: Vec<T>,
}

impl<T: Sample> Image<T> {
    /// Creates a `width × height` image filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            stride: width,
            start_offset: 0,
            data: vec![T::default(); width * height],
        }
    }

    /// Wraps an existing buffer, checking the stride and the buffer length.
    pub fn from_parts(
        data: Vec<T>,
        width: usize,
        height: usize,
        stride: usize,
        start_offset: usize,
    ) -> Result<Self> {
        if stride < width {
            return Err(invalid_shape(width, stride, "image stride must be >= width"));
        }

        let required = match height {
            0 => 0,
            _ => start_offset + (height - 1) * stride + width,
        };
        if data.len() < required {
            return Err(buffer_too_small(required, data.len(), "image data"));
        }

        Ok(Self {
            width,
            height,
            stride,
            start_offset,
            data,
        })
    }

    /// A new image of the same width and height with a tight layout.
    pub fn create_same_shape(&self) -> Self {
        Self::new(self.width, self.height)
    }

    /// Copies the pixels into a new buffer with the given layout.
    ///
    /// Padding slots are filled with `fill`.
    pub fn with_layout(&self, stride: usize, start_offset: usize, fill: T) -> Result<Self> {
        if stride < self.width {
            return Err(invalid_shape(self.width, stride, "image stride must be >= width"));
        }

        let len = match self.height {
            0 => start_offset,
            h => start_offset + (h - 1) * stride + self.width,
        };
        let mut data = vec![fill; len];
        for y in 0..self.height {
            let start = start_offset + y * stride;
            data[start..start + self.width].copy_from_slice(self.row(y));
        }

        Self::from_parts(data, self.width, self.height, stride, start_offset)
    }

    /// Copies the region `[x0, x1) × [y0, y1)` into a new tight image.
    pub fn sub_image(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Result<Self> {
        if x0 > x1 || y0 > y1 || x1 > self.width || y1 > self.height {
            return Err(invalid_shape(
                self.width,
                self.stride,
                format!("region [{x0}, {x1}) x [{y0}, {y1}) is outside the image"),
            ));
        }

        let data = (y0..y1)
            .flat_map(|y| self.row(y)[x0..x1].iter().copied())
            .collect();

        Self::from_parts(data, x1 - x0, y1 - y0, x1 - x0, 0)
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    #[inline(always)]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline(always)]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        self.start_offset + y * self.stride + x
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    /// The `width` pixels of row `y`.
    #[inline(always)]
    pub fn row(&self, y: usize) -> &[T] {
        let start = self.start_offset + y * self.stride;
        &self.data[start..start + self.width]
    }

    #[inline(always)]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = self.start_offset + y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Runs `f(y, row)` over every row of this image as a destination.
    pub(crate) fn for_each_row_mut<F>(&mut self, parallelism: Parallelism<'_>, f: F)
    where
        F: Fn(usize, &mut [T]) + Send + Sync,
    {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let (stride, height, width) = (self.stride, self.height, self.width);
        let data = &mut self.data[self.start_offset..];
        parallelism.for_each_row(data, stride, height, width, f);
    }
}

/// A 1D filter kernel: `width` taps, tap `offset` aligned with the output pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel1D {
    data: Vec<f32>,
    offset: usize,
}

impl Kernel1D {
    pub fn new(data: Vec<f32>, offset: usize) -> Result<Self> {
        if data.is_empty() {
            return Err(invalid_kernel("kernel needs at least one tap"));
        }
        if offset >= data.len() {
            return Err(invalid_kernel(format!(
                "offset {offset} is outside a kernel of width {}",
                data.len()
            )));
        }

        Ok(Self { data, offset })
    }

    /// Sampled Gaussian of radius `radius` (width `2 * radius + 1`), anchored
    /// at its centre and normalized to sum to one.
    ///
    /// A non-positive `sigma` is derived from the radius.
    pub fn gaussian(radius: usize, sigma: f32) -> Self {
        let sigma = match sigma > 0.0 {
            true => sigma,
            false => (2 * radius + 1) as f32 / 5.0,
        };

        let data = (0..=2 * radius)
            .map(|i| {
                let d = i as f32 - radius as f32;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();

        Self {
            data,
            offset: radius,
        }
        .normalized()
    }

    /// Scales the taps so they sum to one. A zero-sum kernel is returned as is.
    pub fn normalized(mut self) -> Self {
        let total: f32 = self.data.iter().sum();
        if total != 0.0 {
            self.data.iter_mut().for_each(|tap| *tap /= total);
        }
        self
    }

    #[inline(always)]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;

    #[test]
    fn addressing_uses_offset_and_stride() {
        let data: Vec<u8> = (0..20).collect();
        let image = Image::from_parts(data, 3, 2, 8, 2).unwrap();
        assert_eq!(image.row(0), &[2, 3, 4]);
        assert_eq!(image.row(1), &[10, 11, 12]);
        assert_eq!(image.get(2, 1), 12);
    }

    #[test]
    fn rejects_bad_layouts() {
        assert!(matches!(
            Image::from_parts(vec![0u8; 10], 4, 3, 3, 0),
            Err(KernelError::InvalidShape { .. })
        ));
        assert!(matches!(
            Image::from_parts(vec![0u8; 10], 4, 3, 4, 0),
            Err(KernelError::BufferTooSmall { required: 12, found: 10, .. })
        ));
    }

    #[test]
    fn relayout_preserves_pixels() {
        let data: Vec<u16> = (0..12).collect();
        let image = Image::from_parts(data, 4, 3, 4, 0).unwrap();
        let padded = image.with_layout(7, 5, u16::MAX).unwrap();

        assert_eq!(padded.stride(), 7);
        for y in 0..3 {
            assert_eq!(padded.row(y), image.row(y));
        }
        assert_eq!(padded.data()[0], u16::MAX);
    }

    #[test]
    fn sub_image_copies_region() {
        let data: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let image = Image::from_parts(data, 4, 4, 4, 0).unwrap();
        let region = image.sub_image(1, 2, 3, 4).unwrap();

        assert_eq!(region.width(), 2);
        assert_eq!(region.row(0), &[9.0, 10.0]);
        assert_eq!(region.row(1), &[13.0, 14.0]);
        assert!(image.sub_image(3, 0, 5, 1).is_err());
    }

    #[test]
    fn kernel_offset_must_be_inside() {
        assert!(Kernel1D::new(vec![1.0, 2.0], 1).is_ok());
        assert!(Kernel1D::new(vec![1.0, 2.0], 2).is_err());
        assert!(Kernel1D::new(Vec::new(), 0).is_err());
    }

    #[test]
    fn gaussian_is_normalized_and_symmetric() {
        let kernel = Kernel1D::gaussian(3, -1.0);
        assert_eq!(kernel.width(), 7);
        assert_eq!(kernel.offset(), 3);

        let total: f32 = kernel.data().iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!((kernel.data()[0] - kernel.data()[6]).abs() < 1e-7);
        assert!(kernel.data()[3] > kernel.data()[2]);
    }
}
