//! Error types for lanewise operations.
//!
//! The kernels themselves have no error path: shape, stride and aliasing
//! requirements are preconditions. Errors are produced only at the validation
//! boundary (container constructors and [`crate::KernelConfig`]) and by the one
//! configuration check the complex vector multiply performs before any work.

use thiserror::Error;

/// Errors that can occur while building operands or configuring a kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// The lane width cannot hold whole real/imaginary pairs.
    #[error("Invalid lane width: {lane_width} (complex lanes must be even and non-zero)")]
    InvalidLaneWidth {
        /// The rejected lane width, in `f64` slots.
        lane_width: usize,
    },
    /// Operand shapes are not conformable for the requested operation.
    #[error("Dimension mismatch in {operation}: {message}")]
    DimensionMismatch {
        /// Name of the operation that rejected its operands.
        operation: &'static str,
        /// Human-readable error message.
        message: String,
    },
    /// Shape metadata is inconsistent (e.g. stride smaller than the row width).
    #[error("Invalid shape: {message} (width: {width}, stride: {stride})")]
    InvalidShape {
        /// Logical row width in elements.
        width: usize,
        /// Row stride in elements.
        stride: usize,
        /// Human-readable error message.
        message: String,
    },
    /// The backing buffer cannot hold the described shape.
    #[error("Buffer too small: {message} (required {required} elements, found {found})")]
    BufferTooSmall {
        /// Minimum number of elements the shape addresses.
        required: usize,
        /// Number of elements actually present.
        found: usize,
        /// Human-readable error message.
        message: String,
    },
    /// A filter kernel is malformed.
    #[error("Invalid kernel: {message}")]
    InvalidKernel {
        /// Human-readable error message.
        message: String,
    },
    /// Input validation error.
    #[error("Validation error: {message}")]
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
}

/// Result type alias for lanewise operations.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Creates a lane width error.
pub fn invalid_lane_width(lane_width: usize) -> KernelError {
    KernelError::InvalidLaneWidth { lane_width }
}

/// Creates a dimension mismatch error.
pub fn dimension_mismatch(operation: &'static str, message: impl Into<String>) -> KernelError {
    KernelError::DimensionMismatch {
        operation,
        message: message.into(),
    }
}

/// Creates a shape error.
pub fn invalid_shape(width: usize, stride: usize, message: impl Into<String>) -> KernelError {
    KernelError::InvalidShape {
        width,
        stride,
        message: message.into(),
    }
}

/// Creates a buffer size error.
pub fn buffer_too_small(required: usize, found: usize, message: impl Into<String>) -> KernelError {
    KernelError::BufferTooSmall {
        required,
        found,
        message: message.into(),
    }
}

/// Creates a kernel error.
pub fn invalid_kernel(message: impl Into<String>) -> KernelError {
    KernelError::InvalidKernel {
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> KernelError {
    KernelError::ValidationError {
        message: message.into(),
    }
}
