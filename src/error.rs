//! Error types for the cell_scan library

use thiserror::Error;

/// Result type alias for cell_scan operations
pub type Result<T> = std::result::Result<T, CellScanError>;

/// Errors reported by the pipeline stages and the bitmap tools
#[derive(Error, Debug)]
pub enum CellScanError {
    /// Convolution kernels must have an odd, non-zero side length
    #[error("Kernel size must be odd, got {0}")]
    EvenKernelSize(usize),

    /// The weight list does not fill a square kernel
    #[error("Kernel has {len} weights, expected {size}x{size}")]
    KernelShape {
        /// Number of weights supplied
        len: usize,
        /// Requested side length
        size: usize,
    },

    /// A raw pixel buffer does not match the image extent
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidDataLength(usize, usize),

    /// Two buffers (or a buffer and the fixed extent) disagree on size
    #[error("Image size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        /// Expected (width, height)
        expected: (usize, usize),
        /// Actual (width, height)
        actual: (usize, usize),
    },

    /// The windowed detector needs an even, non-zero detection area
    #[error("Detection area size must be even and non-zero, got {0}")]
    InvalidDetectionArea(usize),

    /// Bitmap decoding or encoding failed
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error while reading or writing a bitmap
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
