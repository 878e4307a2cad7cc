//! Image processing stages that work on whole buffers
//!
//! This module provides the building blocks ahead of detection:
//! - Color reduction (RGB to gray and back)
//! - Convolution (Gaussian blur and sharpen presets)
//! - Binarization (Otsu's method, thresholding, border suppression)

/// Otsu threshold, binarization and border suppression
pub mod binarization;
/// Kernels and snapshot convolution
pub mod convolution;
/// RGB to gray conversion and back
pub mod grayscale;
