//! Data structures shared by every stage
//!
//! - Pixel buffers: RGB, grayscale and bit-packed binary images
//! - `CellPoint`, the coordinate of one detected cell
//! - `CellLedger`, the ordered record of detections

/// Row-major pixel buffers and the fixed image extent
pub mod image;
/// Ordered record of detected cells
pub mod ledger;
/// Integer cell coordinates
pub mod point;

pub use image::{BinaryImage, ColorImage, GrayImage, IMAGE_HEIGHT, IMAGE_WIDTH, RED, RGB_CHANNELS};
pub use ledger::CellLedger;
pub use point::CellPoint;
