//! cell_scan - morphological cell detection for microscope bitmaps
//!
//! Bright cells on a dark background are located by reducing a color image
//! to gray, smoothing it, thresholding with Otsu's method and then eroding
//! the binary image pass by pass. After every pass a blob detector records
//! the blobs that have shrunk enough to be isolated, and finally a red cross
//! is drawn over each recorded cell.
//!
//! ```no_run
//! use cell_scan::tools::{load_rgb, save_rgb};
//!
//! let mut image = load_rgb("cells.bmp")?;
//! let count = cell_scan::annotate_cells(&mut image)?;
//! println!("Drew {} points", count);
//! save_rgb(&image, "cells_marked.bmp")?;
//! # Ok::<(), cell_scan::CellScanError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Pipeline settings and environment overrides
pub mod config;
/// Erosion and blob detection on binary images
pub mod detector;
/// Error type shared by every stage
pub mod error;
/// Core data structures (image buffers, cell points, the ledger)
pub mod models;
/// Stage orchestration
pub mod pipeline;
/// Cross markers over the color image
pub mod render;
/// Bitmap loading/saving and reporting helpers for the CLI
pub mod tools;
/// Whole-buffer stages (grayscale, convolution, binarization)
pub mod utils;

pub use config::{BlurMode, DetectionOrder, DuplicatePolicy, PipelineConfig};
pub use detector::{DetectionStrategy, OutOfBounds};
pub use error::{CellScanError, Result};
pub use models::{
    BinaryImage, CellLedger, CellPoint, ColorImage, GrayImage, IMAGE_HEIGHT, IMAGE_WIDTH,
    RGB_CHANNELS,
};
pub use pipeline::{CellScanner, PipelineReport, Stage, annotate_cells, detect_cells};
pub use render::{MarkerStyle, render_markers};
