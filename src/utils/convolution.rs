//! Square-kernel convolution over grayscale images
//!
//! Only pixels whose whole neighbourhood lies inside the image are
//! recomputed; the outer `radius` rows and columns keep their values. Every
//! output is computed from a snapshot taken before the pass.

use crate::error::{CellScanError, Result};
use crate::models::GrayImage;
use rayon::prelude::*;

const GAUSSIAN_3X3: [i32; 9] = [
    1, 2, 1, //
    2, 4, 2, //
    1, 2, 1,
];

const GAUSSIAN_5X5: [i32; 25] = [
    1, 4, 7, 4, 1, //
    4, 16, 26, 16, 4, //
    7, 26, 41, 26, 7, //
    4, 16, 26, 16, 4, //
    1, 4, 7, 4, 1,
];

const SHARPEN_3X3: [i32; 9] = [
    0, -1, 0, //
    -1, 5, -1, //
    0, -1, 0,
];

/// Square matrix of integer weights with its divisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    size: usize,
    weights: Vec<i32>,
    divisor: i64,
}

impl Kernel {
    /// Build a kernel from row-major weights
    ///
    /// The divisor is the sum of the weights, or 1 when they sum to zero.
    /// Even sizes are accepted here and rejected by [`convolve`].
    pub fn new(size: usize, weights: Vec<i32>) -> Result<Self> {
        if weights.len() != size * size {
            return Err(CellScanError::KernelShape {
                len: weights.len(),
                size,
            });
        }
        let divisor = weight_sum(&weights);
        Ok(Self {
            size,
            weights,
            divisor,
        })
    }

    fn from_table(size: usize, table: &[i32]) -> Self {
        Self {
            size,
            weights: table.to_vec(),
            divisor: weight_sum(table),
        }
    }

    /// 3x3 Gaussian, divisor 16
    pub fn gaussian_3x3() -> Self {
        Self::from_table(3, &GAUSSIAN_3X3)
    }

    /// 5x5 Gaussian, divisor 273
    pub fn gaussian_5x5() -> Self {
        Self::from_table(5, &GAUSSIAN_5X5)
    }

    /// 3x3 sharpen, divisor 1
    pub fn sharpen_3x3() -> Self {
        Self::from_table(3, &SHARPEN_3X3)
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half the side length, rounded down
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Divisor applied to each weighted sum
    pub fn divisor(&self) -> i64 {
        self.divisor
    }

    /// Row-major weights
    pub fn weights(&self) -> &[i32] {
        &self.weights
    }
}

/// Apply `kernel` to `image` in place
///
/// # Errors
/// Returns [`CellScanError::EvenKernelSize`] for an even or empty kernel;
/// the image is left untouched in that case.
pub fn convolve(image: &mut GrayImage, kernel: &Kernel) -> Result<()> {
    if kernel.size % 2 == 0 {
        log::warn!(
            "refusing to convolve with a {}x{} kernel: size must be odd",
            kernel.size,
            kernel.size
        );
        return Err(CellScanError::EvenKernelSize(kernel.size));
    }
    apply_kernel(image, kernel);
    Ok(())
}

/// Smooth with the 3x3 Gaussian preset
pub fn gaussian_blur_3x3(image: &mut GrayImage) {
    apply_kernel(image, &Kernel::gaussian_3x3());
}

/// Smooth with the 5x5 Gaussian preset
pub fn gaussian_blur_5x5(image: &mut GrayImage) {
    apply_kernel(image, &Kernel::gaussian_5x5());
}

/// Enhance edges with the 3x3 sharpen preset
pub fn sharpen(image: &mut GrayImage) {
    apply_kernel(image, &Kernel::sharpen_3x3());
}

fn apply_kernel(image: &mut GrayImage, kernel: &Kernel) {
    let (width, height) = image.dimensions();
    let radius = kernel.radius();
    if width <= 2 * radius || height <= 2 * radius {
        return;
    }

    let snapshot = image.as_slice().to_vec();
    let size = kernel.size;
    let weights = kernel.weights.as_slice();
    let divisor = kernel.divisor;

    image
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .filter(|(y, _)| *y >= radius && *y < height - radius)
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate().take(width - radius).skip(radius) {
                let mut sum: i64 = 0;
                for ky in 0..size {
                    let src_row = (y + ky - radius) * width;
                    let weight_row = &weights[ky * size..(ky + 1) * size];
                    for (kx, &w) in weight_row.iter().enumerate() {
                        let term = snapshot[src_row + x + kx - radius] as i64 * w as i64;
                        sum = sum.saturating_add(term);
                    }
                }
                *out = floor_div(sum, divisor).clamp(0, 255) as u8;
            }
        });
}

/// Sum of the weights in i64, or 1 when they cancel out
fn weight_sum(weights: &[i32]) -> i64 {
    let sum = weights
        .iter()
        .fold(0i64, |acc, &w| acc.saturating_add(w as i64));
    if sum == 0 { 1 } else { sum }
}

#[inline]
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}
