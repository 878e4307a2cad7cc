/// Convert grayscale images to binary using a global split value
/// A pixel becomes white only when it is strictly greater than the threshold.
use crate::models::{BinaryImage, GrayImage};

/// Count how often each intensity occurs
pub fn histogram(gray: &GrayImage) -> [u32; 256] {
    let mut histogram = [0u32; 256];
    for &pixel in gray.as_slice() {
        histogram[pixel as usize] += 1;
    }
    histogram
}

/// Calculate Otsu's optimal threshold
///
/// Background is every intensity `<= split`, foreground everything above.
/// Splits with an empty class are skipped. Only a strictly greater score
/// replaces the current best, which starts at score 0 / split 0, so ties
/// keep the lowest split and an image without a valid split yields 0.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    otsu_threshold_from_histogram(&histogram(gray))
}

/// Otsu's method over a precomputed 256-bin histogram
pub fn otsu_threshold_from_histogram(histogram: &[u32; 256]) -> u8 {
    let total_pixels: u64 = histogram.iter().map(|&c| c as u64).sum();
    if total_pixels == 0 {
        return 0;
    }
    let total_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(intensity, &c)| intensity as u64 * c as u64)
        .sum();

    let total = total_pixels as f64;
    let mut max_variance = 0.0;
    let mut optimal_threshold = 0u8;

    let mut background_pixels = 0u64;
    let mut background_sum = 0u64;

    for split in 0..=255usize {
        background_pixels += histogram[split] as u64;
        background_sum += split as u64 * histogram[split] as u64;
        let foreground_pixels = total_pixels - background_pixels;

        if background_pixels == 0 || foreground_pixels == 0 {
            continue;
        }

        let background_mean = background_sum as f64 / background_pixels as f64;
        let foreground_mean = (total_sum - background_sum) as f64 / foreground_pixels as f64;

        let background_weight = background_pixels as f64 / total;
        let foreground_weight = foreground_pixels as f64 / total;

        let variance =
            background_weight * foreground_weight * (background_mean - foreground_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = split as u8;
        }
    }

    optimal_threshold
}

/// Simple global threshold binarization
pub fn binarize(gray: &GrayImage, threshold: u8) -> BinaryImage {
    let (width, height) = gray.dimensions();
    let mut binary = BinaryImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            binary.set(x, y, gray.get(x, y) > threshold);
        }
    }

    binary
}

/// Threshold, then black out a frame `border` pixels wide on all four sides
///
/// A border of 0 disables the suppression.
pub fn binarize_with_border(gray: &GrayImage, threshold: u8, border: usize) -> BinaryImage {
    let mut binary = binarize(gray, threshold);
    suppress_border(&mut binary, border);
    binary
}

/// Force the outermost `border` rows and columns to black
///
/// Borders wider than the image clamp to its extent.
pub fn suppress_border(binary: &mut BinaryImage, border: usize) {
    if border == 0 {
        return;
    }
    let (width, height) = binary.dimensions();
    let bx = border.min(width);
    let by = border.min(height);

    for y in 0..height {
        let in_band = y < by || y >= height - by;
        for x in 0..width {
            if in_band || x < bx || x >= width - bx {
                binary.set(x, y, false);
            }
        }
    }
}
