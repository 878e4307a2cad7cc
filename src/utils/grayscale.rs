/// Color reduction between the RGB and single-channel buffers
/// gray = (R + G + B) / 3 with truncating integer division
///
/// Rows are independent, so both directions are processed in parallel with
/// rayon. Expanding back to RGB replicates the intensity into every channel;
/// it is a lossless widening, not an inverse of the reduction.
use crate::error::{CellScanError, Result};
use crate::models::{ColorImage, GrayImage, RGB_CHANNELS};
use rayon::prelude::*;

/// Average of the three channels, truncated
#[inline]
pub fn channel_mean(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

/// Convert an RGB image to grayscale
pub fn rgb_to_grayscale(rgb: &ColorImage) -> GrayImage {
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    reduce_rows(rgb, &mut gray);
    gray
}

/// Convert an RGB image into an existing grayscale buffer of the same extent
pub fn rgb_to_grayscale_into(rgb: &ColorImage, gray: &mut GrayImage) -> Result<()> {
    if rgb.dimensions() != gray.dimensions() {
        return Err(CellScanError::SizeMismatch {
            expected: rgb.dimensions(),
            actual: gray.dimensions(),
        });
    }
    reduce_rows(rgb, gray);
    Ok(())
}

fn reduce_rows(rgb: &ColorImage, gray: &mut GrayImage) {
    let width = rgb.width();
    if width == 0 {
        return;
    }
    let src = rgb.as_bytes();

    gray.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let row_start = y * width * RGB_CHANNELS;
            for (x, out) in row.iter_mut().enumerate() {
                let idx = row_start + x * RGB_CHANNELS;
                *out = channel_mean(src[idx], src[idx + 1], src[idx + 2]);
            }
        });
}

/// Replicate grayscale intensities into all three channels
pub fn grayscale_to_rgb(gray: &GrayImage) -> ColorImage {
    let mut rgb = ColorImage::new(gray.width(), gray.height());
    expand_rows(gray, &mut rgb);
    rgb
}

/// Replicate grayscale intensities into an existing RGB buffer of the same extent
pub fn grayscale_to_rgb_into(gray: &GrayImage, rgb: &mut ColorImage) -> Result<()> {
    if rgb.dimensions() != gray.dimensions() {
        return Err(CellScanError::SizeMismatch {
            expected: gray.dimensions(),
            actual: rgb.dimensions(),
        });
    }
    expand_rows(gray, rgb);
    Ok(())
}

fn expand_rows(gray: &GrayImage, rgb: &mut ColorImage) {
    let width = gray.width();
    if width == 0 {
        return;
    }
    let src = gray.as_slice();

    rgb.as_bytes_mut()
        .par_chunks_mut(width * RGB_CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            let row_start = y * width;
            for (x, pixel) in row.chunks_exact_mut(RGB_CHANNELS).enumerate() {
                pixel.fill(src[row_start + x]);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let white = ColorImage::from_raw(1, 1, vec![255, 255, 255]).unwrap();
        assert_eq!(rgb_to_grayscale(&white).get(0, 0), 255);

        // Pure black
        let black = ColorImage::from_raw(1, 1, vec![0, 0, 0]).unwrap();
        assert_eq!(rgb_to_grayscale(&black).get(0, 0), 0);

        // Pure red is a third of full scale
        let red = ColorImage::from_raw(1, 1, vec![255, 0, 0]).unwrap();
        assert_eq!(rgb_to_grayscale(&red).get(0, 0), 85);

        // Truncating, not rounding: (1 + 1 + 2) / 3 = 1
        let small = ColorImage::from_raw(1, 1, vec![1, 1, 2]).unwrap();
        assert_eq!(rgb_to_grayscale(&small).get(0, 0), 1);

        // 2x2 image keeps its layout
        let img = ColorImage::from_raw(2, 2, vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 30, 60, 90])
            .unwrap();
        let gray = rgb_to_grayscale(&img);
        assert_eq!(gray.as_slice(), &[85, 85, 85, 60]);
    }

    #[test]
    fn test_grayscale_to_rgb() {
        let gray = GrayImage::from_raw(2, 1, vec![7, 200]).unwrap();
        let rgb = grayscale_to_rgb(&gray);
        assert_eq!(rgb.as_bytes(), &[7, 7, 7, 200, 200, 200]);
    }

    #[test]
    fn test_reduction_is_stable_under_reexpansion() {
        let data: Vec<u8> = (0..(5 * 4 * 3)).map(|i| (i * 37 % 256) as u8).collect();
        let img = ColorImage::from_raw(5, 4, data).unwrap();
        let once = grayscale_to_rgb(&rgb_to_grayscale(&img));
        let twice = grayscale_to_rgb(&rgb_to_grayscale(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_into_rejects_mismatched_extent() {
        let rgb = ColorImage::new(3, 3);
        let mut gray = GrayImage::new(3, 2);
        assert!(rgb_to_grayscale_into(&rgb, &mut gray).is_err());
        let mut gray = GrayImage::new(3, 3);
        assert!(rgb_to_grayscale_into(&rgb, &mut gray).is_ok());

        let mut rgb = ColorImage::new(2, 2);
        assert!(grayscale_to_rgb_into(&gray, &mut rgb).is_err());
    }
}
