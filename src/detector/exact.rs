/// Windowed cell detection with an exclusion frame
///
/// A candidate (x, y) owns the detection area covering offsets `[-h, h)` on
/// both axes, where `h = detection_area_size / 2`. It is reported when the
/// area holds at least one white pixel and every frame ring around it is
/// black. Frame level `L` is the ring bounding the square of half-size
/// `h + L`, i.e. the rows and columns at offsets `-(h + L) - 1` and `h + L`.
/// Ring cells outside the image count as black.
use crate::error::{CellScanError, Result};
use crate::models::{BinaryImage, CellLedger};

use super::clear_square;

/// Side of the default detection area
pub const DEFAULT_DETECTION_AREA: usize = 12;
/// Default number of frame rings around the detection area
pub const DEFAULT_EXCLUSION_FRAME: usize = 1;

/// Scan the whole image, record each isolated blob and clear its area
///
/// Candidates are visited column by column (x outer, y inner). Each hit is
/// appended to `ledger` and its detection area is blanked so the same blob
/// is not reported again later in the scan. Remnants of a blob larger than
/// the area can still be reported on a later erosion pass.
///
/// # Errors
/// [`CellScanError::InvalidDetectionArea`] if `detection_area_size` is odd
/// or zero; the image and ledger are untouched.
pub fn detect_blobs_exact(
    binary: &mut BinaryImage,
    detection_area_size: usize,
    exclusion_frame_thickness: usize,
    ledger: &mut CellLedger,
) -> Result<usize> {
    if detection_area_size == 0 || detection_area_size % 2 != 0 {
        return Err(CellScanError::InvalidDetectionArea(detection_area_size));
    }

    let (width, height) = binary.dimensions();
    // offsets at or past the extent never reach a pixel, so larger
    // areas and frames behave exactly like these clamped ones
    let extent = width.max(height);
    let half = (detection_area_size / 2).min(extent);
    let frame = exclusion_frame_thickness.min(extent - half);
    let (half, frame) = (half as isize, frame as isize);
    let mut detected = 0usize;

    for x in 0..width {
        for y in 0..height {
            let (cx, cy) = (x as isize, y as isize);
            if !is_detection_area_active(binary, half, cx, cy) {
                continue;
            }
            if !is_exclusion_frame_clear(binary, half, frame, cx, cy) {
                continue;
            }

            ledger.push(x, y);
            detected += 1;
            clear_square(binary, cx, cy, half);
        }
    }

    log::debug!(
        "exact scan (area {}, frame {}) found {} cells",
        detection_area_size,
        exclusion_frame_thickness,
        detected
    );
    Ok(detected)
}

/// True if no frame ring holds an in-bounds white pixel
fn is_exclusion_frame_clear(
    binary: &BinaryImage,
    half: isize,
    frame: isize,
    cx: isize,
    cy: isize,
) -> bool {
    for level in 0..=frame {
        let lo = -(half + level) - 1;
        let hi = half + level;
        for t in lo..=hi {
            if binary.is_white_at(cx + t, cy + lo)
                || binary.is_white_at(cx + t, cy + hi)
                || binary.is_white_at(cx + lo, cy + t)
                || binary.is_white_at(cx + hi, cy + t)
            {
                return false;
            }
        }
    }
    true
}

/// True if the detection area holds at least one white pixel
fn is_detection_area_active(binary: &BinaryImage, half: isize, cx: isize, cy: isize) -> bool {
    for dx in -half..half {
        for dy in -half..half {
            if binary.is_white_at(cx + dx, cy + dy) {
                return true;
            }
        }
    }
    false
}
