/// Quick cell detection from isolated white pixels
///
/// Only the straight sides of two square rings (distance 6 and 7 from the
/// candidate, corners excluded) are sampled, so a neighbour that only shows
/// up in a ring corner goes unnoticed. In exchange the cost per candidate is
/// a fixed handful of reads.
use crate::models::{BinaryImage, CellLedger};

use super::clear_square;

/// Distances of the sampled rings
pub const QUICK_RING_DISTANCES: [isize; 2] = [6, 7];
/// Half side of the block cleared around each hit (16x16 block)
pub const QUICK_CLEAR_HALF: isize = 8;

/// Scan the whole image for isolated white pixels
///
/// Visits pixels x outer, y inner. Each white pixel whose ring sides are
/// black is appended to `ledger` and the 16x16 block around it (offsets
/// `[-8, 8)`) is cleared. Returns the number of cells found.
pub fn detect_blobs_quick(binary: &mut BinaryImage, ledger: &mut CellLedger) -> usize {
    let (width, height) = binary.dimensions();
    let mut detected = 0usize;

    for x in 0..width {
        for y in 0..height {
            if !binary.get(x, y) {
                continue;
            }
            let (cx, cy) = (x as isize, y as isize);
            if !is_isolated(binary, cx, cy) {
                continue;
            }

            ledger.push(x, y);
            detected += 1;
            clear_square(binary, cx, cy, QUICK_CLEAR_HALF);
        }
    }

    log::debug!("quick scan found {} cells", detected);
    detected
}

/// True if no in-bounds white pixel lies on the sampled ring sides
fn is_isolated(binary: &BinaryImage, cx: isize, cy: isize) -> bool {
    for distance in QUICK_RING_DISTANCES {
        for t in -(distance - 1)..distance {
            if binary.is_white_at(cx + t, cy - distance)
                || binary.is_white_at(cx + t, cy + distance)
                || binary.is_white_at(cx - distance, cy + t)
                || binary.is_white_at(cx + distance, cy + t)
            {
                return false;
            }
        }
    }
    true
}
