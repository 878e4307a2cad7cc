/// One pass of binary erosion with a 4-neighbour structuring element
///
/// A white pixel turns black when any of its up/down/left/right neighbours is
/// black in the image as it was before the pass. Decisions never see pixels
/// already eroded earlier in the same pass.
use crate::models::BinaryImage;

/// Offsets of the structuring element
const CROSS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// How neighbours outside the image take part in erosion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfBounds {
    /// Ignore them; a white pixel on the frame edge only erodes if an
    /// in-image neighbour is black
    #[default]
    Skip,
    /// Treat them as black, so the outermost white ring always erodes
    Black,
}

/// Erode into a new image; returns it together with the number of changed pixels
pub fn erode(binary: &BinaryImage, border: OutOfBounds) -> (BinaryImage, usize) {
    let mut output = binary.clone();
    let changed = erode_from(binary, &mut output, border);
    (output, changed)
}

/// Erode in place through a snapshot; returns the number of changed pixels
///
/// Zero means the image is stable and repeated erosion has reached its fixed
/// point.
pub fn erode_in_place(binary: &mut BinaryImage, border: OutOfBounds) -> usize {
    let snapshot = binary.clone();
    erode_from(&snapshot, binary, border)
}

fn erode_from(src: &BinaryImage, dst: &mut BinaryImage, border: OutOfBounds) -> usize {
    let (width, height) = src.dimensions();
    let mut changed = 0usize;

    for x in 0..width {
        for y in 0..height {
            if src.get(x, y) && should_pixel_erode(src, x as isize, y as isize, border) {
                dst.set(x, y, false);
                changed += 1;
            }
        }
    }

    changed
}

#[inline]
fn should_pixel_erode(src: &BinaryImage, x: isize, y: isize, border: OutOfBounds) -> bool {
    CROSS.iter().any(|&(dx, dy)| match src.sample(x + dx, y + dy) {
        Some(white) => !white,
        None => border == OutOfBounds::Black,
    })
}
