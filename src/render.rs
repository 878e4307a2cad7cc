//! Cross markers drawn over the color image for every detected cell

use crate::models::{CellLedger, CellPoint, ColorImage, RED, RGB_CHANNELS};

/// Shape and color of a cell marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Pixels from the centre to the tip of each arm
    pub arm_radius: usize,
    /// Extra pixels on each side of a bar (0 gives 1-pixel bars)
    pub half_thickness: usize,
    /// Marker color
    pub color: [u8; RGB_CHANNELS],
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            arm_radius: 10,
            half_thickness: 1,
            color: RED,
        }
    }
}

/// Draw the default red cross at every ledger entry
pub fn render_markers(image: &mut ColorImage, ledger: &CellLedger) {
    render_markers_with_style(image, ledger, &MarkerStyle::default());
}

/// Draw a cross with `style` at every ledger entry
///
/// Pixels are overwritten, and anything outside the image is clipped pixel
/// by pixel, so drawing the same ledger twice gives the same result.
pub fn render_markers_with_style(image: &mut ColorImage, ledger: &CellLedger, style: &MarkerStyle) {
    for cell in ledger {
        draw_cross(image, cell, style);
    }
    log::debug!("rendered {} markers", ledger.len());
}

/// Draw one cross centred at `center`
///
/// Centres too large for signed offsets are skipped; bar pixels whose
/// coordinates would overflow are dropped like any other clipped pixel.
pub fn draw_cross(image: &mut ColorImage, center: &CellPoint, style: &MarkerStyle) {
    let Some((x, y)) = center.as_signed() else {
        return;
    };
    // nothing past the image extent can land on it
    let extent = image.width().max(image.height());
    let r = style.arm_radius.min(extent) as isize;
    let t = style.half_thickness.min(extent) as isize;

    for i in -r..=r {
        for k in -t..=t {
            // horizontal bar
            if let (Some(px), Some(py)) = (x.checked_add(i), y.checked_add(k)) {
                image.set_clipped(px, py, style.color);
            }
            // vertical bar
            if let (Some(px), Some(py)) = (x.checked_add(k), y.checked_add(i)) {
                image.set_clipped(px, py, style.color);
            }
        }
    }
}
