//! Cell detection modules
//!
//! This module contains the morphological stages that run on binary images:
//! - Erosion with a 4-neighbour structuring element
//! - Exact windowed detection (detection area plus exclusion frame)
//! - Quick detection of isolated white pixels

/// Single-pass binary erosion
pub mod erosion;
/// Windowed detector with an exclusion frame
pub mod exact;
/// Isolated-pixel detector
pub mod quick;

use crate::error::Result;
use crate::models::{BinaryImage, CellLedger};

pub use erosion::OutOfBounds;
pub use exact::{DEFAULT_DETECTION_AREA, DEFAULT_EXCLUSION_FRAME};

/// Which blob detector to run on each erosion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionStrategy {
    /// Windowed scan: detection area plus exclusion frame
    Exact {
        /// Side of the square detection area (even)
        detection_area_size: usize,
        /// Number of frame rings that must be black
        exclusion_frame_thickness: usize,
    },
    /// Isolated-pixel scan with fixed rings and a 16x16 clear block
    #[default]
    Quick,
}

impl DetectionStrategy {
    /// Exact scan with the default 12x12 area and a one-ring frame
    pub fn exact() -> Self {
        Self::Exact {
            detection_area_size: DEFAULT_DETECTION_AREA,
            exclusion_frame_thickness: DEFAULT_EXCLUSION_FRAME,
        }
    }

    /// Parse `quick` or `exact` (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "quick" => Some(Self::Quick),
            "exact" => Some(Self::exact()),
            _ => None,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact { .. } => "exact",
            Self::Quick => "quick",
        }
    }

    /// Run one scan, appending hits to `ledger` and clearing them from `binary`
    pub fn detect(&self, binary: &mut BinaryImage, ledger: &mut CellLedger) -> Result<usize> {
        match *self {
            Self::Exact {
                detection_area_size,
                exclusion_frame_thickness,
            } => exact::detect_blobs_exact(
                binary,
                detection_area_size,
                exclusion_frame_thickness,
                ledger,
            ),
            Self::Quick => Ok(quick::detect_blobs_quick(binary, ledger)),
        }
    }
}

/// Blacken offsets `[-half, half)` around (cx, cy), clipped to the image
pub(crate) fn clear_square(binary: &mut BinaryImage, cx: isize, cy: isize, half: isize) {
    for dx in -half..half {
        for dy in -half..half {
            binary.clear_at(cx + dx, cy + dy);
        }
    }
}
