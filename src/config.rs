//! Pipeline configuration
//!
//! [`PipelineConfig::default`] reproduces the stock stage order; every field
//! can be overridden from `CELL_*` environment variables with
//! [`PipelineConfig::from_env`].

use crate::detector::{DEFAULT_DETECTION_AREA, DEFAULT_EXCLUSION_FRAME, DetectionStrategy, OutOfBounds};
use crate::render::MarkerStyle;

/// Smoothing kernel applied before thresholding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlurMode {
    /// 3x3 Gaussian
    Gaussian3x3,
    /// 5x5 Gaussian
    #[default]
    Gaussian5x5,
}

impl BlurMode {
    /// Parse `3x3` or `5x5`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "3x3" | "3" => Some(Self::Gaussian3x3),
            "5x5" | "5" => Some(Self::Gaussian5x5),
            _ => None,
        }
    }
}

/// When the detector runs relative to each erosion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionOrder {
    /// Erode, and while erosion changed something, detect on the result
    #[default]
    AfterErosion,
    /// Detect, then erode; stop once erosion changes nothing
    BeforeErosion,
}

/// What to do with a cell found again on a later erosion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Record every detection, even remnants of a blob already reported
    #[default]
    Keep,
    /// Drop a detection within this Chebyshev distance of a cell from an
    /// earlier pass
    SuppressWithin(usize),
}

/// Settings for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Smoothing kernel
    pub blur: BlurMode,
    /// How many times the smoothing kernel is applied
    pub blur_passes: usize,
    /// Apply the sharpen kernel after smoothing
    pub sharpen: bool,
    /// Width of the frame forced to black after thresholding (0 disables)
    pub border_width: usize,
    /// Blob detector
    pub strategy: DetectionStrategy,
    /// Treatment of neighbours outside the image during erosion
    pub erosion_border: OutOfBounds,
    /// Detector placement relative to erosion
    pub order: DetectionOrder,
    /// Cross-pass duplicate handling
    pub duplicates: DuplicatePolicy,
    /// Marker drawn for each cell
    pub marker: MarkerStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur: BlurMode::default(),
            blur_passes: 3,
            sharpen: false,
            border_width: 0,
            strategy: DetectionStrategy::default(),
            erosion_border: OutOfBounds::default(),
            order: DetectionOrder::default(),
            duplicates: DuplicatePolicy::default(),
            marker: MarkerStyle::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `CELL_*` environment variables
    ///
    /// Recognised: `CELL_BLUR` (`3x3`/`5x5`), `CELL_BLUR_PASSES`,
    /// `CELL_SHARPEN`, `CELL_BORDER`, `CELL_STRATEGY` (`quick`/`exact`),
    /// `CELL_AREA`, `CELL_FRAME`, `CELL_DEDUP_RADIUS`, `CELL_BEFORE_EROSION`,
    /// `CELL_BLACK_BORDER`. Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let blur = env_string("CELL_BLUR")
            .and_then(|v| BlurMode::from_name(&v))
            .unwrap_or(defaults.blur);

        let strategy = match env_string("CELL_STRATEGY").and_then(|v| DetectionStrategy::from_name(&v)) {
            Some(DetectionStrategy::Exact { .. }) => DetectionStrategy::Exact {
                detection_area_size: parse_env_usize("CELL_AREA", DEFAULT_DETECTION_AREA),
                exclusion_frame_thickness: parse_env_usize("CELL_FRAME", DEFAULT_EXCLUSION_FRAME),
            },
            Some(other) => other,
            None => defaults.strategy,
        };

        let duplicates = match parse_env_usize("CELL_DEDUP_RADIUS", 0) {
            0 => DuplicatePolicy::Keep,
            radius => DuplicatePolicy::SuppressWithin(radius),
        };

        let order = if parse_env_bool_u8("CELL_BEFORE_EROSION", false) {
            DetectionOrder::BeforeErosion
        } else {
            DetectionOrder::AfterErosion
        };

        let erosion_border = if parse_env_bool_u8("CELL_BLACK_BORDER", false) {
            OutOfBounds::Black
        } else {
            OutOfBounds::Skip
        };

        Self {
            blur,
            blur_passes: parse_env_usize("CELL_BLUR_PASSES", defaults.blur_passes),
            sharpen: parse_env_bool_u8("CELL_SHARPEN", defaults.sharpen),
            border_width: parse_env_usize("CELL_BORDER", defaults.border_width),
            strategy,
            erosion_border,
            order,
            duplicates,
            marker: defaults.marker,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}
