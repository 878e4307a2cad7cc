//! Stage orchestration for a full detection run
//!
//! The stages themselves live in [`crate::utils`], [`crate::detector`] and
//! [`crate::render`]; this module only decides their order, as configured by
//! [`PipelineConfig`]. Intermediate buffers are reported through a [`Stage`]
//! observer so callers can dump or inspect them.

use crate::config::{BlurMode, DetectionOrder, DuplicatePolicy, PipelineConfig};
use crate::detector::erosion::erode_in_place;
use crate::error::Result;
use crate::models::{BinaryImage, CellLedger, ColorImage, GrayImage};
use crate::render::render_markers_with_style;
use crate::utils::binarization::{binarize_with_border, otsu_threshold};
use crate::utils::convolution::{gaussian_blur_3x3, gaussian_blur_5x5, sharpen};
use crate::utils::grayscale::rgb_to_grayscale;

/// Intermediate results handed to the observer of a run
#[derive(Debug)]
pub enum Stage<'a> {
    /// Grayscale image after smoothing (and sharpening, if enabled)
    Smoothed(&'a GrayImage),
    /// Split value chosen by Otsu's method
    Threshold(u8),
    /// Thresholded image after border suppression
    Binarized(&'a BinaryImage),
    /// State after one erosion/detection pass
    Pass {
        /// Zero-based pass number
        index: usize,
        /// Binary image after the pass
        image: &'a BinaryImage,
        /// Pixels changed by erosion in this pass
        eroded: usize,
        /// Cells recorded in this pass
        detected: usize,
    },
}

/// Outcome of a detection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Otsu threshold used for binarization
    pub threshold: u8,
    /// Number of erosion passes that ran a detector
    pub passes: usize,
    /// Every cell recorded during the run
    pub cells: CellLedger,
}

/// Runs the configured stages over a color image
#[derive(Debug, Clone, Default)]
pub struct CellScanner {
    config: PipelineConfig,
}

impl CellScanner {
    /// Create a scanner with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Detect cells without touching the input
    pub fn scan(&self, image: &ColorImage) -> Result<PipelineReport> {
        self.scan_with_observer(image, |_| {})
    }

    /// Detect cells, then draw a marker for each one onto `image`
    pub fn annotate(&self, image: &mut ColorImage) -> Result<PipelineReport> {
        let report = self.scan(image)?;
        render_markers_with_style(image, &report.cells, &self.config.marker);
        Ok(report)
    }

    /// Detect cells, reporting every intermediate buffer to `observe`
    pub fn scan_with_observer<F>(&self, image: &ColorImage, mut observe: F) -> Result<PipelineReport>
    where
        F: FnMut(Stage<'_>),
    {
        let mut gray = rgb_to_grayscale(image);
        self.smooth(&mut gray);
        observe(Stage::Smoothed(&gray));

        let threshold = otsu_threshold(&gray);
        log::info!("otsu threshold is {}", threshold);
        observe(Stage::Threshold(threshold));

        let mut binary = binarize_with_border(&gray, threshold, self.config.border_width);
        observe(Stage::Binarized(&binary));

        let (cells, passes) = self.erode_and_detect(&mut binary, &mut observe)?;
        log::info!(
            "{} detector found {} cells over {} passes",
            self.config.strategy.name(),
            cells.len(),
            passes
        );

        Ok(PipelineReport {
            threshold,
            passes,
            cells,
        })
    }

    /// Alternate erosion and detection until erosion reaches its fixed point
    ///
    /// Returns the ledger and the number of passes that ran the detector.
    pub fn erode_and_detect<F>(
        &self,
        binary: &mut BinaryImage,
        observe: &mut F,
    ) -> Result<(CellLedger, usize)>
    where
        F: FnMut(Stage<'_>),
    {
        let border = self.config.erosion_border;
        let mut cells = CellLedger::new();
        let mut pass = 0usize;

        match self.config.order {
            DetectionOrder::AfterErosion => loop {
                let eroded = erode_in_place(binary, border);
                if eroded == 0 {
                    break;
                }
                let detected = self.detect_pass(binary, &mut cells)?;
                log::debug!("pass {}: eroded {}, detected {}", pass, eroded, detected);
                observe(Stage::Pass {
                    index: pass,
                    image: binary,
                    eroded,
                    detected,
                });
                pass += 1;
            },
            DetectionOrder::BeforeErosion => loop {
                let detected = self.detect_pass(binary, &mut cells)?;
                let eroded = erode_in_place(binary, border);
                log::debug!("pass {}: detected {}, eroded {}", pass, detected, eroded);
                observe(Stage::Pass {
                    index: pass,
                    image: binary,
                    eroded,
                    detected,
                });
                pass += 1;
                if eroded == 0 {
                    break;
                }
            },
        }

        Ok((cells, pass))
    }

    fn smooth(&self, gray: &mut GrayImage) {
        for _ in 0..self.config.blur_passes {
            match self.config.blur {
                BlurMode::Gaussian3x3 => gaussian_blur_3x3(gray),
                BlurMode::Gaussian5x5 => gaussian_blur_5x5(gray),
            }
        }
        if self.config.sharpen {
            sharpen(gray);
        }
    }

    fn detect_pass(&self, binary: &mut BinaryImage, cells: &mut CellLedger) -> Result<usize> {
        match self.config.duplicates {
            DuplicatePolicy::Keep => self.config.strategy.detect(binary, cells),
            DuplicatePolicy::SuppressWithin(radius) => {
                let mut fresh = CellLedger::new();
                self.config.strategy.detect(binary, &mut fresh)?;
                let kept: Vec<_> = fresh
                    .as_slice()
                    .iter()
                    .filter(|cell| !cells.contains_near(cell, radius))
                    .copied()
                    .collect();
                let suppressed = fresh.len() - kept.len();
                if suppressed > 0 {
                    log::debug!("suppressed {} repeat detections", suppressed);
                }
                let count = kept.len();
                cells.extend(kept);
                Ok(count)
            }
        }
    }
}

/// Run the default pipeline and return the detected cells
pub fn detect_cells(image: &ColorImage) -> Result<CellLedger> {
    Ok(CellScanner::default().scan(image)?.cells)
}

/// Run the default pipeline and mark every cell on `image`; returns the count
pub fn annotate_cells(image: &mut ColorImage) -> Result<usize> {
    Ok(CellScanner::default().annotate(image)?.cells.len())
}
