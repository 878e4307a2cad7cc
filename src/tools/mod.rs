use crate::error::{CellScanError, Result};
use crate::models::{BinaryImage, ColorImage, GrayImage, IMAGE_HEIGHT, IMAGE_WIDTH, RGB_CHANNELS};
use crate::pipeline::Stage;
use crate::utils::grayscale::grayscale_to_rgb;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Load a bitmap as RGB, rejecting anything but the fixed 950x950 extent.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<ColorImage> {
    let rgb = image::open(path.as_ref())?.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    if (width, height) != (IMAGE_WIDTH, IMAGE_HEIGHT) {
        return Err(CellScanError::SizeMismatch {
            expected: (IMAGE_WIDTH, IMAGE_HEIGHT),
            actual: (width, height),
        });
    }
    log::debug!("loaded {} ({}x{})", path.as_ref().display(), width, height);
    ColorImage::from_raw(width, height, rgb.into_raw())
}

/// Save an RGB image; the format follows the file extension.
pub fn save_rgb<P: AsRef<Path>>(image: &ColorImage, path: P) -> Result<()> {
    let (width, height) = image.dimensions();
    let buffer = image::RgbImage::from_raw(width as u32, height as u32, image.as_bytes().to_vec())
        .ok_or(CellScanError::InvalidDataLength(
            image.as_bytes().len(),
            width * height * RGB_CHANNELS,
        ))?;
    buffer.save(path.as_ref())?;
    log::debug!("wrote {}", path.as_ref().display());
    Ok(())
}

/// Save a grayscale stage as an RGB bitmap.
pub fn save_gray<P: AsRef<Path>>(gray: &GrayImage, path: P) -> Result<()> {
    save_rgb(&grayscale_to_rgb(gray), path)
}

/// Save a binary stage as a black/white RGB bitmap.
pub fn save_binary<P: AsRef<Path>>(binary: &BinaryImage, path: P) -> Result<()> {
    save_gray(&binary.to_gray(), path)
}

/// Insert `suffix` before the extension: `out.bmp` + `_binary` gives `out_binary.bmp`.
pub fn output_path<P: AsRef<Path>>(base: P, suffix: &str) -> PathBuf {
    let base = base.as_ref();
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    base.with_file_name(name)
}

/// Writes intermediate stages next to an output bitmap.
///
/// Files are named after the output with `_gaussian`, `_binary` and
/// `_erodeN` suffixes. The time spent writing is tracked separately so
/// callers can report pipeline timings without disk I/O. After the first
/// failed write every later stage is ignored.
#[derive(Debug)]
pub struct StageDumper {
    base: PathBuf,
    io_time: Duration,
    error: Option<CellScanError>,
}

impl StageDumper {
    /// Dump stages alongside `base`
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            io_time: Duration::ZERO,
            error: None,
        }
    }

    /// Write one stage, if it has an image
    pub fn record(&mut self, stage: &Stage<'_>) {
        if self.error.is_some() {
            return;
        }
        let start = Instant::now();
        let written = match stage {
            Stage::Smoothed(gray) => save_gray(gray, output_path(&self.base, "_gaussian")),
            Stage::Binarized(binary) => save_binary(binary, output_path(&self.base, "_binary")),
            Stage::Pass { index, image, .. } => {
                save_binary(image, output_path(&self.base, &format!("_erode{}", index)))
            }
            Stage::Threshold(_) => return,
        };
        self.io_time += start.elapsed();
        if let Err(err) = written {
            self.error = Some(err);
        }
    }

    /// Time spent writing so far
    pub fn io_time(&self) -> Duration {
        self.io_time
    }

    /// Total write time, or the first write error
    pub fn finish(self) -> Result<Duration> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.io_time),
        }
    }
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary image.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of white pixels.
    pub white_pixels: usize,
    /// Total pixels in the image.
    pub total_pixels: usize,
    /// Ratio of white pixels to total pixels.
    pub white_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &GrayImage) -> GrayStats {
    let pixels = gray.as_slice();
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in pixels {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    if pixels.is_empty() {
        return GrayStats {
            min: 0,
            max: 0,
            avg: 0,
        };
    }
    let avg = (sum / pixels.len() as u64) as u8;
    GrayStats { min, max, avg }
}

/// Compute white pixel stats for a binary image.
pub fn binary_stats(binary: &BinaryImage) -> BinaryStats {
    let white = binary.count_white();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        white as f64 / total as f64
    };
    BinaryStats {
        white_pixels: white,
        total_pixels: total,
        white_ratio: ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RED;

    #[test]
    fn output_path_inserts_suffix_before_extension() {
        assert_eq!(output_path("out.bmp", "_binary"), PathBuf::from("out_binary.bmp"));
        assert_eq!(
            output_path("runs/a/out.bmp", "_erode3"),
            PathBuf::from("runs/a/out_erode3.bmp")
        );
        assert_eq!(output_path("out", "_gaussian"), PathBuf::from("out_gaussian"));
    }

    #[test]
    fn save_then_load_keeps_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.bmp");

        let mut image = ColorImage::default();
        image.set(0, 0, RED);
        image.set(949, 949, [10, 20, 30]);
        save_rgb(&image, &path).unwrap();

        let loaded = load_rgb(&path).unwrap();
        assert_eq!(loaded.dimensions(), (IMAGE_WIDTH, IMAGE_HEIGHT));
        assert_eq!(loaded.get(0, 0), RED);
        assert_eq!(loaded.get(949, 949), [10, 20, 30]);
        assert_eq!(loaded, image);
    }

    #[test]
    fn load_rejects_other_extents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.bmp");
        save_rgb(&ColorImage::new(10, 12), &path).unwrap();

        match load_rgb(&path) {
            Err(CellScanError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, (950, 950));
                assert_eq!(actual, (10, 12));
            }
            other => panic!("expected a size mismatch, got {other:?}"),
        }
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_rgb(dir.path().join("missing.bmp")).is_err());
    }

    #[test]
    fn stage_dumps_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut binary = BinaryImage::new(16, 16);
        binary.set(3, 4, true);
        let path = dir.path().join("stage_binary.bmp");
        save_binary(&binary, &path).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.get_pixel(3, 4).0, [255, 255, 255]);
        assert_eq!(reloaded.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn dumper_writes_each_stage_and_times_it() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out.bmp");
        let gray = GrayImage::filled(8, 8, 90);
        let mut binary = BinaryImage::new(8, 8);
        binary.set(2, 2, true);

        let mut dumper = StageDumper::new(&base);
        assert_eq!(dumper.io_time(), Duration::ZERO);
        dumper.record(&Stage::Smoothed(&gray));
        dumper.record(&Stage::Threshold(42));
        dumper.record(&Stage::Binarized(&binary));
        let after_binary = dumper.io_time();
        assert!(after_binary > Duration::ZERO);
        dumper.record(&Stage::Pass {
            index: 0,
            image: &binary,
            eroded: 1,
            detected: 0,
        });
        assert!(dumper.io_time() >= after_binary);
        let total = dumper.finish().unwrap();
        assert!(total >= after_binary);

        for name in ["out_gaussian.bmp", "out_binary.bmp", "out_erode0.bmp"] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
        let eroded = image::open(dir.path().join("out_erode0.bmp")).unwrap().to_rgb8();
        assert_eq!(eroded.get_pixel(2, 2).0, [255, 255, 255]);
    }

    #[test]
    fn dumper_reports_the_first_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing").join("out.bmp");
        let binary = BinaryImage::new(4, 4);

        let mut dumper = StageDumper::new(&base);
        dumper.record(&Stage::Binarized(&binary));
        dumper.record(&Stage::Pass {
            index: 0,
            image: &binary,
            eroded: 0,
            detected: 0,
        });
        assert!(dumper.finish().is_err());
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn stats_summarise_buffers() {
        let gray = GrayImage::from_raw(4, 1, vec![0, 10, 20, 250]).unwrap();
        let stats = grayscale_stats(&gray);
        assert_eq!((stats.min, stats.max, stats.avg), (0, 250, 70));

        let mut binary = BinaryImage::new(4, 4);
        binary.set(1, 1, true);
        binary.set(2, 3, true);
        let stats = binary_stats(&binary);
        assert_eq!(stats.white_pixels, 2);
        assert_eq!(stats.total_pixels, 16);
        assert!((stats.white_ratio - 0.125).abs() < 1e-9);
    }
}
