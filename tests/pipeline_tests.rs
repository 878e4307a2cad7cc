//! End-to-end checks on full-size synthetic slides
//!
//! Every image here is built in memory at the fixed 950x950 extent: a dark
//! field with bright discs at known centres. The tests cover the stage
//! properties the detectors rely on and the counts the whole pipeline
//! produces.

use cell_scan::detector::erosion::erode;
use cell_scan::detector::exact::detect_blobs_exact;
use cell_scan::detector::quick::detect_blobs_quick;
use cell_scan::tools::{load_rgb, save_rgb};
use cell_scan::utils::binarization::{binarize, otsu_threshold};
use cell_scan::utils::convolution::{gaussian_blur_5x5, sharpen};
use cell_scan::utils::grayscale::rgb_to_grayscale;
use cell_scan::{
    BinaryImage, CellLedger, CellPoint, CellScanner, ColorImage, DetectionStrategy,
    DuplicatePolicy, GrayImage, IMAGE_HEIGHT, IMAGE_WIDTH, OutOfBounds, PipelineConfig,
    render_markers,
};

const DISC_RADIUS: usize = 3;
const PITCH: usize = 40;

fn disc_centres() -> Vec<(usize, usize)> {
    let mut centres = Vec::new();
    for cy in (30..IMAGE_HEIGHT - 30).step_by(PITCH) {
        for cx in (30..IMAGE_WIDTH - 30).step_by(PITCH) {
            centres.push((cx, cy));
        }
    }
    centres
}

fn synthetic_slide(centres: &[(usize, usize)]) -> ColorImage {
    let mut image = ColorImage::default();
    let r = DISC_RADIUS;
    for &(cx, cy) in centres {
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                let (dx, dy) = (x.abs_diff(cx), y.abs_diff(cy));
                if dx * dx + dy * dy <= r * r {
                    image.set(x, y, [200, 230, 215]);
                }
            }
        }
    }
    image
}

fn assert_cells_near_centres(cells: &CellLedger, centres: &[(usize, usize)], tolerance: usize) {
    for cell in cells {
        let nearest = centres
            .iter()
            .map(|&c| cell.chebyshev_distance(&CellPoint::from(c)))
            .min()
            .unwrap();
        assert!(nearest <= tolerance, "{cell:?} is {nearest} px from any disc");
    }
}

fn unblurred(strategy: DetectionStrategy) -> PipelineConfig {
    PipelineConfig {
        blur_passes: 0,
        strategy,
        ..PipelineConfig::default()
    }
}

#[test]
fn quick_pipeline_finds_every_disc() {
    let centres = disc_centres();
    let image = synthetic_slide(&centres);
    let report = CellScanner::new(unblurred(DetectionStrategy::Quick))
        .scan(&image)
        .unwrap();
    assert_eq!(report.cells.len(), centres.len());
    assert_cells_near_centres(&report.cells, &centres, 6);
}

#[test]
fn exact_pipeline_finds_every_disc() {
    let centres = disc_centres();
    let image = synthetic_slide(&centres);
    let report = CellScanner::new(unblurred(DetectionStrategy::exact()))
        .scan(&image)
        .unwrap();
    assert_eq!(report.cells.len(), centres.len());
    assert_cells_near_centres(&report.cells, &centres, 6);
}

#[test]
fn default_pipeline_with_smoothing_finds_every_disc() {
    let centres = disc_centres();
    let image = synthetic_slide(&centres);
    let report = CellScanner::default().scan(&image).unwrap();
    assert!(report.threshold > 0);
    assert_eq!(report.cells.len(), centres.len());
    assert_cells_near_centres(&report.cells, &centres, 6);
}

#[test]
fn suppression_never_adds_cells() {
    let centres = disc_centres();
    let image = synthetic_slide(&centres);
    let keep = CellScanner::default().scan(&image).unwrap();
    let suppress = CellScanner::new(PipelineConfig {
        duplicates: DuplicatePolicy::SuppressWithin(8),
        ..PipelineConfig::default()
    })
    .scan(&image)
    .unwrap();
    assert!(suppress.cells.len() <= keep.cells.len());
    assert!(!suppress.cells.is_empty());
}

#[test]
fn annotated_slide_survives_a_bitmap_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("slide.bmp");
    let output = dir.path().join("slide_marked.bmp");
    let centres = vec![(100, 100), (400, 300), (800, 850)];
    save_rgb(&synthetic_slide(&centres), &input).unwrap();

    let mut image = load_rgb(&input).unwrap();
    let count = cell_scan::annotate_cells(&mut image).unwrap();
    assert_eq!(count, centres.len());
    save_rgb(&image, &output).unwrap();

    let marked = load_rgb(&output).unwrap();
    let cells = cell_scan::detect_cells(&synthetic_slide(&centres)).unwrap();
    for cell in &cells {
        assert_eq!(marked.get(cell.x, cell.y), [255, 0, 0]);
    }
}

#[test]
fn grayscale_is_the_floored_channel_mean() {
    let mut image = ColorImage::default();
    image.set(5, 5, [10, 20, 31]);
    image.set(6, 5, [255, 255, 254]);
    let gray = rgb_to_grayscale(&image);
    assert_eq!(gray.get(5, 5), 20);
    assert_eq!(gray.get(6, 5), 254);
    assert_eq!(gray.get(0, 0), 0);
}

#[test]
fn uniform_field_is_a_convolution_fixed_point() {
    let mut gray = GrayImage::filled(IMAGE_WIDTH, IMAGE_HEIGHT, 100);
    gaussian_blur_5x5(&mut gray);
    sharpen(&mut gray);
    assert!(gray.as_slice().iter().all(|&v| v == 100));
}

#[test]
fn otsu_separates_a_bimodal_slide() {
    let mut gray = GrayImage::filled(IMAGE_WIDTH, IMAGE_HEIGHT, 10);
    for y in 0..IMAGE_HEIGHT / 2 {
        for x in 0..IMAGE_WIDTH {
            gray.set(x, y, 200);
        }
    }
    let threshold = otsu_threshold(&gray);
    assert!((10..200).contains(&threshold));
    let binary = binarize(&gray, threshold);
    assert!(binary.get(0, 0));
    assert!(!binary.get(0, IMAGE_HEIGHT - 1));
    assert_eq!(binary.count_white(), IMAGE_WIDTH * (IMAGE_HEIGHT / 2));
}

#[test]
fn erosion_border_policies_on_a_white_slide() {
    let white = BinaryImage::white(IMAGE_WIDTH, IMAGE_HEIGHT);

    let (skipped, changed) = erode(&white, OutOfBounds::Skip);
    assert_eq!(changed, 0);
    assert_eq!(skipped, white);

    let (peeled, changed) = erode(&white, OutOfBounds::Black);
    assert_eq!(changed, 2 * IMAGE_WIDTH + 2 * IMAGE_HEIGHT - 4);
    assert!(!peeled.get(0, 500));
    assert!(peeled.get(1, 500));
}

#[test]
fn erosion_of_an_eroded_slide_reaches_a_fixed_point() {
    let gray = rgb_to_grayscale(&synthetic_slide(&disc_centres()));
    let mut binary = binarize(&gray, otsu_threshold(&gray));
    let mut passes = 0;
    loop {
        let (next, changed) = erode(&binary, OutOfBounds::Skip);
        binary = next;
        if changed == 0 {
            break;
        }
        passes += 1;
        assert!(passes < 10);
    }
    assert_eq!(binary.count_white(), 0);
}

#[test]
fn exact_scan_reports_square_at_its_window() {
    let mut binary = BinaryImage::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    for y in 94..106 {
        for x in 94..106 {
            binary.set(x, y, true);
        }
    }
    let mut ledger = CellLedger::new();
    let found = detect_blobs_exact(&mut binary, 12, 1, &mut ledger).unwrap();
    assert_eq!(found, 1);
    assert_eq!(ledger.as_slice(), &[CellPoint::new(100, 100)]);
    assert_eq!(binary.count_white(), 0);
}

#[test]
fn quick_scan_reports_lone_dot() {
    let mut binary = BinaryImage::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    binary.set(50, 50, true);
    let mut ledger = CellLedger::new();
    assert_eq!(detect_blobs_quick(&mut binary, &mut ledger), 1);
    assert_eq!(ledger.as_slice(), &[CellPoint::new(50, 50)]);
    assert_eq!(binary.count_white(), 0);
}

#[test]
fn rendering_is_idempotent_on_a_full_slide() {
    let centres = disc_centres();
    let mut ledger = CellLedger::new();
    for &(x, y) in &centres {
        ledger.push(x, y);
    }
    ledger.push(0, 0);
    ledger.push(IMAGE_WIDTH - 1, IMAGE_HEIGHT - 1);

    let mut once = synthetic_slide(&centres);
    render_markers(&mut once, &ledger);
    let mut twice = once.clone();
    render_markers(&mut twice, &ledger);
    assert_eq!(once, twice);
    assert_eq!(once.get(IMAGE_WIDTH - 1, IMAGE_HEIGHT - 11), [255, 0, 0]);
}
