use cell_scan::config::{BlurMode, DetectionOrder, DuplicatePolicy, PipelineConfig};
use cell_scan::detector::{DEFAULT_DETECTION_AREA, DEFAULT_EXCLUSION_FRAME, DetectionStrategy, OutOfBounds};
use cell_scan::pipeline::CellScanner;
use cell_scan::render::render_markers_with_style;
use cell_scan::tools::{StageDumper, binary_stats, grayscale_stats, load_rgb, save_rgb};
use cell_scan::utils::binarization::{binarize, otsu_threshold};
use cell_scan::utils::grayscale::rgb_to_grayscale;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "cellscan", version, about = "Cell detection on 950x950 bitmaps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Quick,
    Exact,
}

#[derive(Clone, Copy, ValueEnum)]
enum BlurArg {
    #[value(name = "3x3")]
    Small,
    #[value(name = "5x5")]
    Large,
}

#[derive(Subcommand)]
enum Command {
    /// Detect cells and write the input with a cross over each one
    Detect {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Side of the exact detector's area (even)
        #[arg(long)]
        area: Option<usize>,
        /// Frame rings around the exact detector's area
        #[arg(long)]
        frame: Option<usize>,
        /// Width of the frame blacked out after thresholding
        #[arg(long)]
        border: Option<usize>,
        #[arg(long)]
        blur_passes: Option<usize>,
        #[arg(long, value_enum)]
        blur: Option<BlurArg>,
        #[arg(long)]
        sharpen: bool,
        /// Drop detections this close to a cell from an earlier pass
        #[arg(long)]
        dedup_radius: Option<usize>,
        #[arg(long)]
        before_erosion: bool,
        /// Treat pixels outside the image as black during erosion
        #[arg(long)]
        black_border: bool,
        /// Also write the smoothed, binary and per-pass eroded images
        #[arg(long)]
        dump: bool,
    },
    /// Print grayscale/binary stats and the Otsu threshold for an image
    Stats { image: PathBuf },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Detect {
            input,
            output,
            strategy,
            area,
            frame,
            border,
            blur_passes,
            blur,
            sharpen,
            dedup_radius,
            before_erosion,
            black_border,
            dump,
        } => {
            let mut config = PipelineConfig::from_env();
            if let Some(strategy) = strategy {
                config.strategy = match strategy {
                    StrategyArg::Quick => DetectionStrategy::Quick,
                    StrategyArg::Exact => DetectionStrategy::exact(),
                };
            }
            if area.is_some() || frame.is_some() {
                let (cur_area, cur_frame) = match config.strategy {
                    DetectionStrategy::Exact {
                        detection_area_size,
                        exclusion_frame_thickness,
                    } => (detection_area_size, exclusion_frame_thickness),
                    DetectionStrategy::Quick => (DEFAULT_DETECTION_AREA, DEFAULT_EXCLUSION_FRAME),
                };
                config.strategy = DetectionStrategy::Exact {
                    detection_area_size: area.unwrap_or(cur_area),
                    exclusion_frame_thickness: frame.unwrap_or(cur_frame),
                };
            }
            if let Some(border) = border {
                config.border_width = border;
            }
            if let Some(passes) = blur_passes {
                config.blur_passes = passes;
            }
            if let Some(blur) = blur {
                config.blur = match blur {
                    BlurArg::Small => BlurMode::Gaussian3x3,
                    BlurArg::Large => BlurMode::Gaussian5x5,
                };
            }
            config.sharpen |= sharpen;
            if let Some(radius) = dedup_radius {
                config.duplicates = if radius == 0 {
                    DuplicatePolicy::Keep
                } else {
                    DuplicatePolicy::SuppressWithin(radius)
                };
            }
            if before_erosion {
                config.order = DetectionOrder::BeforeErosion;
            }
            if black_border {
                config.erosion_border = OutOfBounds::Black;
            }
            detect_cmd(&input, &output, config, dump)
        }
        Command::Stats { image } => stats_cmd(&image),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn detect_cmd(
    input: &Path,
    output: &Path,
    config: PipelineConfig,
    dump: bool,
) -> cell_scan::Result<()> {
    let mut image = load_rgb(input)?;
    let scanner = CellScanner::new(config);

    let start = Instant::now();
    let mut dumper = dump.then(|| StageDumper::new(output));
    let report = scanner.scan_with_observer(&image, |stage| {
        if let Some(dumper) = dumper.as_mut() {
            dumper.record(&stage);
        }
    })?;
    render_markers_with_style(&mut image, &report.cells, &scanner.config().marker);
    let elapsed = start.elapsed();
    let dump_time = match dumper {
        Some(dumper) => dumper.finish()?,
        None => Duration::ZERO,
    };

    save_rgb(&image, output)?;

    println!("Image: {} -> {}", input.display(), output.display());
    println!("Otsu threshold: {}", report.threshold);
    println!("Erosion passes: {}", report.passes);
    println!("Drew {} points", report.cells.len());
    if dump {
        println!(
            "Elapsed: {:.2?} (excluding {:.2?} writing stage dumps)",
            elapsed.saturating_sub(dump_time),
            dump_time
        );
    } else {
        println!("Elapsed: {:.2?}", elapsed);
    }
    Ok(())
}

fn stats_cmd(path: &Path) -> cell_scan::Result<()> {
    let image = load_rgb(path)?;
    let (width, height) = image.dimensions();
    println!("Image: {} ({}x{})", path.display(), width, height);

    let gray = rgb_to_grayscale(&image);
    let gray_stats = grayscale_stats(&gray);
    println!(
        "Grayscale range: {}-{}, average: {}",
        gray_stats.min, gray_stats.max, gray_stats.avg
    );

    let threshold = otsu_threshold(&gray);
    println!("Otsu threshold: {}", threshold);

    let binary = binarize(&gray, threshold);
    let stats = binary_stats(&binary);
    println!(
        "Binary: white_pixels={} total={} white_ratio={:.2}%",
        stats.white_pixels,
        stats.total_pixels,
        stats.white_ratio * 100.0
    );
    Ok(())
}
