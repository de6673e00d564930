// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CLI surface — maps subcommands onto tool sessions and the document crate.
//
// Every command follows the same shape as the interactive tools it stands in
// for: read the inputs, filter them through validation (rejects are logged,
// not surfaced), drive a ToolSession through select → begin →
// complete/fail, then write the results — directly for a single file, as a
// ZIP archive for several.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{error, info};

use wandelwerk_core::config::AppConfig;
use wandelwerk_core::session::ToolSession;
use wandelwerk_core::types::{
    CompressionLevel, ConversionOutcome, ImageFormat, ImagePlacement, PageOrientation, PageRange,
    PageSize, ResultFile, RotationAngle, SourceFile, SplitMode, format_file_size,
};
use wandelwerk_core::validate;
use wandelwerk_document::image::inpaint::WatermarkTool;
use wandelwerk_document::pdf::assemble::AssembleOptions;
use wandelwerk_document::pdf::render::RenderOptions;
use wandelwerk_document::{
    PdfPages, assemble_images, compress_document, compress_image, convert_format, merge_documents,
    package_results, render_pages, run_sequential,
};

/// Local file-conversion toolbox: images, PDFs, and watermark retouching.
/// All processing happens on this machine; nothing is uploaded anywhere.
#[derive(Parser, Debug)]
#[command(
    name = "wandelwerk",
    version,
    about = "Local file-conversion toolbox: images, PDFs, and watermark retouching",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Directory to write results into.
    #[arg(short, long, default_value = ".", global = true)]
    out: PathBuf,

    /// Maximum accepted file size in megabytes.
    #[arg(long, default_value_t = 50, global = true)]
    max_file_size_mb: u32,

    /// Maximum number of files accepted per selection.
    #[arg(long, default_value_t = 10, global = true)]
    max_files: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress images in batch, one at a time.
    CompressImage {
        files: Vec<PathBuf>,
        /// Quality, 1–100.
        #[arg(short, long, default_value_t = 80)]
        quality: u8,
    },

    /// Convert an image to another format.
    ConvertImage {
        file: PathBuf,
        /// Target format.
        #[arg(short, long, value_enum)]
        format: FormatArg,
        /// Quality for lossy targets, 1–100.
        #[arg(short, long, default_value_t = 80)]
        quality: u8,
    },

    /// Remove a watermark using a painted stroke mask.
    RemoveWatermark {
        image: PathBuf,
        /// JSON file with brush strokes: [{"x": 120, "y": 48}, ...]
        #[arg(long)]
        strokes: PathBuf,
        /// Brush radius in pixels, 10–50.
        #[arg(long, default_value_t = 20)]
        brush_radius: u32,
    },

    /// PDF operations.
    #[command(subcommand)]
    Pdf(PdfCommand),
}

#[derive(Subcommand, Debug)]
enum PdfCommand {
    /// Merge two or more PDFs, pages in input order.
    Merge { files: Vec<PathBuf> },

    /// Split a PDF into single-page documents.
    Split {
        file: PathBuf,
        /// Inclusive 1-indexed page range, e.g. 2:5. Omit to split every page.
        #[arg(long)]
        range: Option<String>,
    },

    /// Set an absolute rotation on every page.
    Rotate {
        file: PathBuf,
        /// Rotation in degrees: 90, 180, 270, or 360.
        #[arg(long)]
        angle: u32,
    },

    /// Re-serialise a PDF with a compression preset.
    Compress {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "medium")]
        level: LevelArg,
    },

    /// Rasterise pages into JPEG images.
    ToImages {
        file: PathBuf,
        /// Output resolution: 72, 150, or 300.
        #[arg(long, default_value_t = 72)]
        dpi: u32,
        /// Comma-separated 1-indexed pages, e.g. 1,3,5. Omit for all pages.
        #[arg(long)]
        pages: Option<String>,
    },

    /// Assemble JPEG/PNG images into a PDF, one page per image.
    FromImages {
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "a4")]
        page_size: PageSizeArg,
        #[arg(long, value_enum, default_value = "portrait")]
        orientation: OrientationArg,
        #[arg(long, value_enum, default_value = "fit")]
        placement: PlacementArg,
    },
}

// -- clap value enums ---------------------------------------------------------

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Jpeg,
    Png,
    Webp,
    Avif,
}

impl From<FormatArg> for ImageFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Png => Self::Png,
            FormatArg::Webp => Self::WebP,
            FormatArg::Avif => Self::Avif,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Low,
    Medium,
    High,
}

impl From<LevelArg> for CompressionLevel {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::Low => Self::Low,
            LevelArg::Medium => Self::Medium,
            LevelArg::High => Self::High,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(value: PageSizeArg) -> Self {
        match value {
            PageSizeArg::A4 => Self::A4,
            PageSizeArg::Letter => Self::Letter,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for PageOrientation {
    fn from(value: OrientationArg) -> Self {
        match value {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlacementArg {
    Fit,
    Fill,
    Center,
}

impl From<PlacementArg> for ImagePlacement {
    fn from(value: PlacementArg) -> Self {
        match value {
            PlacementArg::Fit => Self::Fit,
            PlacementArg::Fill => Self::Fill,
            PlacementArg::Center => Self::Center,
        }
    }
}

/// One painted brush position in a strokes manifest.
#[derive(Debug, Deserialize)]
struct StrokePoint {
    x: i32,
    y: i32,
}

// -- Dispatch -----------------------------------------------------------------

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig {
        max_file_size_mb: cli.max_file_size_mb,
        max_select_count: cli.max_files,
        ..AppConfig::default()
    };
    let out = cli.out;

    match cli.command {
        Command::CompressImage { files, quality } => {
            run_compress_images(&out, &config, &files, quality)
        }
        Command::ConvertImage {
            file,
            format,
            quality,
        } => run_convert_image(&out, &config, &file, format.into(), quality),
        Command::RemoveWatermark {
            image,
            strokes,
            brush_radius,
        } => run_remove_watermark(&out, &config, &image, &strokes, brush_radius),
        Command::Pdf(pdf) => match pdf {
            PdfCommand::Merge { files } => run_merge(&out, &config, &files),
            PdfCommand::Split { file, range } => run_split(&out, &config, &file, range.as_deref()),
            PdfCommand::Rotate { file, angle } => run_rotate(&out, &config, &file, angle),
            PdfCommand::Compress { file, level } => {
                run_pdf_compress(&out, &config, &file, level.into())
            }
            PdfCommand::ToImages { file, dpi, pages } => {
                run_to_images(&out, &config, &file, dpi, pages.as_deref())
            }
            PdfCommand::FromImages {
                files,
                page_size,
                orientation,
                placement,
            } => {
                let options = AssembleOptions {
                    page_size: page_size.into(),
                    orientation: orientation.into(),
                    placement: placement.into(),
                };
                run_from_images(&out, &config, &files, &options)
            }
        },
    }
}

// -- Commands -----------------------------------------------------------------

fn run_compress_images(
    out: &Path,
    config: &AppConfig,
    paths: &[PathBuf],
    quality: u8,
) -> Result<()> {
    let sources = read_sources(paths)?;
    let accepted = validate::filter_selection(sources, config, &["image/"]);

    let mut session: ToolSession<ConversionOutcome> = ToolSession::new();
    session.select(accepted)?;
    if session.selection().is_empty() {
        bail!("No valid images selected.");
    }
    session.begin()?;

    let files = session.selection().to_vec();
    let bar = progress_bar();
    let report = run_sequential(
        &files,
        |file| compress_image(file, quality),
        |pct| bar.set_position(pct as u64),
    );
    bar.finish_and_clear();

    for item in &report.items {
        match &item.outcome {
            Ok(outcome) => println!(
                "✔ {}  {} → {}  ({}%)",
                item.name,
                format_file_size(outcome.original_size),
                format_file_size(outcome.converted_size),
                outcome.reduction_percent(),
            ),
            Err(message) => println!("✗ {}  {}", item.name, message),
        }
    }

    let outcomes: Vec<ConversionOutcome> = report.succeeded().cloned().collect();
    if outcomes.is_empty() {
        session.fail("Failed to compress images. Please try again.");
        bail!("Failed to compress images. Please try again.");
    }
    session.complete(outcomes.clone())?;

    let results = outcomes.into_iter().map(|o| o.file).collect();
    deliver(out, results, "compressed_images.zip")
}

fn run_convert_image(
    out: &Path,
    config: &AppConfig,
    path: &Path,
    format: ImageFormat,
    quality: u8,
) -> Result<()> {
    let accepted = validate::filter_selection(vec![read_source(path)?], config, &["image/"]);

    let results = drive_session(accepted, 1, "No valid image selected.", "convert image", |files| {
        convert_format(&files[0], format, quality).map(|file| vec![file])
    })?;

    deliver(out, results, "converted_images.zip")
}

fn run_remove_watermark(
    out: &Path,
    config: &AppConfig,
    image: &Path,
    strokes: &Path,
    brush_radius: u32,
) -> Result<()> {
    let accepted = validate::filter_selection(
        vec![read_source(image)?],
        config,
        &["image/jpeg", "image/png", "image/webp"],
    );

    let manifest = fs::read(strokes)
        .with_context(|| format!("cannot read strokes file {}", strokes.display()))?;
    let points: Vec<StrokePoint> =
        serde_json::from_slice(&manifest).context("strokes file must be a JSON array of points")?;

    let results = drive_session(
        accepted,
        1,
        "No valid image selected.",
        "remove watermark",
        |files| {
            let mut tool = WatermarkTool::new(files[0].clone())?;
            tool.set_brush_radius(brush_radius);
            for point in &points {
                tool.paint(point.x, point.y);
            }
            info!(
                strokes = points.len(),
                marked = tool.mask().marked_count(),
                "mask painted"
            );
            tool.apply().map(|file| vec![file])
        },
    )?;

    deliver(out, results, "watermark_removed.zip")
}

fn run_merge(out: &Path, config: &AppConfig, paths: &[PathBuf]) -> Result<()> {
    let accepted = validate::filter_selection(read_sources(paths)?, config, &["application/pdf"]);

    let results = drive_session(
        accepted,
        2,
        "Please select at least 2 PDF files to merge.",
        "merge PDFs",
        |files| {
            let inputs: Vec<&[u8]> = files.iter().map(|f| f.data.as_slice()).collect();
            let merged = merge_documents(&inputs)?;
            Ok(vec![ResultFile::new("merged.pdf", "application/pdf", merged)])
        },
    )?;

    deliver(out, results, "merged.zip")
}

fn run_split(out: &Path, config: &AppConfig, path: &Path, range: Option<&str>) -> Result<()> {
    let accepted =
        validate::filter_selection(vec![read_source(path)?], config, &["application/pdf"]);

    let mode = match range {
        Some(text) => SplitMode::Range(parse_range(text)?),
        None => SplitMode::All,
    };

    let results = drive_session(accepted, 1, "No valid PDF selected.", "split PDF", |files| {
        PdfPages::from_bytes(&files[0].data)?.split(mode)
    })?;

    if results.is_empty() {
        bail!("The requested range contains no pages.");
    }
    deliver(out, results, "split_pages.zip")
}

fn run_rotate(out: &Path, config: &AppConfig, path: &Path, angle: u32) -> Result<()> {
    let Some(angle) = RotationAngle::from_degrees(angle) else {
        bail!("Rotation must be 90, 180, 270, or 360 degrees.");
    };

    let accepted =
        validate::filter_selection(vec![read_source(path)?], config, &["application/pdf"]);

    let results = drive_session(accepted, 1, "No valid PDF selected.", "rotate PDF", |files| {
        let rotated = PdfPages::from_bytes(&files[0].data)?.rotate(angle)?;
        Ok(vec![ResultFile::new(
            format!("rotated_{}", files[0].name),
            "application/pdf",
            rotated,
        )])
    })?;

    deliver(out, results, "rotated.zip")
}

fn run_pdf_compress(
    out: &Path,
    config: &AppConfig,
    path: &Path,
    level: CompressionLevel,
) -> Result<()> {
    let accepted =
        validate::filter_selection(vec![read_source(path)?], config, &["application/pdf"]);

    println!(
        "Estimated reduction: ~{}%",
        level.estimated_reduction_percent()
    );

    let results = drive_session(accepted, 1, "No valid PDF selected.", "compress PDF", |files| {
        let outcome = compress_document(&files[0], level)?;
        println!(
            "✔ {}  {} → {}  ({}%)",
            outcome.file.name,
            format_file_size(outcome.original_size),
            format_file_size(outcome.converted_size),
            outcome.reduction_percent(),
        );
        Ok(vec![outcome.file])
    })?;

    deliver(out, results, "compressed.zip")
}

fn run_to_images(
    out: &Path,
    config: &AppConfig,
    path: &Path,
    dpi: u32,
    pages: Option<&str>,
) -> Result<()> {
    if ![72, 150, 300].contains(&dpi) {
        bail!("DPI must be 72, 150, or 300.");
    }

    let accepted =
        validate::filter_selection(vec![read_source(path)?], config, &["application/pdf"]);

    let options = RenderOptions {
        dpi,
        pages: match pages {
            Some(text) => Some(parse_pages(text)?),
            None => None,
        },
    };

    let results = drive_session(
        accepted,
        1,
        "No valid PDF selected.",
        "convert PDF",
        |files| render_pages(&files[0].data, &options),
    )?;

    deliver(out, results, "pdf_pages.zip")
}

fn run_from_images(
    out: &Path,
    config: &AppConfig,
    paths: &[PathBuf],
    options: &AssembleOptions,
) -> Result<()> {
    let accepted = validate::filter_selection(read_sources(paths)?, config, &["image/"]);

    let results = drive_session(
        accepted,
        1,
        "No valid images selected.",
        "create PDF",
        |files| {
            let pdf = assemble_images(files, options)?;
            Ok(vec![ResultFile::new("converted.pdf", "application/pdf", pdf)])
        },
    )?;

    deliver(out, results, "converted.zip")
}

// -- Session plumbing ---------------------------------------------------------

/// Drive one tool session through its lifecycle around a single transform.
///
/// Transform failures produce the tool's generic user-facing message; the
/// underlying error is logged only.
fn drive_session<R, F>(
    accepted: Vec<SourceFile>,
    min_files: usize,
    too_few_message: &str,
    what: &str,
    op: F,
) -> Result<Vec<R>>
where
    R: Clone,
    F: FnOnce(&[SourceFile]) -> wandelwerk_core::error::Result<Vec<R>>,
{
    let mut session: ToolSession<R> = ToolSession::new();
    session.select(accepted)?;
    if session.selection().len() < min_files {
        bail!("{too_few_message}");
    }
    session.begin()?;

    let files = session.selection().to_vec();
    match op(&files) {
        Ok(results) => {
            session.complete(results.clone())?;
            Ok(results)
        }
        Err(err) => {
            error!(%err, "{what} failed");
            let message = format!("Failed to {what}. Please try again.");
            session.fail(message.clone());
            bail!("{message}");
        }
    }
}

// -- I/O helpers --------------------------------------------------------------

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn read_source(path: &Path) -> Result<SourceFile> {
    let data = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("file")
        .to_string();
    Ok(SourceFile::new(name, mime_for_path(path), data))
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths.iter().map(|path| read_source(path)).collect()
}

/// Write the results: one file directly, several as a ZIP archive.
fn deliver(out: &Path, results: Vec<ResultFile>, archive_name: &str) -> Result<()> {
    let packaged = package_results(results, archive_name)?;
    fs::create_dir_all(out)
        .with_context(|| format!("cannot create output directory {}", out.display()))?;

    let path = out.join(&packaged.name);
    fs::write(&path, &packaged.data)
        .with_context(|| format!("cannot write {}", path.display()))?;

    println!("→ {}  ({})", path.display(), format_file_size(packaged.size()));
    Ok(())
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40.green/238}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    bar
}

// -- Option parsing -----------------------------------------------------------

fn parse_range(text: &str) -> Result<PageRange> {
    let (start, end) = text
        .split_once(':')
        .or_else(|| text.split_once('-'))
        .context("range must look like START:END, e.g. 2:5")?;

    Ok(PageRange {
        start: start
            .trim()
            .parse()
            .with_context(|| format!("invalid range start {start:?}"))?,
        end: end
            .trim()
            .parse()
            .with_context(|| format!("invalid range end {end:?}"))?,
    })
}

fn parse_pages(text: &str) -> Result<Vec<u32>> {
    text.split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .with_context(|| format!("invalid page number {part:?}"))
        })
        .collect()
}
