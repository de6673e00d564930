// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Wandelwerk conversion toolbox.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a file in a tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An input file supplied by the user.
///
/// Source files are immutable: every transform reads the bytes and produces a
/// new [`ResultFile`]; nothing ever writes back into a source buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: FileId,
    pub name: String,
    /// MIME type, e.g. `image/jpeg` or `application/pdf`.
    pub mime: String,
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: FileId::new(),
            name: name.into(),
            mime: mime.into(),
            data,
        }
    }

    /// Size of the file contents in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }
}

/// A derived output file. Always a freshly constructed buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

impl ResultFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A result file together with the size metadata shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub file: ResultFile,
    pub original_size: u64,
    pub converted_size: u64,
}

impl ConversionOutcome {
    pub fn new(file: ResultFile, original_size: u64) -> Self {
        let converted_size = file.size();
        Self {
            file,
            original_size,
            converted_size,
        }
    }

    /// Size reduction as a rounded percentage of the original.
    ///
    /// Negative when the conversion grew the file; reported as-is.
    pub fn reduction_percent(&self) -> i32 {
        if self.original_size == 0 {
            return 0;
        }
        let saved = self.original_size as f64 - self.converted_size as f64;
        (saved / self.original_size as f64 * 100.0).round() as i32
    }
}

/// PDF compression preset tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionLevel {
    Low,
    Medium,
    High,
}

impl CompressionLevel {
    /// Nominal reduction shown in the UI before compressing.
    ///
    /// These are static display hints; the achieved ratio depends entirely on
    /// the document and is never computed from them.
    pub fn estimated_reduction_percent(&self) -> u8 {
        match self {
            Self::Low => 10,
            Self::Medium => 30,
            Self::High => 50,
        }
    }
}

/// Target formats for image conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Avif,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
        }
    }

    /// Extension used when renaming converted files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    /// Whether the format takes a quality parameter.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, Self::Png)
    }

    /// Map a MIME type onto a known format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            "image/avif" => Some(Self::Avif),
            _ => None,
        }
    }
}

/// Output page sizes for image-to-PDF assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    /// Page dimensions in PDF points (width, height), portrait.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            Self::A4 => (595.0, 842.0),
            Self::Letter => (612.0, 792.0),
        }
    }
}

/// Page orientation; landscape swaps the page dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// How an image is placed on its PDF page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagePlacement {
    /// Aspect-preserving scale to the page, centered.
    Fit,
    /// Stretch to the page size, aspect ignored.
    Fill,
    /// Native size (1 px = 1 pt), centered, no scaling.
    Center,
}

/// Accepted page rotation angles.
///
/// 360 is a valid input and a semantic no-op; it receives no special
/// treatment anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationAngle {
    Deg90,
    Deg180,
    Deg270,
    Deg360,
}

impl RotationAngle {
    pub fn degrees(&self) -> i64 {
        match self {
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
            Self::Deg360 => 360,
        }
    }

    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            360 => Some(Self::Deg360),
            _ => None,
        }
    }
}

/// An inclusive, 1-indexed page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Clamp both bounds into `[1, page_count]`.
    ///
    /// A range that is empty after clamping (start > end) stays empty; the
    /// caller emits no pages for it.
    pub fn clamped(&self, page_count: u32) -> (u32, u32) {
        let start = self.start.clamp(1, page_count.max(1));
        let end = self.end.clamp(1, page_count.max(1));
        (start, end)
    }
}

/// Which pages a split produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitMode {
    /// One single-page document per source page.
    All,
    /// Single-page documents for an inclusive page range only.
    Range(PageRange),
}

/// Lifecycle states of a tool session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolStatus {
    /// Nothing selected yet.
    Idle,
    /// Files selected, ready to process.
    Selected,
    /// A transform is running; no further triggers accepted.
    Processing,
    /// Finished successfully — results available.
    Completed,
    /// The transform failed — see the session's error message.
    Failed,
}

/// Human-readable file size, e.g. `1.37 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_percent_rounds() {
        let outcome = ConversionOutcome {
            file: ResultFile::new("a.jpg", "image/jpeg", vec![0; 25]),
            original_size: 100,
            converted_size: 25,
        };
        assert_eq!(outcome.reduction_percent(), 75);
    }

    #[test]
    fn reduction_percent_negative_when_grown() {
        let outcome = ConversionOutcome {
            file: ResultFile::new("a.png", "image/png", vec![0; 150]),
            original_size: 100,
            converted_size: 150,
        };
        assert_eq!(outcome.reduction_percent(), -50);
    }

    #[test]
    fn page_sizes_in_points() {
        assert_eq!(PageSize::A4.dimensions_pt(), (595.0, 842.0));
        assert_eq!(PageSize::Letter.dimensions_pt(), (612.0, 792.0));
    }

    #[test]
    fn estimated_reductions_are_static_hints() {
        assert_eq!(CompressionLevel::Low.estimated_reduction_percent(), 10);
        assert_eq!(CompressionLevel::Medium.estimated_reduction_percent(), 30);
        assert_eq!(CompressionLevel::High.estimated_reduction_percent(), 50);
    }

    #[test]
    fn jpeg_extension_is_jpg() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn png_is_not_lossy() {
        assert!(!ImageFormat::Png.is_lossy());
        assert!(ImageFormat::WebP.is_lossy());
    }

    #[test]
    fn rotation_from_degrees() {
        assert_eq!(RotationAngle::from_degrees(270), Some(RotationAngle::Deg270));
        assert_eq!(RotationAngle::from_degrees(45), None);
        assert_eq!(RotationAngle::Deg360.degrees(), 360);
    }

    #[test]
    fn page_range_clamps_to_document() {
        let range = PageRange { start: 0, end: 99 };
        assert_eq!(range.clamped(5), (1, 5));

        let inside = PageRange { start: 2, end: 3 };
        assert_eq!(inside.clamped(5), (2, 3));
    }

    #[test]
    fn stem_strips_final_extension_only() {
        let file = SourceFile::new("archive.tar.pdf", "application/pdf", vec![]);
        assert_eq!(file.stem(), "archive.tar");

        let bare = SourceFile::new("README", "text/plain", vec![]);
        assert_eq!(bare.stem(), "README");
    }

    #[test]
    fn file_sizes_format() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
    }
}
