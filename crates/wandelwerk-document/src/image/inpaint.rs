// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watermark retouching — manual mask painting plus single-pass
// neighbour-average inpainting.
//
// The mask is a separate bitmap co-indexed with the raster. Marking never
// touches the image pixels, so source content (a naturally red logo, say)
// can never be mistaken for a brush stroke.

use image::{GrayImage, Luma, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use tracing::{debug, info, instrument};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::types::{ImageFormat, ResultFile, SourceFile};

use super::processor;

/// Smallest allowed brush radius in pixels.
pub const MIN_BRUSH_RADIUS: u32 = 10;
/// Largest allowed brush radius in pixels.
pub const MAX_BRUSH_RADIUS: u32 = 50;

/// Quality used when re-encoding the retouched image.
const OUTPUT_QUALITY: u8 = 92;

/// A paintable mask over an image, tracking which pixels are flagged for
/// removal.
#[derive(Debug, Clone)]
pub struct BrushMask {
    marked: GrayImage,
}

impl BrushMask {
    /// Create an empty mask for an image of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            marked: GrayImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.marked.dimensions()
    }

    /// Mark a filled disc of the given radius (clamped to the allowed brush
    /// range) centred on `(x, y)`. Parts of the disc outside the image are
    /// ignored.
    pub fn paint_stroke(&mut self, x: i32, y: i32, radius: u32) {
        let radius = radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS) as i32;
        draw_filled_circle_mut(&mut self.marked, (x, y), radius, Luma([255u8]));
    }

    /// Mark a single pixel. Out-of-bounds coordinates are ignored.
    pub fn mark(&mut self, x: u32, y: u32) {
        if x < self.marked.width() && y < self.marked.height() {
            self.marked.put_pixel(x, y, Luma([255u8]));
        }
    }

    /// Whether the pixel at `(x, y)` is flagged. Out-of-bounds is unmarked.
    pub fn is_marked(&self, x: u32, y: u32) -> bool {
        x < self.marked.width() && y < self.marked.height() && self.marked.get_pixel(x, y).0[0] > 0
    }

    /// Number of flagged pixels.
    pub fn marked_count(&self) -> usize {
        self.marked.pixels().filter(|pixel| pixel.0[0] > 0).count()
    }

    /// Unmark everything.
    pub fn clear(&mut self) {
        for pixel in self.marked.pixels_mut() {
            *pixel = Luma([0u8]);
        }
    }
}

/// Fill every masked pixel with the average of its unmasked neighbours.
///
/// Neighbours are sampled on a sparse 3×3 grid at offsets of ±`sample_radius`
/// in each axis (not a dense neighbourhood). Samples that fall outside the
/// image or on masked pixels are skipped; the replacement is the
/// integer-truncated per-channel mean of the survivors, alpha unchanged.
///
/// This is a single, non-iterative pass reading only source pixels: a masked
/// pixel whose sample points are all masked too is left unchanged, so the
/// interior of a large masked region may not fill completely.
#[instrument(skip(source, mask), fields(sample_radius))]
pub fn inpaint(source: &RgbaImage, mask: &BrushMask, sample_radius: u32) -> RgbaImage {
    let (width, height) = source.dimensions();
    let radius = sample_radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS) as i64;

    let mut output = source.clone();
    let mut filled = 0usize;
    let mut unfillable = 0usize;

    for y in 0..height {
        for x in 0..width {
            if !mask.is_marked(x, y) {
                continue;
            }

            let mut sums = [0u64; 3];
            let mut count = 0u64;

            for dy in [-radius, 0, radius] {
                for dx in [-radius, 0, radius] {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    if mask.is_marked(nx, ny) {
                        continue;
                    }

                    let pixel = source.get_pixel(nx, ny).0;
                    sums[0] += pixel[0] as u64;
                    sums[1] += pixel[1] as u64;
                    sums[2] += pixel[2] as u64;
                    count += 1;
                }
            }

            if count > 0 {
                let pixel = output.get_pixel_mut(x, y);
                pixel.0[0] = (sums[0] / count) as u8;
                pixel.0[1] = (sums[1] / count) as u8;
                pixel.0[2] = (sums[2] / count) as u8;
                filled += 1;
            } else {
                unfillable += 1;
            }
        }
    }

    debug!(filled, unfillable, "Inpainting pass complete");
    output
}

/// Interactive watermark-removal state for one image: the decoded raster, a
/// paintable mask, and the brush radius shared by painting and sampling.
pub struct WatermarkTool {
    source: SourceFile,
    image: RgbaImage,
    mask: BrushMask,
    brush_radius: u32,
}

impl WatermarkTool {
    /// Decode an image and prepare an empty mask for it.
    #[instrument(skip(file), fields(name = %file.name))]
    pub fn new(file: SourceFile) -> Result<Self> {
        let image = processor::decode(&file)?.to_rgba8();
        let (width, height) = image.dimensions();
        info!(width, height, "Watermark tool ready");

        Ok(Self {
            source: file,
            mask: BrushMask::new(width, height),
            image,
            brush_radius: 20,
        })
    }

    pub fn brush_radius(&self) -> u32 {
        self.brush_radius
    }

    /// Change the brush radius, clamped to the allowed range.
    pub fn set_brush_radius(&mut self, radius: u32) {
        self.brush_radius = radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS);
    }

    /// Paint one brush stroke at image coordinates.
    pub fn paint(&mut self, x: i32, y: i32) {
        self.mask.paint_stroke(x, y, self.brush_radius);
    }

    pub fn mask(&self) -> &BrushMask {
        &self.mask
    }

    /// Discard all strokes.
    pub fn reset(&mut self) {
        self.mask.clear();
    }

    /// Run the inpainting pass and re-encode in the source's own format as
    /// `watermark_removed_{name}`.
    #[instrument(skip(self))]
    pub fn apply(&self) -> Result<ResultFile> {
        let format = ImageFormat::from_mime(&self.source.mime).ok_or_else(|| {
            WandelwerkError::UnsupportedInput(format!(
                "cannot re-encode watermark output as {}",
                self.source.mime
            ))
        })?;

        let retouched = inpaint(&self.image, &self.mask, self.brush_radius);
        let data = processor::encode(
            &image::DynamicImage::ImageRgba8(retouched),
            format,
            OUTPUT_QUALITY,
        )?;

        Ok(ResultFile::new(
            format!("watermark_removed_{}", self.source.name),
            format.mime_type(),
            data,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn empty_mask_is_byte_for_byte_identity() {
        let source = gradient_image(40, 40);
        let mask = BrushMask::new(40, 40);

        let output = inpaint(&source, &mask, 10);
        assert_eq!(source.as_raw(), output.as_raw());
    }

    #[test]
    fn marked_pixel_gets_truncated_neighbour_mean() {
        let radius = 10u32;
        let mut source = RgbaImage::from_pixel(21, 21, Rgba([0, 0, 0, 255]));
        let center = (10u32, 10u32);

        // The sparse sample grid around the centre: eight points at ±radius.
        let sample_points = [
            (0u32, 0u32),
            (10, 0),
            (20, 0),
            (0, 10),
            (20, 10),
            (0, 20),
            (10, 20),
            (20, 20),
        ];
        // Five samples with red 10, three with red 15: mean 95/8 = 11.875,
        // truncated to 11.
        for (index, (x, y)) in sample_points.iter().enumerate() {
            let red = if index < 5 { 10 } else { 15 };
            source.put_pixel(*x, *y, Rgba([red, 40, 80, 255]));
        }

        let mut mask = BrushMask::new(21, 21);
        mask.mark(center.0, center.1);

        let output = inpaint(&source, &mask, radius);
        let pixel = output.get_pixel(center.0, center.1).0;

        assert_eq!(pixel[0], 11);
        assert_eq!(pixel[1], 40);
        assert_eq!(pixel[2], 80);
    }

    #[test]
    fn alpha_is_preserved_on_filled_pixels() {
        let mut source = RgbaImage::from_pixel(21, 21, Rgba([100, 100, 100, 255]));
        source.put_pixel(10, 10, Rgba([0, 0, 0, 7]));

        let mut mask = BrushMask::new(21, 21);
        mask.mark(10, 10);

        let output = inpaint(&source, &mask, 10);
        assert_eq!(output.get_pixel(10, 10).0[3], 7);
        assert_eq!(output.get_pixel(10, 10).0[0], 100);
    }

    #[test]
    fn pixel_with_no_valid_neighbours_is_left_unchanged() {
        // A 5x5 image with radius 10: every sample point is out of bounds
        // except the (marked) centre itself.
        let source = gradient_image(5, 5);
        let mut mask = BrushMask::new(5, 5);
        mask.mark(2, 2);

        let output = inpaint(&source, &mask, 10);
        assert_eq!(source.as_raw(), output.as_raw());
    }

    #[test]
    fn fully_masked_neighbourhood_stays_unfilled() {
        let source = gradient_image(41, 41);
        let mut mask = BrushMask::new(41, 41);
        // Mark everything: no sample point can be unmasked.
        for y in 0..41 {
            for x in 0..41 {
                mask.mark(x, y);
            }
        }

        let output = inpaint(&source, &mask, 10);
        assert_eq!(source.as_raw(), output.as_raw());
    }

    #[test]
    fn stroke_paints_a_disc_at_the_clamped_radius() {
        let mut mask = BrushMask::new(100, 100);
        mask.paint_stroke(50, 50, 10);

        assert!(mask.is_marked(50, 50));
        assert!(mask.is_marked(50, 41)); // distance 9
        assert!(mask.is_marked(41, 50));
        assert!(!mask.is_marked(50, 38)); // distance 12
        assert!(!mask.is_marked(0, 0));
    }

    #[test]
    fn brush_radius_clamps_to_allowed_range() {
        let mut mask = BrushMask::new(200, 200);
        // Requested 1, clamped up to 10.
        mask.paint_stroke(100, 100, 1);
        assert!(mask.is_marked(100, 92));

        let mut tool_mask = BrushMask::new(200, 200);
        // Requested 500, clamped down to 50.
        tool_mask.paint_stroke(100, 100, 500);
        assert!(tool_mask.is_marked(100, 52));
        assert!(!tool_mask.is_marked(100, 30));
    }

    #[test]
    fn clear_unmarks_everything() {
        let mut mask = BrushMask::new(64, 64);
        mask.paint_stroke(32, 32, 12);
        assert!(mask.marked_count() > 0);

        mask.clear();
        assert_eq!(mask.marked_count(), 0);
    }

    #[test]
    fn tool_round_trip_produces_named_result() {
        let img = gradient_image(60, 60);
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        let file = SourceFile::new("logo.png", "image/png", buffer);

        let mut tool = WatermarkTool::new(file).unwrap();
        tool.set_brush_radius(200);
        assert_eq!(tool.brush_radius(), MAX_BRUSH_RADIUS);
        tool.set_brush_radius(15);
        tool.paint(30, 30);
        assert!(tool.mask().marked_count() > 0);

        let result = tool.apply().unwrap();
        assert_eq!(result.name, "watermark_removed_logo.png");
        assert_eq!(result.mime, "image/png");
        assert!(image::load_from_memory(&result.data).is_ok());

        tool.reset();
        assert_eq!(tool.mask().marked_count(), 0);
    }
}
