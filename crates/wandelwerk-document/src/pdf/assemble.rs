// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-to-PDF assembly using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Each input image becomes one page; placement is
// computed in PDF points with the xobject pinned to 72 DPI so that one pixel
// equals one point before scaling.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use wandelwerk_core::error::Result;
use wandelwerk_core::types::{ImagePlacement, PageOrientation, PageSize, SourceFile};

/// Millimetres per PDF point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Page and placement settings for image-to-PDF assembly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssembleOptions {
    pub page_size: PageSize,
    pub orientation: PageOrientation,
    pub placement: ImagePlacement,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: PageOrientation::Portrait,
            placement: ImagePlacement::Fit,
        }
    }
}

/// Assemble an ordered list of images into a PDF, one page per image.
///
/// Only JPEG and PNG inputs are embedded; anything else (including bytes
/// that fail to decode) is silently skipped.
#[instrument(skip(images), fields(image_count = images.len(), options = ?options))]
pub fn assemble_images(images: &[SourceFile], options: &AssembleOptions) -> Result<Vec<u8>> {
    let (mut page_w_pt, mut page_h_pt) = options.page_size.dimensions_pt();
    if options.orientation == PageOrientation::Landscape {
        std::mem::swap(&mut page_w_pt, &mut page_h_pt);
    }
    let page_w = Mm(page_w_pt * MM_PER_PT);
    let page_h = Mm(page_h_pt * MM_PER_PT);

    info!(page_w_pt, page_h_pt, "Assembling images into PDF");

    let mut doc = PdfDocument::new("Wandelwerk Document");
    let mut pages: Vec<PdfPage> = Vec::new();

    for file in images {
        let Some(decoded) = decode_supported(file) else {
            continue;
        };

        let img_w = decoded.width() as f32;
        let img_h = decoded.height() as f32;

        let rgb = decoded.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: img_w as usize,
            height: img_h as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        // Placement in points. At 72 DPI the xobject's native size equals its
        // pixel dimensions, so the scale factors are draw-size over pixels.
        let (draw_w, draw_h, x, y) = match options.placement {
            ImagePlacement::Fit => {
                let scale = (page_w_pt / img_w).min(page_h_pt / img_h);
                let draw_w = img_w * scale;
                let draw_h = img_h * scale;
                (
                    draw_w,
                    draw_h,
                    (page_w_pt - draw_w) / 2.0,
                    (page_h_pt - draw_h) / 2.0,
                )
            }
            ImagePlacement::Fill => (page_w_pt, page_h_pt, 0.0, 0.0),
            ImagePlacement::Center => (
                img_w,
                img_h,
                (page_w_pt - img_w) / 2.0,
                (page_h_pt - img_h) / 2.0,
            ),
        };

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(y)),
                scale_x: Some(draw_w / img_w),
                scale_y: Some(draw_h / img_h),
                dpi: Some(72.0),
                rotate: None,
            },
        }];

        debug!(name = %file.name, draw_w, draw_h, x, y, "Image placed on page");
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    if pages.is_empty() {
        warn!("no supported images in selection — producing an empty document");
    }

    doc.with_pages(pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}

/// Decode an input if it is one of the embeddable formats (JPEG or PNG).
fn decode_supported(file: &SourceFile) -> Option<image::DynamicImage> {
    let format = match image::guess_format(&file.data) {
        Ok(format) => format,
        Err(_) => {
            debug!(name = %file.name, "unrecognised image data — skipped");
            return None;
        }
    };

    if !matches!(format, image::ImageFormat::Jpeg | image::ImageFormat::Png) {
        debug!(name = %file.name, ?format, "unsupported image type — skipped");
        return None;
    }

    match image::load_from_memory(&file.data) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            debug!(name = %file.name, %err, "image failed to decode — skipped");
            None
        }
    }
}
