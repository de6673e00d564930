// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF-to-image rendering via pdfium.
//
// pdfium is linked dynamically at runtime: the loader looks next to the
// executable first, then falls back to the system library path. A missing
// library surfaces as a `Render` error rather than a panic so the rest of
// the toolbox keeps working without it.

use image::codecs::jpeg::JpegEncoder;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::types::ResultFile;

/// JPEG quality used for rendered pages.
const PAGE_JPEG_QUALITY: u8 = 95;

/// Rendering settings for PDF-to-image conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Output resolution; page point-dimensions are scaled by `dpi / 72`.
    pub dpi: u32,
    /// 1-indexed page numbers to render; `None` renders every page.
    /// Out-of-range numbers are skipped.
    pub pages: Option<Vec<u32>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 72,
            pages: None,
        }
    }
}

/// Rasterise PDF pages into JPEG files named `page_{n}.jpg`.
#[instrument(skip(data), fields(bytes_len = data.len(), dpi = options.dpi))]
pub fn render_pages(data: &[u8], options: &RenderOptions) -> Result<Vec<ResultFile>> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(|err| WandelwerkError::Render(format!("failed to load PDF: {:?}", err)))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!(total, "PDF opened for rendering");

    let selected: Vec<usize> = match &options.pages {
        Some(numbers) => numbers
            .iter()
            .filter(|&&number| {
                let in_range = number >= 1 && number as usize <= total;
                if !in_range {
                    warn!(number, total, "page out of range — skipped");
                }
                in_range
            })
            .map(|&number| number as usize - 1)
            .collect(),
        None => (0..total).collect(),
    };

    let scale = options.dpi as f32 / 72.0;
    let mut results = Vec::with_capacity(selected.len());

    for index in selected {
        let page = pages.get(index as u16).map_err(|err| {
            WandelwerkError::Render(format!("cannot open page {}: {:?}", index + 1, err))
        })?;

        let width_px = (page.width().value * scale) as i32;
        let height_px = (page.height().value * scale) as i32;

        let config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_target_height(height_px);

        let bitmap = page.render_with_config(&config).map_err(|err| {
            WandelwerkError::Render(format!("failed to render page {}: {:?}", index + 1, err))
        })?;
        let rendered = bitmap.as_image();

        debug!(
            page = index + 1,
            width = rendered.width(),
            height = rendered.height(),
            "Page rendered"
        );

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, PAGE_JPEG_QUALITY);
        rendered.to_rgb8().write_with_encoder(encoder).map_err(|err| {
            WandelwerkError::Image(format!("JPEG encoding failed for page {}: {}", index + 1, err))
        })?;

        results.push(ResultFile::new(
            format!("page_{}.jpg", index + 1),
            "image/jpeg",
            buffer,
        ));
    }

    Ok(results)
}

/// Whether a pdfium library can be bound on this machine.
///
/// Used by callers (and tests) to degrade gracefully when the shared library
/// is not installed.
pub fn rasterizer_available() -> bool {
    bind_pdfium().is_ok()
}

/// Bind pdfium: executable-local library first, then the system path.
fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|err| {
            WandelwerkError::Render(format!(
                "pdfium library unavailable — install libpdfium or place it next to the binary: {:?}",
                err
            ))
        })?;
    Ok(Pdfium::new(bindings))
}
