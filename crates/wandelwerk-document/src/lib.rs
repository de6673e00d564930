// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wandelwerk-document — File transforms for the Wandelwerk toolbox.
//
// Provides the PDF page pipeline (merge, split, rotate, compress, render,
// assemble), image processing (compression, format conversion, watermark
// retouching), sequential batch execution, and result packaging.

pub mod batch;
pub mod image;
pub mod package;
pub mod pdf;

// Re-export the primary entry points so callers can use
// `wandelwerk_document::PdfPages` etc.
pub use batch::{BatchItem, BatchReport, run_sequential};
pub use package::package_results;
pub use pdf::assemble::{AssembleOptions, assemble_images};
pub use pdf::compress::compress_document;
pub use pdf::pages::{PdfPages, merge_documents};
pub use pdf::render::{RenderOptions, rasterizer_available, render_pages};
pub use self::image::inpaint::{BrushMask, WatermarkTool};
pub use self::image::processor::{compress_image, convert_format};
