// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — merging, splitting, rotating, compressing, rendering, and
// assembling PDF documents.

pub mod assemble;
pub mod compress;
pub mod pages;
pub mod render;

pub use assemble::{AssembleOptions, assemble_images};
pub use compress::{compress_bytes, compress_document};
pub use pages::{PdfPages, merge_documents};
pub use render::{RenderOptions, rasterizer_available, render_pages};
