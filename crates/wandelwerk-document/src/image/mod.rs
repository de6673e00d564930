// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — compression, format conversion, and watermark retouching.

pub mod inpaint;
pub mod processor;

pub use inpaint::{BrushMask, WatermarkTool, inpaint};
pub use processor::{compress_image, convert_format};
