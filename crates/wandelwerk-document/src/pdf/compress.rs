// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF compression — re-serialise a document under one of three preset tiers.
//
// The tiers map to lopdf housekeeping passes; the achieved ratio depends
// entirely on the document. `CompressionLevel::estimated_reduction_percent`
// is a display hint, never a measurement.

use lopdf::Document;
use tracing::{debug, info, instrument};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::types::{CompressionLevel, ConversionOutcome, ResultFile, SourceFile};

use super::pages::serialize;

/// Re-serialise a PDF with the given preset tier.
///
/// Low: plain re-save. Medium: stream compression. High: stream compression
/// plus unreferenced-object pruning and renumbering.
#[instrument(skip(data), fields(bytes_len = data.len(), level = ?level))]
pub fn compress_bytes(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(data)
        .map_err(|err| WandelwerkError::Pdf(format!("failed to load PDF: {}", err)))?;

    match level {
        CompressionLevel::Low => {}
        CompressionLevel::Medium => {
            doc.compress();
        }
        CompressionLevel::High => {
            doc.prune_objects();
            doc.delete_zero_length_streams();
            doc.renumber_objects();
            doc.compress();
        }
    }

    let output = serialize(doc)?;
    debug!(
        input_bytes = data.len(),
        output_bytes = output.len(),
        "PDF re-serialised"
    );
    Ok(output)
}

/// Compress a PDF source file, producing `{stem}_compressed.pdf` with the
/// size metadata for display.
pub fn compress_document(file: &SourceFile, level: CompressionLevel) -> Result<ConversionOutcome> {
    info!(
        name = %file.name,
        level = ?level,
        estimated = level.estimated_reduction_percent(),
        "Compressing PDF"
    );

    let data = compress_bytes(&file.data, level)?;
    let result = ResultFile::new(
        format!("{}_compressed.pdf", file.stem()),
        "application/pdf",
        data,
    );
    Ok(ConversionOutcome::new(result, file.size()))
}
