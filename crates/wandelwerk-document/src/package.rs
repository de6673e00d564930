// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result packaging — a single output passes through unchanged; multiple
// outputs are bundled into one ZIP archive keyed by file name.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use tracing::{debug, info, instrument};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::types::ResultFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Package results for download.
///
/// One result is returned as-is. Two or more are written into a deflate
/// ZIP archive named `archive_name`, each entry keyed by its own file name;
/// name collisions silently overwrite (the last file wins).
#[instrument(skip(results), fields(result_count = results.len(), archive_name))]
pub fn package_results(results: Vec<ResultFile>, archive_name: &str) -> Result<ResultFile> {
    let mut results = results;
    match results.len() {
        0 => Err(WandelwerkError::Archive("no results to package".into())),
        1 => {
            let Some(single) = results.pop() else {
                return Err(WandelwerkError::Archive("no results to package".into()));
            };
            debug!(name = %single.name, "single result — no archive");
            Ok(single)
        }
        _ => {
            let archive = build_zip(&deduplicate(results))?;
            info!(
                archive_bytes = archive.len(),
                "results packaged into archive"
            );
            Ok(ResultFile::new(archive_name, "application/zip", archive))
        }
    }
}

/// Keep one entry per name, last occurrence winning, first-seen order.
fn deduplicate(results: Vec<ResultFile>) -> Vec<ResultFile> {
    let mut order: Vec<ResultFile> = Vec::with_capacity(results.len());
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for file in results {
        match index_by_name.get(&file.name) {
            Some(&index) => order[index] = file,
            None => {
                index_by_name.insert(file.name.clone(), order.len());
                order.push(file);
            }
        }
    }

    order
}

fn build_zip(files: &[ResultFile]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        writer
            .start_file(file.name.as_str(), options)
            .map_err(|err| {
                WandelwerkError::Archive(format!("cannot add {} to archive: {}", file.name, err))
            })?;
        writer.write_all(&file.data)?;
    }

    let cursor = writer
        .finish()
        .map_err(|err| WandelwerkError::Archive(format!("cannot finish archive: {}", err)))?;
    Ok(cursor.into_inner())
}
