// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection validation — size cap, MIME allowlist, selection count.
//
// Rejected files are silently filtered out of the selection (logged only);
// no per-file error is surfaced to the caller.

use tracing::warn;

use crate::config::AppConfig;
use crate::types::SourceFile;

/// Whether the file fits under the configured size cap.
///
/// A file of exactly the cap passes; one byte over fails.
pub fn within_size_limit(file: &SourceFile, config: &AppConfig) -> bool {
    file.size() <= config.max_file_size_bytes()
}

/// Whether the file's MIME type matches one of the allowed prefixes.
///
/// `image/` admits every image type; `image/jpeg` admits JPEG only.
pub fn type_allowed(file: &SourceFile, allowed_prefixes: &[&str]) -> bool {
    allowed_prefixes
        .iter()
        .any(|prefix| file.mime.starts_with(prefix))
}

/// Filter a selection down to the files that pass validation, truncated to
/// the configured maximum count.
pub fn filter_selection(
    files: Vec<SourceFile>,
    config: &AppConfig,
    allowed_prefixes: &[&str],
) -> Vec<SourceFile> {
    let mut accepted = Vec::with_capacity(files.len());

    for file in files {
        if !within_size_limit(&file, config) {
            warn!(
                name = %file.name,
                size = file.size(),
                cap = config.max_file_size_bytes(),
                "file exceeds size cap — dropped from selection"
            );
            continue;
        }
        if !type_allowed(&file, allowed_prefixes) {
            warn!(
                name = %file.name,
                mime = %file.mime,
                "file type not allowed — dropped from selection"
            );
            continue;
        }
        if accepted.len() >= config.max_select_count {
            warn!(
                name = %file.name,
                max = config.max_select_count,
                "selection full — dropped"
            );
            continue;
        }
        accepted.push(file);
    }

    accepted
}
