// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sequential batch execution with per-item outcomes.
//
// Items are processed one at a time in array order. A failing item never
// aborts the rest of the batch; it is recorded in the report, tagged with
// its error message, so callers decide what to surface.

use serde::Serialize;
use tracing::{info, warn};
use wandelwerk_core::error::Result;
use wandelwerk_core::types::SourceFile;

/// Outcome of one batch item.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem<T> {
    /// Name of the input file this item corresponds to.
    pub name: String,
    /// The produced value, or the error message for a failed item.
    pub outcome: std::result::Result<T, String>,
}

/// All per-item outcomes of a batch run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<T> {
    pub items: Vec<BatchItem<T>>,
}

impl<T> BatchReport<T> {
    /// Successful outputs, in input order.
    pub fn succeeded(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|item| item.outcome.as_ref().ok())
    }

    /// Names and messages of the failed items.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().filter_map(|item| {
            item.outcome
                .as_ref()
                .err()
                .map(|message| (item.name.as_str(), message.as_str()))
        })
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.items.len() - self.success_count()
    }
}

/// Run `op` over every file sequentially, reporting progress after each item.
///
/// The progress callback receives the completion percentage (0–100) once per
/// item, matching the one-file-at-a-time indicator of the batch tools.
pub fn run_sequential<T, F, P>(
    files: &[SourceFile],
    mut op: F,
    mut on_progress: P,
) -> BatchReport<T>
where
    F: FnMut(&SourceFile) -> Result<T>,
    P: FnMut(f32),
{
    let total = files.len();
    let mut items = Vec::with_capacity(total);

    for (index, file) in files.iter().enumerate() {
        let outcome = match op(file) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(name = %file.name, %err, "batch item failed — continuing");
                Err(err.to_string())
            }
        };

        items.push(BatchItem {
            name: file.name.clone(),
            outcome,
        });

        on_progress((index + 1) as f32 / total as f32 * 100.0);
    }

    let report = BatchReport { items };
    info!(
        total,
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "batch complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use wandelwerk_core::WandelwerkError;

    fn files(names: &[&str]) -> Vec<SourceFile> {
        names
            .iter()
            .map(|name| SourceFile::new(*name, "image/png", vec![0u8; 4]))
            .collect()
    }

    #[test]
    fn failures_are_recorded_and_do_not_abort() {
        let inputs = files(&["a.png", "bad.png", "c.png"]);

        let report = run_sequential(
            &inputs,
            |file| {
                if file.name == "bad.png" {
                    Err(WandelwerkError::Image("corrupt".into()))
                } else {
                    Ok(file.name.len())
                }
            },
            |_| {},
        );

        assert_eq!(report.items.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);

        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "bad.png");
        assert!(failed[0].1.contains("corrupt"));

        // Input order preserved.
        assert_eq!(report.items[0].name, "a.png");
        assert_eq!(report.items[2].name, "c.png");
    }

    #[test]
    fn progress_advances_per_item_to_one_hundred() {
        let inputs = files(&["a.png", "b.png", "c.png", "d.png"]);
        let mut seen = Vec::new();

        run_sequential(&inputs, |_| Ok(()), |pct| seen.push(pct));

        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], 25.0);
        assert_eq!(seen[3], 100.0);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_batch_yields_empty_report() {
        let report = run_sequential(&[], |_: &SourceFile| Ok(()), |_| {});
        assert!(report.items.is_empty());
        assert_eq!(report.success_count(), 0);
    }
}
