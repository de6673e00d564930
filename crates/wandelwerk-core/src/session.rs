// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tool sessions — one isolated stateful object per tool instance, running
// the linear idle → selected → processing → completed/failed machine.

use chrono::{DateTime, Utc};

use crate::error::{Result, WandelwerkError};
use crate::types::{SourceFile, ToolStatus};

/// State for one tool instance.
///
/// Each tool (image compressor, PDF merger, …) owns its own session; no
/// state is shared between instances. A session admits exactly one
/// operation in flight: `begin` is rejected while `Processing`, and there
/// is no cancellation — a started operation runs to `complete` or `fail`.
///
/// `R` is the tool's result type, typically [`crate::ResultFile`] or
/// [`crate::ConversionOutcome`].
#[derive(Debug, Clone)]
pub struct ToolSession<R> {
    status: ToolStatus,
    selection: Vec<SourceFile>,
    results: Vec<R>,
    progress_percent: f32,
    error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<R> ToolSession<R> {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            status: ToolStatus::Idle,
            selection: Vec::new(),
            results: Vec::new(),
            progress_percent: 0.0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn status(&self) -> ToolStatus {
        self.status
    }

    pub fn selection(&self) -> &[SourceFile] {
        &self.selection
    }

    pub fn results(&self) -> &[R] {
        &self.results
    }

    pub fn progress_percent(&self) -> f32 {
        self.progress_percent
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    // -- Selection ------------------------------------------------------------

    /// Replace the selection with a new (already validated) set of files.
    ///
    /// An empty set returns the session to `Idle`. Rejected while a
    /// transform is running.
    pub fn select(&mut self, files: Vec<SourceFile>) -> Result<()> {
        if self.status == ToolStatus::Processing {
            return Err(WandelwerkError::Session(
                "cannot change selection while processing".into(),
            ));
        }

        self.status = if files.is_empty() {
            ToolStatus::Idle
        } else {
            ToolStatus::Selected
        };
        self.selection = files;
        self.results.clear();
        self.error_message = None;
        self.progress_percent = 0.0;
        self.touch();
        Ok(())
    }

    /// Swap the file at `index` with its predecessor. No-op at the top.
    pub fn move_up(&mut self, index: usize) {
        if index > 0 && index < self.selection.len() {
            self.selection.swap(index - 1, index);
            self.touch();
        }
    }

    /// Swap the file at `index` with its successor. No-op at the bottom.
    pub fn move_down(&mut self, index: usize) {
        if index + 1 < self.selection.len() {
            self.selection.swap(index, index + 1);
            self.touch();
        }
    }

    /// Remove one file from the selection.
    pub fn remove(&mut self, index: usize) {
        if index < self.selection.len() {
            self.selection.remove(index);
            if self.selection.is_empty() && self.status == ToolStatus::Selected {
                self.status = ToolStatus::Idle;
            }
            self.touch();
        }
    }

    // -- Processing lifecycle -------------------------------------------------

    /// Mark the start of a transform. Only legal from `Selected`.
    pub fn begin(&mut self) -> Result<()> {
        match self.status {
            ToolStatus::Selected => {
                self.status = ToolStatus::Processing;
                self.progress_percent = 0.0;
                self.error_message = None;
                self.results.clear();
                self.touch();
                Ok(())
            }
            ToolStatus::Processing => Err(WandelwerkError::Session(
                "an operation is already in flight".into(),
            )),
            other => Err(WandelwerkError::Session(format!(
                "cannot begin processing from {:?}",
                other
            ))),
        }
    }

    /// Update the progress indicator, clamped to 0–100.
    pub fn set_progress(&mut self, percent: f32) {
        if self.status == ToolStatus::Processing {
            self.progress_percent = percent.clamp(0.0, 100.0);
            self.touch();
        }
    }

    /// Record a successful finish with its results.
    pub fn complete(&mut self, results: Vec<R>) -> Result<()> {
        if self.status != ToolStatus::Processing {
            return Err(WandelwerkError::Session(
                "complete called outside processing".into(),
            ));
        }
        self.status = ToolStatus::Completed;
        self.results = results;
        self.progress_percent = 100.0;
        self.touch();
        Ok(())
    }

    /// Record a failed finish with a user-facing message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ToolStatus::Failed;
        self.error_message = Some(message.into());
        self.touch();
    }

    /// Discard everything and return to `Idle`.
    pub fn reset(&mut self) {
        self.status = ToolStatus::Idle;
        self.selection.clear();
        self.results.clear();
        self.progress_percent = 0.0;
        self.error_message = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl<R> Default for ToolSession<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultFile;

    fn sample_files(n: usize) -> Vec<SourceFile> {
        (0..n)
            .map(|i| SourceFile::new(format!("f{i}.pdf"), "application/pdf", vec![0u8; 4]))
            .collect()
    }

    #[test]
    fn linear_lifecycle() {
        let mut session: ToolSession<ResultFile> = ToolSession::new();
        assert_eq!(session.status(), ToolStatus::Idle);

        session.select(sample_files(2)).unwrap();
        assert_eq!(session.status(), ToolStatus::Selected);

        session.begin().unwrap();
        assert_eq!(session.status(), ToolStatus::Processing);

        session.set_progress(50.0);
        assert_eq!(session.progress_percent(), 50.0);

        session
            .complete(vec![ResultFile::new("out.pdf", "application/pdf", vec![1])])
            .unwrap();
        assert_eq!(session.status(), ToolStatus::Completed);
        assert_eq!(session.progress_percent(), 100.0);
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn begin_requires_selection() {
        let mut session: ToolSession<ResultFile> = ToolSession::new();
        assert!(session.begin().is_err());
    }

    #[test]
    fn single_operation_in_flight() {
        let mut session: ToolSession<ResultFile> = ToolSession::new();
        session.select(sample_files(1)).unwrap();
        session.begin().unwrap();

        assert!(session.begin().is_err());
        assert!(session.select(sample_files(1)).is_err());
    }

    #[test]
    fn failure_records_message() {
        let mut session: ToolSession<ResultFile> = ToolSession::new();
        session.select(sample_files(1)).unwrap();
        session.begin().unwrap();
        session.fail("Failed to merge PDFs. Please try again.");

        assert_eq!(session.status(), ToolStatus::Failed);
        assert_eq!(
            session.error_message(),
            Some("Failed to merge PDFs. Please try again.")
        );
    }

    #[test]
    fn adjacent_swap_reordering() {
        let mut session: ToolSession<ResultFile> = ToolSession::new();
        session.select(sample_files(3)).unwrap();

        session.move_up(2);
        let names: Vec<_> = session.selection().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["f0.pdf", "f2.pdf", "f1.pdf"]);

        session.move_down(0);
        let names: Vec<_> = session.selection().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["f2.pdf", "f0.pdf", "f1.pdf"]);

        // Boundary swaps are no-ops.
        session.move_up(0);
        session.move_down(2);
        let names: Vec<_> = session.selection().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["f2.pdf", "f0.pdf", "f1.pdf"]);
    }

    #[test]
    fn remove_last_file_returns_to_idle() {
        let mut session: ToolSession<ResultFile> = ToolSession::new();
        session.select(sample_files(1)).unwrap();
        session.remove(0);
        assert_eq!(session.status(), ToolStatus::Idle);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut session: ToolSession<ResultFile> = ToolSession::new();
        session.select(sample_files(2)).unwrap();
        session.begin().unwrap();
        session.fail("boom");
        session.reset();

        assert_eq!(session.status(), ToolStatus::Idle);
        assert!(session.selection().is_empty());
        assert!(session.error_message().is_none());
        assert_eq!(session.progress_percent(), 0.0);
    }
}
