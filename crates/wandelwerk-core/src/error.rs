// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Wandelwerk.

use thiserror::Error;

/// Top-level error type for all Wandelwerk operations.
#[derive(Debug, Error)]
pub enum WandelwerkError {
    // -- Input errors --
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    // -- Transform errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("archive packaging failed: {0}")]
    Archive(String),

    // -- Session errors --
    #[error("invalid session transition: {0}")]
    Session(String),

    // -- I/O / serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WandelwerkError>;
