// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Runtime settings for a toolbox instance.
///
/// Configuration is an in-memory value scoped to one run; nothing is
/// persisted between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum accepted file size in megabytes.
    pub max_file_size_mb: u32,
    /// Maximum number of files accepted into one selection.
    pub max_select_count: usize,
    /// Default page size for image-to-PDF assembly.
    pub default_page_size: crate::PageSize,
}

impl AppConfig {
    /// Size cap in bytes: MB × 1024².
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_select_count: 10,
            default_page_size: crate::PageSize::A4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_is_fifty_megabytes() {
        let config = AppConfig::default();
        assert_eq!(config.max_file_size_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.max_select_count, 10);
    }
}
