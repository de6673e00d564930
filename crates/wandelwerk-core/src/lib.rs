// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wandelwerk — Core types, errors, validation, and tool sessions shared
// across all crates.

pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod validate;

pub use config::AppConfig;
pub use error::WandelwerkError;
pub use session::ToolSession;
pub use types::*;
