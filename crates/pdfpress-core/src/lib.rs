// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfpress: core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod pages;
pub mod size;
pub mod types;

pub use config::AppConfig;
pub use error::PdfpressError;
pub use pages::PageSelection;
pub use size::format_size;
pub use types::*;
