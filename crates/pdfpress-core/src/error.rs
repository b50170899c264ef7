// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pdfpress.

use thiserror::Error;

/// Top-level error type for all pdfpress operations.
#[derive(Debug, Error)]
pub enum PdfpressError {
    // -- File list errors --
    #[error("no PDF files have been added")]
    EmptyList,

    #[error("select one file for this action")]
    NoSelection,

    #[error("the file list is already empty")]
    AlreadyEmpty,

    #[error("at least {required} files are needed, got {actual}")]
    NotEnoughFiles { required: usize, actual: usize },

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("\"{0}\" has no pages after removal")]
    NoPagesLeft(String),

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("DPI {0} is outside the supported range 30-1200")]
    InvalidDpi(u32),

    #[error("page rendering failed: {0}")]
    RenderError(String),

    // -- External tools --
    #[error("Ghostscript executable not found")]
    GhostscriptNotFound,

    #[error("Ghostscript failed: {0}")]
    GhostscriptFailed(String),

    #[error("print spooler failed: {0}")]
    PrintError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("background task failed: {0}")]
    Worker(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PdfpressError>;
