// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::RasterFormat;

/// Persistent application settings, stored as `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// License key for the commercial PDF SDK. Stored and shown, never applied.
    pub license_key: Option<String>,
    /// Explicit Ghostscript executable. Searched on PATH when unset.
    pub ghostscript_path: Option<PathBuf>,
    /// Directory holding the PDFium shared library. System paths when unset.
    pub pdfium_library_dir: Option<PathBuf>,
    /// Default compression quality (0-100).
    pub compression_quality: u8,
    /// Files smaller than this are copied instead of compressed.
    pub min_compress_bytes: u64,
    /// Compressed output at or above `original * ratio` is discarded.
    pub min_savings_ratio: f64,
    /// Default resolution for page images.
    pub image_dpi: u32,
    /// Default format for page images.
    pub image_format: RasterFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            license_key: None,
            ghostscript_path: None,
            pdfium_library_dir: None,
            compression_quality: 60,
            min_compress_bytes: 100 * 1024,
            min_savings_ratio: 0.95,
            image_dpi: 350,
            image_format: RasterFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "license_key": "ABC-123", "image_format": "jpeg" }"#)
                .unwrap();
        assert_eq!(config.license_key.as_deref(), Some("ABC-123"));
        assert_eq!(config.image_format, RasterFormat::Jpeg);
        assert_eq!(config.compression_quality, 60);
        assert_eq!(config.min_compress_bytes, 102_400);
    }
}
