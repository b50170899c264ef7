// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch compression: run Ghostscript over a list of files, skipping files that
// are too small to benefit and falling back to the original bytes whenever
// the compressed output is not meaningfully smaller.

use std::fs;
use std::path::{Path, PathBuf};

use pdfpress_core::AppConfig;
use pdfpress_core::error::{PdfpressError, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::ghostscript::{CompressionSettings, Ghostscript};
use crate::pdf::ops::file_stem;
use crate::process::{CommandRunner, SystemRunner};

/// Tunables for a batch run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    /// 0-100; picks resolution and JPEG quality.
    pub quality: u8,
    /// Files smaller than this are copied untouched.
    pub min_size_bytes: u64,
    /// Keep the compressed file only if `after < before * ratio`.
    pub min_savings_ratio: f64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            quality: 60,
            min_size_bytes: 100 * 1024,
            min_savings_ratio: 0.95,
        }
    }
}

impl From<&AppConfig> for BatchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            quality: config.compression_quality,
            min_size_bytes: config.min_compress_bytes,
            min_savings_ratio: config.min_savings_ratio,
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Compressed { before: u64, after: u64 },
    SkippedTooSmall { size: u64 },
    NotSmaller { before: u64, after: u64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileResult>,
}

impl BatchReport {
    /// Files whose output is a genuinely compressed document.
    pub fn compressed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.outcome, FileOutcome::Compressed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }
}

/// `<stem>_compressed.pdf`.
pub fn compressed_name(input: &Path) -> String {
    format!("{}_compressed.pdf", file_stem(input))
}

pub struct BatchCompressor<R = SystemRunner> {
    ghostscript: Ghostscript<R>,
    options: BatchOptions,
}

impl<R: CommandRunner> BatchCompressor<R> {
    pub fn new(ghostscript: Ghostscript<R>, options: BatchOptions) -> Self {
        Self {
            ghostscript,
            options,
        }
    }

    /// Compress every input into `out_dir`, in order.
    ///
    /// A failure on one file is recorded and the batch moves on. `progress`
    /// receives `(done, total, result)` as soon as each file is finished.
    #[instrument(skip_all, fields(files = inputs.len(), out_dir = %out_dir.display()))]
    pub fn compress_all(
        &self,
        inputs: &[PathBuf],
        out_dir: &Path,
        mut progress: impl FnMut(usize, usize, &FileResult),
    ) -> Result<BatchReport> {
        fs::create_dir_all(out_dir)?;
        let settings = CompressionSettings::from_quality(self.options.quality);

        let mut report = BatchReport::default();
        for (index, input) in inputs.iter().enumerate() {
            let output = out_dir.join(compressed_name(input));
            let outcome = self
                .compress_one(input, &output, settings)
                .unwrap_or_else(|err| {
                    warn!(input = %input.display(), %err, "compression failed");
                    FileOutcome::Failed {
                        reason: err.to_string(),
                    }
                });

            let result = FileResult {
                input: input.clone(),
                output,
                outcome,
            };
            progress(index + 1, inputs.len(), &result);
            report.files.push(result);
        }

        info!(
            compressed = report.compressed_count(),
            total = report.total(),
            "Batch compression finished"
        );
        Ok(report)
    }

    fn compress_one(
        &self,
        input: &Path,
        output: &Path,
        settings: CompressionSettings,
    ) -> Result<FileOutcome> {
        let before = fs::metadata(input)?.len();
        if before < self.options.min_size_bytes {
            fs::copy(input, output)?;
            return Ok(FileOutcome::SkippedTooSmall { size: before });
        }

        match self.ghostscript.compress_downsampled(input, output, settings) {
            Ok(()) => {}
            Err(PdfpressError::GhostscriptFailed(reason)) => {
                return Ok(FileOutcome::Failed { reason });
            }
            Err(err) => return Err(err),
        }

        let after = fs::metadata(output)?.len();
        if after as f64 >= before as f64 * self.options.min_savings_ratio {
            fs::remove_file(output)?;
            fs::copy(input, output)?;
            return Ok(FileOutcome::NotSmaller { before, after });
        }

        Ok(FileOutcome::Compressed { before, after })
    }
}
