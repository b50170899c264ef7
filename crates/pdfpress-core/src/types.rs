// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: the loaded file list, raster formats and paper sizes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PdfpressError, Result};

/// A single PDF file loaded into the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfFileItem {
    /// Full path to the PDF file.
    pub path: PathBuf,
}

impl PdfFileItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name including extension (e.g. "document.pdf").
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension (e.g. "document").
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Outcome of adding a batch of paths to a [`FileList`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Paths appended to the list, in the order they were appended.
    pub added: Vec<PathBuf>,
    /// Paths rejected because they do not carry a `.pdf` extension.
    pub rejected: Vec<PathBuf>,
    /// Paths that were already present.
    pub duplicates: Vec<PathBuf>,
}

/// Ordering key used when a batch of files is added.
///
/// Every decimal digit of the file stem is concatenated and parsed, so
/// `scan_2.pdf` sorts before `scan_10.pdf`. Stems without digits, or whose
/// digits do not fit an `i32`, share the last key.
pub fn numeric_sort_key(path: &Path) -> i32 {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i32>().unwrap_or(i32::MAX)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Ordered list of PDF files the user works on.
#[derive(Debug, Clone, Default)]
pub struct FileList {
    items: Vec<PdfFileItem>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PdfFileItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&PdfFileItem> {
        self.items.get(index)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.items.iter().any(|item| item.path == path)
    }

    /// Add a batch of paths.
    ///
    /// The batch is sorted with [`numeric_sort_key`] (stable), non-PDF paths
    /// are rejected and paths already in the list are skipped.
    pub fn add_files<I, P>(&mut self, paths: I) -> AddReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut batch: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        batch.sort_by_key(|p| numeric_sort_key(p));

        let mut report = AddReport::default();
        for path in batch {
            if !has_pdf_extension(&path) {
                report.rejected.push(path);
                continue;
            }
            if self.contains(&path) {
                report.duplicates.push(path);
                continue;
            }
            self.items.push(PdfFileItem::new(path.clone()));
            report.added.push(path);
        }

        debug!(
            added = report.added.len(),
            rejected = report.rejected.len(),
            duplicates = report.duplicates.len(),
            "files added"
        );
        report
    }

    /// Remove the item at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<PdfFileItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Remove the item with the given path, returning it.
    pub fn remove_path(&mut self, path: &Path) -> Option<PdfFileItem> {
        let index = self.items.iter().position(|item| item.path == path)?;
        Some(self.items.remove(index))
    }

    /// Remove every item. Fails with [`PdfpressError::AlreadyEmpty`] on an
    /// empty list; otherwise returns how many were removed.
    pub fn clear(&mut self) -> Result<usize> {
        if self.items.is_empty() {
            return Err(PdfpressError::AlreadyEmpty);
        }
        let count = self.items.len();
        self.items.clear();
        Ok(count)
    }

    /// Swap two entries. Returns `false` if either index is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.items.len() || b >= self.items.len() {
            return false;
        }
        self.items.swap(a, b);
        true
    }

    /// Move the entry at `index` one position towards the front.
    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.swap(index, index - 1)
    }

    /// Move the entry at `index` one position towards the back.
    pub fn move_down(&mut self, index: usize) -> bool {
        index
            .checked_add(1)
            .is_some_and(|next| self.swap(index, next))
    }

    /// The file a single-file action operates on.
    ///
    /// With exactly one file loaded that file is used regardless of
    /// selection; otherwise the selected index must point at an entry.
    pub fn select_single(&self, selected: Option<usize>) -> Result<&PdfFileItem> {
        match self.items.len() {
            0 => Err(PdfpressError::EmptyList),
            1 => Ok(&self.items[0]),
            _ => selected
                .and_then(|index| self.items.get(index))
                .ok_or(PdfpressError::NoSelection),
        }
    }

    /// Require at least `required` files (e.g. two for a merge).
    pub fn require_at_least(&self, required: usize) -> Result<&[PdfFileItem]> {
        if self.items.is_empty() {
            return Err(PdfpressError::EmptyList);
        }
        if self.items.len() < required {
            return Err(PdfpressError::NotEnoughFiles {
                required,
                actual: self.items.len(),
            });
        }
        Ok(&self.items)
    }
}

/// Raster formats pages can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
}

impl RasterFormat {
    /// Parse a user-supplied format name (case-insensitive).
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "tif" | "tiff" => Ok(Self::Tiff),
            other => Err(PdfpressError::UnsupportedFormat(other.to_string())),
        }
    }

    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }
}

impl std::fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
        }
    }

    /// Dimensions in PDF points (1/72 inch).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (w * 72.0 / 25.4, h * 72.0 / 25.4)
    }
}
