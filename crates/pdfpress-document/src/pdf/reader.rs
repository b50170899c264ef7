// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open, inspect, split, prune and extract text from existing PDF
// documents using the `lopdf` crate.

use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};
use pdfpress_core::PageSelection;
use pdfpress_core::error::{PdfpressError, Result};
use tracing::{debug, info, instrument, warn};

use super::writer::{MergeLayout, PdfWriter};

/// Reads existing PDF files.
///
/// Wraps `lopdf::Document` and provides page-level operations that produce
/// new documents through [`PdfWriter`].
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<PathBuf>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PdfpressError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.to_path_buf()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            PdfpressError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// File name used in messages ("document.pdf", or "<memory>").
    pub fn display_name(&self) -> String {
        self.source_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    /// PDF header version of the source ("1.4", "1.7", ...).
    pub fn version(&self) -> &str {
        &self.document.version
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    /// Page object ids in page order.
    pub(crate) fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }

    // -- Extraction -----------------------------------------------------------

    /// Copy the given 1-indexed pages, in order, into a new writer.
    pub fn extract_pages(&self, page_numbers: &[u32]) -> Result<PdfWriter> {
        let pages = self.document.get_pages();
        let mut ids = Vec::with_capacity(page_numbers.len());
        for &page_number in page_numbers {
            let id = *pages.get(&page_number).ok_or_else(|| {
                PdfpressError::PdfError(format!(
                    "page {} out of range (document has {} pages)",
                    page_number,
                    pages.len()
                ))
            })?;
            ids.push(id);
        }

        let mut writer = PdfWriter::new();
        writer.set_version(self.document.version.clone());
        writer.append_pages(&self.document, &ids)?;
        Ok(writer)
    }

    /// Extract a single page (1-indexed) into a standalone PDF with
    /// `/Title (Page n)`.
    #[instrument(skip(self))]
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>> {
        let mut writer = self.extract_pages(&[page_number])?;
        writer.set_title(&format!("Page {page_number}"));
        let output = writer.to_bytes()?;
        debug!(page_number, output_bytes = output.len(), "Page extracted");
        Ok(output)
    }

    /// Split the document at `after_page` (1-indexed, inclusive) producing two
    /// byte-vectors: pages [1..=after_page] and pages [after_page+1..=end].
    #[instrument(skip(self))]
    pub fn split(&self, after_page: u32) -> Result<(Vec<u8>, Vec<u8>)> {
        let total = self.page_count();
        if after_page == 0 || after_page >= total {
            return Err(PdfpressError::PdfError(format!(
                "split point {} invalid for {} page document",
                after_page, total
            )));
        }

        info!(after_page, total, "Splitting PDF");

        let first: Vec<u32> = (1..=after_page).collect();
        let second: Vec<u32> = (after_page + 1..=total).collect();

        Ok((
            self.extract_pages(&first)?.to_bytes()?,
            self.extract_pages(&second)?.to_bytes()?,
        ))
    }

    /// Build a copy of the document without the selected pages.
    ///
    /// Returns the writer and the number of pages removed. Removing every
    /// page is an error: there is nothing left to save.
    #[instrument(skip(self))]
    pub fn without_pages(&self, selection: &PageSelection) -> Result<(PdfWriter, u32)> {
        let total = self.page_count();
        let remove = selection.resolve(total);
        let keep: Vec<u32> = (0..total)
            .filter(|index| !remove.contains(index))
            .map(|index| index + 1)
            .collect();

        if keep.is_empty() {
            return Err(PdfpressError::NoPagesLeft(self.display_name()));
        }

        info!(removed = remove.len(), kept = keep.len(), "Removing pages");
        Ok((self.extract_pages(&keep)?, remove.len() as u32))
    }

    /// Extract the text of every page, each preceded by a `--- Page n ---`
    /// header.
    ///
    /// Pages whose text cannot be decoded contribute an empty body.
    #[instrument(skip(self))]
    pub fn extract_text(&self) -> Result<String> {
        let mut result = String::new();
        for page_number in 1..=self.page_count() {
            let text = self.document.extract_text(&[page_number]).unwrap_or_else(|err| {
                warn!(page_number, %err, "text extraction failed for page");
                String::new()
            });
            result.push_str(&format!("--- Page {page_number} ---\n{text}\n"));
        }
        Ok(result)
    }

    // -- Merging --------------------------------------------------------------

    /// Merge this document with others. Pages appear in the order: self,
    /// then each supplied document in order.
    #[instrument(skip_all, fields(additional_count = others.len()))]
    pub fn merge(&self, others: &[PdfReader], layout: MergeLayout) -> Result<PdfWriter> {
        info!(
            base_pages = self.page_count(),
            additional_documents = others.len(),
            "Merging PDFs"
        );

        let mut writer = PdfWriter::with_layout(layout);
        for reader in std::iter::once(self).chain(others) {
            writer.append_pages(&reader.document, &reader.page_ids())?;
        }

        debug!(pages = writer.page_count(), "Merge complete");
        Ok(writer)
    }
}
