// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfpress-document: the engines behind every pdfpress action.
//
// Page surgery (merge, split, page removal, text and image extraction) runs on
// `lopdf`, rasterising runs on PDFium, and compression and printing shell out
// to Ghostscript and the system spooler.

pub mod compress;
pub mod ghostscript;
pub mod image;
pub mod pdf;
pub mod print;
pub mod process;
pub mod render;

// Re-export the primary types so callers can use `pdfpress_document::PdfReader` etc.
pub use compress::{BatchCompressor, BatchOptions, BatchReport, FileOutcome, FileResult};
pub use ghostscript::{Ghostscript, GsPreset};
pub use image::{ImageExtractionReport, extract_images};
pub use pdf::reader::PdfReader;
pub use pdf::writer::{MergeLayout, PdfWriter};
pub use print::print_file;
pub use process::{CommandRunner, SystemRunner};
pub use render::PageRenderer;
