// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-level PDF actions: read from paths, write to paths.

use std::fs;
use std::path::{Path, PathBuf};

use pdfpress_core::PageSelection;
use pdfpress_core::error::{PdfpressError, Result};
use serde::Serialize;
use tracing::{info, instrument};

use super::reader::PdfReader;
use super::writer::MergeLayout;

/// Result of a merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub output: PathBuf,
    pub files: usize,
    pub pages: usize,
}

/// Result of removing pages from a file.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    pub output: PathBuf,
    pub removed: u32,
    pub remaining: u32,
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: &Path) -> Result<u32> {
    Ok(PdfReader::open(path)?.page_count())
}

/// Merge `inputs` in order into `output`.
#[instrument(skip_all, fields(files = inputs.len(), output = %output.display()))]
pub fn merge_files(inputs: &[PathBuf], output: &Path, layout: MergeLayout) -> Result<MergeReport> {
    let (first, rest) = inputs
        .split_first()
        .ok_or(PdfpressError::EmptyList)?;

    let base = PdfReader::open(first)?;
    let others = rest
        .iter()
        .map(PdfReader::open)
        .collect::<Result<Vec<_>>>()?;

    let writer = base.merge(&others, layout)?;
    let pages = writer.page_count();
    ensure_parent(output)?;
    writer.save(output)?;

    Ok(MergeReport {
        output: output.to_path_buf(),
        files: inputs.len(),
        pages,
    })
}

/// Write every page of `input` to `out_dir/Page_<n>.pdf`.
///
/// `on_page` is called with each written path, in page order.
#[instrument(skip(on_page))]
pub fn split_into_pages(
    input: &Path,
    out_dir: &Path,
    mut on_page: impl FnMut(&Path),
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let reader = PdfReader::open(input)?;

    let mut written = Vec::with_capacity(reader.page_count() as usize);
    for page_number in 1..=reader.page_count() {
        let path = out_dir.join(format!("Page_{page_number}.pdf"));
        fs::write(&path, reader.extract_page(page_number)?)?;
        on_page(&path);
        written.push(path);
    }

    info!(pages = written.len(), "Split complete");
    Ok(written)
}

/// Split `input` after `after_page` into `<stem>_part1.pdf` and
/// `<stem>_part2.pdf` inside `out_dir`.
#[instrument]
pub fn split_at(input: &Path, after_page: u32, out_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(out_dir)?;
    let reader = PdfReader::open(input)?;
    let (first, second) = reader.split(after_page)?;

    let stem = file_stem(input);
    let first_path = out_dir.join(format!("{stem}_part1.pdf"));
    let second_path = out_dir.join(format!("{stem}_part2.pdf"));
    fs::write(&first_path, first)?;
    fs::write(&second_path, second)?;
    Ok((first_path, second_path))
}

/// Write `input` without the selected pages to `output`.
///
/// Nothing is written when the selection covers every page.
#[instrument]
pub fn remove_pages(input: &Path, selection: &PageSelection, output: &Path) -> Result<RemovalReport> {
    let reader = PdfReader::open(input)?;
    let (writer, removed) = reader.without_pages(selection)?;
    let remaining = writer.page_count() as u32;

    ensure_parent(output)?;
    writer.save(output)?;

    Ok(RemovalReport {
        output: output.to_path_buf(),
        removed,
        remaining,
    })
}

/// Extract the text of `input` to `output`. Returns the page count.
#[instrument]
pub fn extract_text(input: &Path, output: &Path) -> Result<u32> {
    let reader = PdfReader::open(input)?;
    let text = reader.extract_text()?;
    ensure_parent(output)?;
    fs::write(output, text)?;
    info!(output = %output.display(), "Text extracted");
    Ok(reader.page_count())
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
