// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The blocking bodies of each command. They run on the worker pool and talk
// to the user only through the `Reporter`.

use std::path::{Path, PathBuf};

use pdfpress_core::error::Result;
use pdfpress_core::{AppConfig, PageSelection, PaperSize, RasterFormat, format_size};
use pdfpress_document::compress::{BatchCompressor, BatchOptions, FileOutcome, compressed_name};
use pdfpress_document::pdf::ops;
use pdfpress_document::{
    CommandRunner, Ghostscript, MergeLayout, PageRenderer, SystemRunner, extract_images,
    print_file,
};

use super::worker::Reporter;

pub const COMPRESSED_DIR: &str = "Compressed";
pub const SPLIT_DIR: &str = "SplitPages";
pub const CLEANED_DIR: &str = "Cleaned";
pub const TEXT_DIR: &str = "ExtractedText";
pub const IMAGES_DIR: &str = "ExtractedImages";
pub const EXPORTED_DIR: &str = "ImagesExported";
pub const MERGED_FILE: &str = "Merged.pdf";

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<out>/Cleaned/<stem>_cleaned.pdf`.
pub fn cleaned_path(out_dir: &Path, input: &Path) -> PathBuf {
    out_dir
        .join(CLEANED_DIR)
        .join(format!("{}_cleaned.pdf", stem(input)))
}

/// `<out>/ExtractedText/<stem>_ExtractedText.txt`.
pub fn text_path(out_dir: &Path, input: &Path) -> PathBuf {
    out_dir
        .join(TEXT_DIR)
        .join(format!("{}_ExtractedText.txt", stem(input)))
}

/// One line per file for a batch compression.
pub fn describe_outcome(input: &Path, outcome: &FileOutcome) -> String {
    let file = name(input);
    match outcome {
        FileOutcome::Compressed { before, after } => format!(
            "{file}: {} -> {}",
            format_size(*before),
            format_size(*after)
        ),
        FileOutcome::SkippedTooSmall { size } => {
            format!("{file}: {} is too small to compress, copied", format_size(*size))
        }
        FileOutcome::NotSmaller { before, after } => format!(
            "{file}: compressed size {} is not below {}, kept original",
            format_size(*after),
            format_size(*before)
        ),
        FileOutcome::Failed { reason } => format!("{file}: failed ({reason})"),
    }
}

pub fn compress(
    config: &AppConfig,
    files: Vec<PathBuf>,
    out_dir: &Path,
    quality: u8,
    reporter: &Reporter,
) -> Result<String> {
    let ghostscript = Ghostscript::locate(config.ghostscript_path.as_deref())?;
    let options = BatchOptions {
        quality,
        ..BatchOptions::from(config)
    };
    compress_batch(ghostscript, options, files, out_dir, reporter)
}

/// Batch compression with an already located Ghostscript.
pub fn compress_batch<R: CommandRunner>(
    ghostscript: Ghostscript<R>,
    options: BatchOptions,
    files: Vec<PathBuf>,
    out_dir: &Path,
    reporter: &Reporter,
) -> Result<String> {
    let target = out_dir.join(COMPRESSED_DIR);
    reporter.log(format!(
        "Compressing {} file(s) at quality {}",
        files.len(),
        options.quality
    ));

    let report = BatchCompressor::new(ghostscript, options).compress_all(
        &files,
        &target,
        |done, total, result| {
            reporter.log(format!(
                "[{done}/{total}] {}",
                describe_outcome(&result.input, &result.outcome)
            ));
            reporter.progress(done, total);
        },
    )?;

    Ok(format!(
        "Compressed {} of {} file(s) into {}",
        report.compressed_count(),
        report.total(),
        target.display()
    ))
}

/// Preset compression: one Ghostscript run per file, no size checks.
pub fn compress_with_preset(
    config: &AppConfig,
    files: Vec<PathBuf>,
    out_dir: &Path,
    quality: u8,
    reporter: &Reporter,
) -> Result<String> {
    let ghostscript = Ghostscript::locate(config.ghostscript_path.as_deref())?;
    preset_batch(&ghostscript, files, out_dir, quality, reporter)
}

pub fn preset_batch<R: CommandRunner>(
    ghostscript: &Ghostscript<R>,
    files: Vec<PathBuf>,
    out_dir: &Path,
    quality: u8,
    reporter: &Reporter,
) -> Result<String> {
    let target = out_dir.join(COMPRESSED_DIR);
    std::fs::create_dir_all(&target)?;

    let total = files.len();
    let mut done = 0;
    for (index, input) in files.iter().enumerate() {
        let output = target.join(compressed_name(input));
        match ghostscript.compress_with_preset(input, &output, quality) {
            Ok(()) => {
                done += 1;
                reporter.log(format!("{}: written {}", name(input), name(&output)));
            }
            Err(err) => reporter.log(format!("{}: failed ({err})", name(input))),
        }
        reporter.progress(index + 1, total);
    }

    Ok(format!("Compressed {done} of {total} file(s) into {}", target.display()))
}

pub fn merge(
    files: Vec<PathBuf>,
    output: PathBuf,
    fit_a4: bool,
    reporter: &Reporter,
) -> Result<String> {
    let layout = if fit_a4 {
        MergeLayout::Fit(PaperSize::A4)
    } else {
        MergeLayout::Preserve
    };
    reporter.log(format!("Merging {} file(s)", files.len()));
    let report = ops::merge_files(&files, &output, layout)?;
    Ok(format!(
        "Merged {} file(s), {} page(s) into {}",
        report.files,
        report.pages,
        report.output.display()
    ))
}

pub fn split(input: PathBuf, after: Option<u32>, out_dir: &Path, reporter: &Reporter) -> Result<String> {
    let target = out_dir.join(SPLIT_DIR);
    match after {
        Some(after) => {
            let (first, second) = ops::split_at(&input, after, &target)?;
            Ok(format!(
                "Split {} into {} and {}",
                name(&input),
                name(&first),
                name(&second)
            ))
        }
        None => {
            let total = ops::page_count(&input)? as usize;
            let mut done = 0;
            let written = ops::split_into_pages(&input, &target, |_| {
                done += 1;
                reporter.progress(done, total);
            })?;
            Ok(format!(
                "Split {} into {} page file(s) in {}",
                name(&input),
                written.len(),
                target.display()
            ))
        }
    }
}

pub fn remove_pages(input: PathBuf, pages: &str, out_dir: &Path) -> Result<String> {
    let selection = PageSelection::parse(pages)?;
    let output = cleaned_path(out_dir, &input);
    let report = ops::remove_pages(&input, &selection, &output)?;
    Ok(format!(
        "Removed {} page(s), {} left, saved {}",
        report.removed,
        report.remaining,
        report.output.display()
    ))
}

pub fn extract_text(input: PathBuf, out_dir: &Path) -> Result<String> {
    let output = text_path(out_dir, &input);
    let pages = ops::extract_text(&input, &output)?;
    Ok(format!(
        "Extracted text of {pages} page(s) to {}",
        output.display()
    ))
}

pub fn extract_embedded_images(input: PathBuf, out_dir: &Path, reporter: &Reporter) -> Result<String> {
    let target = out_dir.join(IMAGES_DIR);
    let report = extract_images(&input, &target)?;
    if report.skipped > 0 {
        reporter.log(format!(
            "{} image(s) use an unsupported encoding and were skipped",
            report.skipped
        ));
    }
    Ok(format!(
        "Extracted {} image(s) to {}",
        report.written.len(),
        target.display()
    ))
}

pub fn to_images(
    config: &AppConfig,
    input: PathBuf,
    format: RasterFormat,
    dpi: u32,
    out_dir: &Path,
    reporter: &Reporter,
) -> Result<String> {
    let target = out_dir.join(EXPORTED_DIR);
    let renderer = PageRenderer::bind(config.pdfium_library_dir.as_deref())?;
    let written = renderer.render_to_dir(&input, &target, format, dpi, |done, total| {
        reporter.progress(done as usize, total as usize)
    })?;
    Ok(format!(
        "Exported {} page image(s) ({format}, {dpi} dpi) to {}",
        written.len(),
        target.display()
    ))
}

pub fn print(input: PathBuf) -> Result<String> {
    let spooler = print_file(&SystemRunner, &input)?;
    Ok(format!("Sent {} to the printer via {spooler}", name(&input)))
}

/// `n. name  pages  size` per file, in list order.
pub fn list(files: Vec<PathBuf>) -> Vec<String> {
    files
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let pages = ops::page_count(path)
                .map(|count| format!("{count} page(s)"))
                .unwrap_or_else(|err| format!("unreadable: {err}"));
            let size = std::fs::metadata(path)
                .map(|meta| format_size(meta.len()))
                .unwrap_or_else(|_| "-".to_string());
            format!("{:>3}. {}  {}  {}", index + 1, name(path), pages, size)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::sync::{Arc, Mutex};

    use pdfpress_document::process::CommandOutput;

    use super::*;
    use crate::services::worker::run_action;
    use crate::state::ActivityLog;

    /// Writes `len` bytes to the `-sOutputFile=` target and remembers the
    /// `-dPDFSETTINGS=` value of every call.
    #[derive(Clone, Default)]
    struct WritingRunner {
        len: usize,
        presets: Arc<Mutex<Vec<String>>>,
    }

    impl CommandRunner for WritingRunner {
        fn run(&self, _program: &Path, args: &[OsString]) -> Result<CommandOutput> {
            let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
            if let Some(preset) = args.iter().find_map(|a| a.strip_prefix("-dPDFSETTINGS=")) {
                self.presets.lock().unwrap().push(preset.to_string());
            }
            if let Some(output) = args.iter().find_map(|a| a.strip_prefix("-sOutputFile=")) {
                std::fs::write(output, vec![b'%'; self.len])?;
            }
            Ok(CommandOutput {
                success: true,
                code: Some(0),
                stderr: String::new(),
            })
        }
    }

    fn write_inputs(dir: &Path, files: &[(&str, usize)]) -> Vec<PathBuf> {
        files
            .iter()
            .map(|(name, len)| {
                let path = dir.join(name);
                std::fs::write(&path, vec![b'x'; *len]).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn preset_compression_runs_once_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[("a.pdf", 500), ("b.pdf", 500)]);
        let runner = WritingRunner {
            len: 10,
            ..WritingRunner::default()
        };
        let presets = runner.presets.clone();
        let ghostscript = Ghostscript::with_runner(PathBuf::from("gs"), runner);
        let out_dir = dir.path().to_path_buf();

        let mut log = ActivityLog::new(false);
        let summary = run_action("Compress", &mut log, move |reporter| {
            preset_batch(&ghostscript, inputs, &out_dir, 30, &reporter)
        })
        .await
        .unwrap();

        assert!(summary.starts_with("Compressed 2 of 2 file(s)"), "{summary}");
        let target = dir.path().join(COMPRESSED_DIR);
        assert_eq!(std::fs::metadata(target.join("a_compressed.pdf")).unwrap().len(), 10);
        assert!(target.join("b_compressed.pdf").is_file());
        assert_eq!(*presets.lock().unwrap(), vec!["/screen", "/screen"]);
        assert!(log.lines().iter().any(|l| l.ends_with("a.pdf: written a_compressed.pdf")));
    }

    #[tokio::test]
    async fn batch_logs_each_outcome_as_it_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path(), &[("big.pdf", 200_000), ("tiny.pdf", 900)]);
        let ghostscript = Ghostscript::with_runner(
            PathBuf::from("gs"),
            WritingRunner {
                len: 50_000,
                ..WritingRunner::default()
            },
        );
        let out_dir = dir.path().to_path_buf();

        let mut log = ActivityLog::new(false);
        run_action("Compress", &mut log, move |reporter| {
            compress_batch(ghostscript, BatchOptions::default(), inputs, &out_dir, &reporter)
        })
        .await
        .unwrap();

        let lines = log.lines();
        let first = lines.iter().position(|l| l.contains("[1/2] big.pdf: ")).unwrap();
        let progress = lines.iter().position(|l| l.ends_with("Progress: 1/2")).unwrap();
        let second = lines.iter().position(|l| l.contains("[2/2] tiny.pdf: 900 B is too small")).unwrap();
        assert!(first < progress && progress < second);
    }

    #[test]
    fn output_paths_follow_naming_scheme() {
        let out = Path::new("/out");
        let input = Path::new("/docs/Invoice 7.pdf");
        assert_eq!(
            cleaned_path(out, input),
            PathBuf::from("/out/Cleaned/Invoice 7_cleaned.pdf")
        );
        assert_eq!(
            text_path(out, input),
            PathBuf::from("/out/ExtractedText/Invoice 7_ExtractedText.txt")
        );
    }

    #[test]
    fn outcomes_read_naturally() {
        let input = Path::new("scan.pdf");
        assert_eq!(
            describe_outcome(input, &FileOutcome::Compressed { before: 2_000_000, after: 500_000 }),
            "scan.pdf: 2.00 MB -> 500.00 KB"
        );
        assert_eq!(
            describe_outcome(input, &FileOutcome::SkippedTooSmall { size: 900 }),
            "scan.pdf: 900 B is too small to compress, copied"
        );
        assert!(
            describe_outcome(input, &FileOutcome::Failed { reason: "no output".into() })
                .ends_with("failed (no output)")
        );
    }

    #[test]
    fn list_marks_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.pdf");
        std::fs::write(&bogus, b"not a pdf").unwrap();

        let lines = list(vec![bogus]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("  1. bogus.pdf  unreadable"));
        assert!(lines[0].ends_with("9 B"));
    }

    #[test]
    fn invalid_page_selection_is_reported_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let result = remove_pages(dir.path().join("missing.pdf"), "  ", dir.path());
        assert!(matches!(
            result,
            Err(pdfpress_core::PdfpressError::InvalidPageSelection(_))
        ));
    }
}
