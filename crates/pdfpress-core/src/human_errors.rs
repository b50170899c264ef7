// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to a plain sentence plus a suggestion. The
// severity picks the prefix the command line prints in front of the message.

use crate::error::PdfpressError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing is wrong with the input; the list or selection needs attention.
    Info,
    /// User must do something (pick a file, install a tool, fix a path).
    ActionRequired,
    /// The input itself cannot be processed.
    Permanent,
}

impl Severity {
    /// Prefix shown in front of the message on the command line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "note",
            Self::ActionRequired => "action needed",
            Self::Permanent => "error",
        }
    }
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `PdfpressError` into a `HumanError`.
pub fn humanize_error(err: &PdfpressError) -> HumanError {
    match err {
        // -- File list --
        PdfpressError::EmptyList => HumanError {
            message: "No PDF files have been added.".into(),
            suggestion: "Add one or more PDF files first.".into(),
            severity: Severity::ActionRequired,
        },

        PdfpressError::NoSelection => HumanError {
            message: "Several files are loaded and none is selected.".into(),
            suggestion: "Select exactly one file for this action.".into(),
            severity: Severity::ActionRequired,
        },

        PdfpressError::AlreadyEmpty => HumanError {
            message: "The file list is already empty.".into(),
            suggestion: "There is nothing to remove.".into(),
            severity: Severity::Info,
        },

        PdfpressError::NotEnoughFiles { required, .. } => HumanError {
            message: format!("Select at least {required} files."),
            suggestion: "Add more PDF files to the list and try again.".into(),
            severity: Severity::ActionRequired,
        },

        // -- Document --
        PdfpressError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or encrypted. Try opening it in a PDF viewer first.".into(),
            severity: Severity::Permanent,
        },

        PdfpressError::NoPagesLeft(name) => HumanError {
            message: format!("PDF \"{name}\" has no pages after removal. Skipped."),
            suggestion: "Choose fewer pages to remove.".into(),
            severity: Severity::Info,
        },

        PdfpressError::InvalidPageSelection(detail) => HumanError {
            message: "The page list could not be understood.".into(),
            suggestion: format!("Use numbers and ranges like 1,3-5, or the words even / odd. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PdfpressError::ImageError(_) => HumanError {
            message: "An image could not be processed.".into(),
            suggestion: "The embedded image may use an unusual encoding.".into(),
            severity: Severity::Permanent,
        },

        PdfpressError::UnsupportedFormat(format) => HumanError {
            message: format!("Unsupported format: {format}"),
            suggestion: "Choose one of png, jpg, bmp or tiff.".into(),
            severity: Severity::ActionRequired,
        },

        PdfpressError::InvalidDpi(dpi) => HumanError {
            message: format!("A resolution of {dpi} DPI is not supported."),
            suggestion: "Pick a DPI between 30 and 1200.".into(),
            severity: Severity::ActionRequired,
        },

        PdfpressError::RenderError(_) => HumanError {
            message: "Pages could not be rendered.".into(),
            suggestion: "Make sure the PDFium library is installed, or set pdfium_library_dir in the config.".into(),
            severity: Severity::ActionRequired,
        },

        // -- External tools --
        PdfpressError::GhostscriptNotFound => HumanError {
            message: "Ghostscript executable not found.".into(),
            suggestion: "Install Ghostscript, or set ghostscript_path in the config.".into(),
            severity: Severity::ActionRequired,
        },

        PdfpressError::GhostscriptFailed(detail) => HumanError {
            message: "Compression failed.".into(),
            suggestion: format!("Ghostscript could not process the file. ({detail})"),
            severity: Severity::Permanent,
        },

        PdfpressError::PrintError(_) => HumanError {
            message: "No application is associated with printing this file.".into(),
            suggestion: "Make sure a printer and the lp or lpr command are set up.".into(),
            severity: Severity::ActionRequired,
        },

        // -- Storage --
        PdfpressError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Permission denied while reading or writing a file.".into(),
                    suggestion: "Check the permissions, or choose a different output folder.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::Permanent,
                }
            }
        }

        PdfpressError::Serialization(_) => HumanError {
            message: "The configuration file could not be read or written.".into(),
            suggestion: "Check config.json in the data directory, or delete it to restore defaults.".into(),
            severity: Severity::ActionRequired,
        },

        PdfpressError::InvalidSetting(detail) => HumanError {
            message: format!("That setting could not be changed: {detail}."),
            suggestion: "Run `pdfpress config` to see the available settings.".into(),
            severity: Severity::ActionRequired,
        },

        PdfpressError::Worker(_) => HumanError {
            message: "The operation stopped unexpectedly.".into(),
            suggestion: "Try again. Details were written to the log file.".into(),
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_asks_for_files() {
        let human = humanize_error(&PdfpressError::EmptyList);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn already_empty_is_informational() {
        let human = humanize_error(&PdfpressError::AlreadyEmpty);
        assert_eq!(human.severity, Severity::Info);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = PdfpressError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("couldn't be found"));
    }

    #[test]
    fn no_pages_left_names_the_file() {
        let human = humanize_error(&PdfpressError::NoPagesLeft("report.pdf".into()));
        assert!(human.message.contains("report.pdf"));
    }

    #[test]
    fn severity_labels() {
        assert_eq!(humanize_error(&PdfpressError::AlreadyEmpty).severity.label(), "note");
        assert_eq!(humanize_error(&PdfpressError::NoSelection).severity.label(), "action needed");
        assert_eq!(Severity::Permanent.label(), "error");
    }

    #[test]
    fn broken_pdf_is_permanent() {
        let human = humanize_error(&PdfpressError::PdfError("xref".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
