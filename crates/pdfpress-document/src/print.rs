// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hand a document to the system print spooler.

use std::ffi::OsString;
use std::path::Path;

use pdfpress_core::error::{PdfpressError, Result};
use tracing::{info, instrument, warn};

use crate::process::CommandRunner;

/// Spooler commands tried in order.
const SPOOLERS: &[&str] = &["lp", "lpr"];

/// Send `file` to the default printer. Returns the spooler that accepted it.
#[instrument(skip(runner))]
pub fn print_file(runner: &impl CommandRunner, file: &Path) -> Result<&'static str> {
    if !file.is_file() {
        return Err(PdfpressError::PrintError(format!(
            "{} does not exist",
            file.display()
        )));
    }

    let args = [OsString::from(file.as_os_str())];
    let mut failures = Vec::new();
    for spooler in SPOOLERS.iter().copied() {
        match runner.run(Path::new(spooler), &args) {
            Ok(output) if output.success => {
                info!(spooler, "Sent to printer");
                return Ok(spooler);
            }
            Ok(output) => {
                warn!(spooler, stderr = %output.stderr, "spooler rejected the job");
                failures.push(format!("{}: {}", spooler, output.stderr));
            }
            Err(err) => {
                warn!(spooler, %err, "spooler unavailable");
                failures.push(format!("{}: {}", spooler, err));
            }
        }
    }

    Err(PdfpressError::PrintError(failures.join("; ")))
}
