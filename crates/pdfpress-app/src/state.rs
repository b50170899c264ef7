// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session state: the file list being worked on and the activity log shown to
// the user.

use std::path::PathBuf;

use chrono::{Local, NaiveTime};
use pdfpress_core::{AddReport, AppConfig, FileList};
use tracing::info;

/// Timestamped lines describing what the current run did.
///
/// Every line is mirrored to `tracing` (and so to `log.txt`); with `echo`
/// set it is also printed to stdout as it happens.
#[derive(Debug, Default)]
pub struct ActivityLog {
    lines: Vec<String>,
    echo: bool,
}

impl ActivityLog {
    pub fn new(echo: bool) -> Self {
        Self {
            lines: Vec::new(),
            echo,
        }
    }

    pub fn push(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(target: "activity", "{message}");
        let line = format_line(Local::now().time(), message);
        if self.echo {
            println!("{line}");
        }
        self.lines.push(line);
    }

    pub fn progress(&mut self, done: usize, total: usize) {
        self.push(format!("Progress: {done}/{total}"));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// `HH:MM:SS - message`.
pub fn format_line(time: NaiveTime, message: &str) -> String {
    format!("{} - {}", time.format("%H:%M:%S"), message)
}

/// What one command invocation works on.
#[derive(Debug)]
pub struct AppState {
    pub files: FileList,
    pub config: AppConfig,
    pub activity: ActivityLog,
}

impl AppState {
    pub fn new(config: AppConfig, activity: ActivityLog) -> Self {
        Self {
            files: FileList::new(),
            config,
            activity,
        }
    }

    /// Add paths to the file list and log what was skipped.
    pub fn load_files(&mut self, paths: Vec<PathBuf>) -> AddReport {
        let report = self.files.add_files(paths);
        for path in &report.rejected {
            self.activity
                .push(format!("Skipped {} (not a PDF)", path.display()));
        }
        for path in &report.duplicates {
            self.activity
                .push(format!("Skipped {} (already in the list)", path.display()));
        }
        if !report.added.is_empty() {
            self.activity
                .push(format!("Loaded {} file(s)", report.added.len()));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_timestamped() {
        let time = NaiveTime::from_hms_opt(9, 5, 7).unwrap();
        assert_eq!(format_line(time, "Merged 3 files"), "09:05:07 - Merged 3 files");
    }

    #[test]
    fn push_records_formatted_line() {
        let mut log = ActivityLog::new(false);
        log.push("hello");
        log.progress(2, 5);
        assert_eq!(log.lines().len(), 2);
        assert!(log.lines()[0].ends_with(" - hello"));
        assert_eq!(log.lines()[0].len(), "HH:MM:SS - hello".len());
        assert!(log.lines()[1].ends_with(" - Progress: 2/5"));
    }

    #[test]
    fn loading_logs_skipped_files() {
        let mut state = AppState::new(AppConfig::default(), ActivityLog::new(false));
        let report = state.load_files(vec![
            PathBuf::from("b10.pdf"),
            PathBuf::from("notes.txt"),
            PathBuf::from("b2.pdf"),
            PathBuf::from("b2.pdf"),
        ]);

        assert_eq!(report.added, vec![PathBuf::from("b2.pdf"), PathBuf::from("b10.pdf")]);
        assert_eq!(state.files.len(), 2);
        let lines = state.activity.lines();
        assert!(lines.iter().any(|l| l.contains("notes.txt (not a PDF)")));
        assert!(lines.iter().any(|l| l.contains("already in the list")));
        assert!(lines.iter().any(|l| l.ends_with("Loaded 2 file(s)")));
    }
}
