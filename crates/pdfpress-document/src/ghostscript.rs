// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ghostscript driver: argument construction and invocation of the `pdfwrite`
// device for PDF-to-PDF compression.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use pdfpress_core::error::{PdfpressError, Result};
use tracing::{debug, info, instrument, warn};

use crate::process::{CommandRunner, SystemRunner, find_in_dirs, path_dirs};

/// Executable names tried on `PATH`, in order.
pub const GHOSTSCRIPT_NAMES: &[&str] = &["gswin64c", "gswin32c", "gs"];

/// Find Ghostscript: the configured path if it exists, otherwise the first
/// known executable name on `PATH`.
pub fn locate_ghostscript(configured: Option<&Path>) -> Option<PathBuf> {
    locate_ghostscript_in(configured, path_dirs())
}

/// [`locate_ghostscript`] with an explicit list of search directories.
pub fn locate_ghostscript_in(
    configured: Option<&Path>,
    dirs: impl IntoIterator<Item = PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "configured Ghostscript not found, searching PATH");
    }
    find_in_dirs(GHOSTSCRIPT_NAMES, dirs)
}

/// A `-dPDFSETTINGS` preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsPreset {
    Screen,
    Ebook,
    Printer,
    Prepress,
}

impl GsPreset {
    /// Map a 0-100 quality onto the closest preset.
    pub fn from_quality(quality: u8) -> Self {
        match quality {
            0..=40 => Self::Screen,
            41..=70 => Self::Ebook,
            71..=90 => Self::Printer,
            _ => Self::Prepress,
        }
    }

    pub fn as_setting(self) -> &'static str {
        match self {
            Self::Screen => "/screen",
            Self::Ebook => "/ebook",
            Self::Printer => "/printer",
            Self::Prepress => "/prepress",
        }
    }
}

impl fmt::Display for GsPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_setting())
    }
}

/// Image downsampling settings for batch compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Colour and gray image resolution in dpi.
    pub resolution: u32,
    /// DCT (JPEG) quality.
    pub jpeg_quality: u8,
}

impl CompressionSettings {
    pub fn from_quality(quality: u8) -> Self {
        let resolution = if quality >= 90 {
            200
        } else if quality >= 75 {
            150
        } else {
            100
        };
        Self {
            resolution,
            jpeg_quality: quality.clamp(30, 95),
        }
    }
}

fn output_arg(output: &Path) -> OsString {
    let mut arg = OsString::from("-sOutputFile=");
    arg.push(output.as_os_str());
    arg
}

fn trailing_args(args: &mut Vec<OsString>, input: &Path, output: &Path) {
    args.extend(["-dNOPAUSE", "-dQUIET", "-dBATCH"].map(OsString::from));
    args.push(output_arg(output));
    args.push(input.as_os_str().to_os_string());
}

/// Arguments for a plain preset compression.
pub fn preset_args(preset: GsPreset, input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-sDEVICE=pdfwrite".into(),
        "-dCompatibilityLevel=1.4".into(),
        format!("-dPDFSETTINGS={}", preset.as_setting()).into(),
    ];
    trailing_args(&mut args, input, output);
    args
}

/// Arguments for batch compression with forced JPEG re-encoding and
/// downsampling.
pub fn downsample_args(settings: CompressionSettings, input: &Path, output: &Path) -> Vec<OsString> {
    let resolution = settings.resolution;
    let mut args: Vec<OsString> = [
        "-sDEVICE=pdfwrite".to_string(),
        "-dCompatibilityLevel=1.4".to_string(),
        "-dPDFSETTINGS=/default".to_string(),
        "-dAutoFilterColorImages=false".to_string(),
        "-dAutoFilterGrayImages=false".to_string(),
        "-dColorImageFilter=/DCTEncode".to_string(),
        "-dGrayImageFilter=/DCTEncode".to_string(),
        "-dDownsampleColorImages=true".to_string(),
        "-dDownsampleGrayImages=true".to_string(),
        format!("-dColorImageResolution={resolution}"),
        format!("-dGrayImageResolution={resolution}"),
        format!("-dJPEGQ={}", settings.jpeg_quality),
        "-dMonoImageDownsampleType=/Subsample".to_string(),
        "-dDownsampleMonoImages=true".to_string(),
        "-dMonoImageResolution=300".to_string(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    trailing_args(&mut args, input, output);
    args
}

/// A located Ghostscript executable plus the runner that invokes it.
pub struct Ghostscript<R = SystemRunner> {
    executable: PathBuf,
    runner: R,
}

impl Ghostscript<SystemRunner> {
    /// Locate Ghostscript and drive it with real processes.
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        Self::locate_in(configured, path_dirs())
    }

    /// [`Ghostscript::locate`] searching `dirs` instead of `PATH`.
    pub fn locate_in(
        configured: Option<&Path>,
        dirs: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Self> {
        let executable =
            locate_ghostscript_in(configured, dirs).ok_or(PdfpressError::GhostscriptNotFound)?;
        info!(executable = %executable.display(), "Ghostscript found");
        Ok(Self::with_runner(executable, SystemRunner))
    }
}

impl<R: CommandRunner> Ghostscript<R> {
    pub fn with_runner(executable: PathBuf, runner: R) -> Self {
        Self { executable, runner }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Compress `input` into `output` with the preset for `quality`.
    #[instrument(skip(self))]
    pub fn compress_with_preset(&self, input: &Path, output: &Path, quality: u8) -> Result<()> {
        let preset = GsPreset::from_quality(quality);
        debug!(%preset, "preset compression");
        self.run(&preset_args(preset, input, output), output)
    }

    /// Compress `input` into `output` with explicit downsampling settings.
    #[instrument(skip(self))]
    pub fn compress_downsampled(
        &self,
        input: &Path,
        output: &Path,
        settings: CompressionSettings,
    ) -> Result<()> {
        self.run(&downsample_args(settings, input, output), output)
    }

    /// Run Ghostscript and check that it produced `output`.
    ///
    /// Success is decided by the output file alone. A nonzero exit status
    /// with an output file present is logged and otherwise ignored.
    pub fn run(&self, args: &[OsString], output: &Path) -> Result<()> {
        let result = self.runner.run(&self.executable, args)?;
        let code = result
            .code
            .map_or_else(|| "signal".to_string(), |code| code.to_string());

        if !output.is_file() {
            return Err(PdfpressError::GhostscriptFailed(format!(
                "no output written to {} (exit status {}{}{})",
                output.display(),
                code,
                if result.stderr.is_empty() { "" } else { ": " },
                result.stderr
            )));
        }

        if !result.success {
            warn!(
                output = %output.display(),
                status = %code,
                stderr = %result.stderr,
                "Ghostscript exited with an error but wrote its output"
            );
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeGhostscript;
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn preset_boundaries() {
        assert_eq!(GsPreset::from_quality(0), GsPreset::Screen);
        assert_eq!(GsPreset::from_quality(40), GsPreset::Screen);
        assert_eq!(GsPreset::from_quality(41), GsPreset::Ebook);
        assert_eq!(GsPreset::from_quality(70), GsPreset::Ebook);
        assert_eq!(GsPreset::from_quality(90), GsPreset::Printer);
        assert_eq!(GsPreset::from_quality(91), GsPreset::Prepress);
    }

    #[test]
    fn settings_follow_quality() {
        assert_eq!(
            CompressionSettings::from_quality(95),
            CompressionSettings { resolution: 200, jpeg_quality: 95 }
        );
        assert_eq!(CompressionSettings::from_quality(100).jpeg_quality, 95);
        assert_eq!(CompressionSettings::from_quality(75).resolution, 150);
        assert_eq!(CompressionSettings::from_quality(74).resolution, 100);
        assert_eq!(CompressionSettings::from_quality(10).jpeg_quality, 30);
    }

    #[test]
    fn preset_argument_list() {
        let args = preset_args(GsPreset::Ebook, Path::new("in.pdf"), Path::new("out.pdf"));
        assert_eq!(
            strings(&args),
            vec![
                "-sDEVICE=pdfwrite",
                "-dCompatibilityLevel=1.4",
                "-dPDFSETTINGS=/ebook",
                "-dNOPAUSE",
                "-dQUIET",
                "-dBATCH",
                "-sOutputFile=out.pdf",
                "in.pdf",
            ]
        );
    }

    #[test]
    fn downsample_argument_list() {
        let settings = CompressionSettings::from_quality(80);
        let args = strings(&downsample_args(settings, Path::new("a.pdf"), Path::new("b.pdf")));
        assert_eq!(args.len(), 20);
        assert!(args.contains(&"-dColorImageResolution=150".to_string()));
        assert!(args.contains(&"-dGrayImageResolution=150".to_string()));
        assert!(args.contains(&"-dJPEGQ=80".to_string()));
        assert_eq!(args[args.len() - 2], "-sOutputFile=b.pdf");
        assert_eq!(args[args.len() - 1], "a.pdf");
    }

    #[test]
    fn success_requires_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");

        let silent = FakeGhostscript::silent();
        let gs = Ghostscript::with_runner(PathBuf::from("gs"), &silent);
        assert!(matches!(
            gs.compress_with_preset(Path::new("in.pdf"), &output, 50),
            Err(PdfpressError::GhostscriptFailed(_))
        ));

        let writing = FakeGhostscript::writing(10);
        let gs = Ghostscript::with_runner(PathBuf::from("gs"), &writing);
        gs.compress_with_preset(Path::new("in.pdf"), &output, 50).unwrap();
        assert_eq!(fs::metadata(&output).unwrap().len(), 10);
        assert_eq!(writing.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn nonzero_exit_with_output_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let failing = FakeGhostscript::failing(10);
        let gs = Ghostscript::with_runner(PathBuf::from("gs"), &failing);

        gs.compress_with_preset(Path::new("in.pdf"), &output, 50).unwrap();
        assert_eq!(fs::metadata(&output).unwrap().len(), 10);
    }

    #[test]
    fn nonzero_exit_without_output_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let crashed = FakeGhostscript {
            output_len: None,
            success: false,
            calls: Default::default(),
        };
        let gs = Ghostscript::with_runner(PathBuf::from("gs"), &crashed);

        match gs.compress_with_preset(Path::new("in.pdf"), &output, 50) {
            Err(PdfpressError::GhostscriptFailed(detail)) => {
                assert!(detail.contains("exit status 1"), "{detail}");
            }
            other => panic!("expected a Ghostscript failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_ghostscript_is_reported() {
        let empty = tempfile::tempdir().unwrap();
        let configured = empty.path().join("not-installed").join("gs");

        assert!(locate_ghostscript_in(Some(&configured), vec![empty.path().to_path_buf()]).is_none());
        assert!(matches!(
            Ghostscript::locate_in(Some(&configured), vec![empty.path().to_path_buf()]),
            Err(PdfpressError::GhostscriptNotFound)
        ));
        assert!(matches!(
            Ghostscript::locate_in(None, Vec::new()),
            Err(PdfpressError::GhostscriptNotFound)
        ));
    }

    #[test]
    fn search_dirs_are_used_when_configured_path_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("gs"), b"").unwrap();
        let found = Ghostscript::locate_in(
            Some(Path::new("/nonexistent/gs")),
            vec![dir.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(found.executable(), dir.path().join("gs"));
    }

    #[test]
    fn configured_path_wins_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("my-gs");
        fs::write(&exe, b"").unwrap();
        assert_eq!(locate_ghostscript(Some(&exe)), Some(exe));
    }
}
