// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External program execution and discovery.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use pdfpress_core::error::Result;
use tracing::debug;

/// What a finished external program reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stderr: String,
}

/// Runs an external program to completion.
///
/// Everything that shells out (Ghostscript, the print spooler) goes through
/// this trait so tests can substitute a runner that never spawns anything.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit. An `Err` means the
    /// program could not be started at all.
    fn run(&self, program: &Path, args: &[OsString]) -> Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<CommandOutput> {
        debug!(program = %program.display(), args = args.len(), "spawning");
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// The directories listed in `PATH`, in order.
pub fn path_dirs() -> Vec<PathBuf> {
    env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// First of `names` found in `dirs`. Names are tried in order, each across
/// every directory, so earlier names win regardless of directory order.
pub fn find_in_dirs(names: &[&str], dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = dirs.into_iter().collect();
    names.iter().find_map(|name| {
        dirs.iter().find_map(|dir| {
            candidates(dir, name).into_iter().find(|candidate| candidate.is_file())
        })
    })
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let plain = dir.join(name);
    let suffix = env::consts::EXE_SUFFIX;
    if suffix.is_empty() || Path::new(name).extension() == Some(OsStr::new(&suffix[1..])) {
        vec![plain]
    } else {
        vec![plain, dir.join(format!("{name}{suffix}"))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn earlier_names_take_priority() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("gs"), b"").unwrap();
        fs::write(second.path().join("gswin64c"), b"").unwrap();

        let found = find_in_dirs(
            &["gswin64c", "gswin32c", "gs"],
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(found, second.path().join("gswin64c"));
    }

    #[test]
    fn directories_are_not_programs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("gs")).unwrap();
        assert!(find_in_dirs(&["gs"], vec![dir.path().to_path_buf()]).is_none());
    }

    #[test]
    fn missing_program_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_in_dirs(&["gs"], vec![dir.path().to_path_buf()]).is_none());
    }
}
