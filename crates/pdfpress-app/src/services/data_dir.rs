// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution (config.json and log.txt live here).

use std::ffi::OsString;
use std::path::PathBuf;

/// Overrides the data directory entirely.
pub const DATA_DIR_ENV: &str = "PDFPRESS_DATA_DIR";

const APP_DIR: &str = "pdfpress";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = resolve(
        std::env::var_os(DATA_DIR_ENV),
        std::env::var_os("XDG_DATA_HOME"),
        std::env::var_os("HOME"),
    );
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Pick the data directory from the override, XDG, and home variables, in
/// that order. Empty values count as unset.
fn resolve(
    override_dir: Option<OsString>,
    xdg_data_home: Option<OsString>,
    home: Option<OsString>,
) -> PathBuf {
    let set = |value: Option<OsString>| value.filter(|v| !v.is_empty()).map(PathBuf::from);

    if let Some(dir) = set(override_dir) {
        return dir;
    }
    if let Some(xdg) = set(xdg_data_home) {
        return xdg.join(APP_DIR);
    }
    if let Some(home) = set(home) {
        return home.join(".local").join("share").join(APP_DIR);
    }
    // Last resort
    std::env::temp_dir().join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(value: &str) -> Option<OsString> {
        Some(OsString::from(value))
    }

    #[test]
    fn override_wins() {
        assert_eq!(
            resolve(os("/data"), os("/xdg"), os("/home/u")),
            PathBuf::from("/data")
        );
    }

    #[test]
    fn xdg_before_home() {
        assert_eq!(
            resolve(None, os("/xdg"), os("/home/u")),
            PathBuf::from("/xdg/pdfpress")
        );
    }

    #[test]
    fn home_fallback() {
        assert_eq!(
            resolve(os(""), None, os("/home/u")),
            PathBuf::from("/home/u/.local/share/pdfpress")
        );
    }

    #[test]
    fn temp_as_last_resort() {
        assert_eq!(resolve(None, None, None), std::env::temp_dir().join("pdfpress"));
    }
}
