// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application services: the data directory and the persisted configuration.

use std::path::{Path, PathBuf};

use pdfpress_core::error::{PdfpressError, Result};
use pdfpress_core::{AppConfig, RasterFormat};
use tracing::{info, warn};

/// Long-lived state shared by every command.
#[derive(Debug, Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: AppConfig,
}

impl AppServices {
    /// Load `config.json` from `dir`, falling back to defaults when it is
    /// missing or unreadable.
    pub fn open(dir: PathBuf) -> Self {
        info!(path = %dir.display(), "initialising app services");
        let config = load_config(&dir).unwrap_or_default();
        Self {
            data_dir: dir,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Update and persist the config.
    pub fn save_config(&mut self, config: AppConfig) -> Result<()> {
        persist_config(&self.data_dir, &config)?;
        self.config = config;
        Ok(())
    }

    /// Apply `key=value` assignments and persist the result. Nothing is
    /// saved if any assignment is invalid.
    pub fn apply_settings(&mut self, assignments: &[String]) -> Result<()> {
        let mut config = self.config.clone();
        for assignment in assignments {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                PdfpressError::InvalidSetting(format!("expected KEY=VALUE, got \"{assignment}\""))
            })?;
            set_value(&mut config, key.trim(), value.trim())?;
        }
        self.save_config(config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

}

/// `log.txt` inside `data_dir`.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

/// Set one field by its `config.json` name. An empty value clears optional
/// fields.
pub fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<()> {
    fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .parse()
            .map_err(|_| PdfpressError::InvalidSetting(format!("{key} cannot be \"{value}\"")))
    }
    let optional_path = |value: &str| (!value.is_empty()).then(|| PathBuf::from(value));

    match key {
        "license_key" => config.license_key = (!value.is_empty()).then(|| value.to_string()),
        "ghostscript_path" => config.ghostscript_path = optional_path(value),
        "pdfium_library_dir" => config.pdfium_library_dir = optional_path(value),
        "compression_quality" => {
            let quality: u8 = parse(key, value)?;
            if quality > 100 {
                return Err(PdfpressError::InvalidSetting(format!(
                    "{key} must be 0-100, got {quality}"
                )));
            }
            config.compression_quality = quality;
        }
        "min_compress_bytes" => config.min_compress_bytes = parse(key, value)?,
        "min_savings_ratio" => {
            let ratio: f64 = parse(key, value)?;
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(PdfpressError::InvalidSetting(format!(
                    "{key} must be in (0, 1], got {ratio}"
                )));
            }
            config.min_savings_ratio = ratio;
        }
        "image_dpi" => {
            config.image_dpi = pdfpress_document::render::validate_dpi(parse(key, value)?)?;
        }
        "image_format" => config.image_format = RasterFormat::parse(value)?,
        other => {
            return Err(PdfpressError::InvalidSetting(format!(
                "unknown setting \"{other}\""
            )));
        }
    }
    Ok(())
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "log.txt";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
