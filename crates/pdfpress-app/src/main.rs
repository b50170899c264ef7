// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfpress: merge, split, compress, extract and rasterise PDF files.
//
// Entry point. Initialises logging and services, then runs the requested
// command on a background worker.

mod cli;
mod services;
mod state;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use tracing::Subscriber;

use clap::Parser;
use pdfpress_core::error::Result;
use pdfpress_core::human_errors::humanize_error;
use pdfpress_core::RasterFormat;
use pdfpress_document::render::validate_dpi;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, Command, SingleFileArgs};
use services::actions;
use services::app_services::{self, AppServices};
use services::data_dir;
use services::worker::run_action;
use state::{ActivityLog, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let data_dir = data_dir::data_dir();
    subscriber(&app_services::log_path(&data_dir)).init();
    let services = AppServices::open(data_dir);
    tracing::info!(data_dir = %services.data_dir().display(), "pdfpress starting");

    match run(cli.command, services).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}: {}", human.severity.label(), human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

/// Stderr shows warnings unless `RUST_LOG` says otherwise; `log.txt` gets
/// everything at `info` and above.
fn subscriber(log_path: &Path) -> impl Subscriber + Send + Sync + use<> {
    let filter = |default: &str| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter("warn"));

    let file_layer = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .ok()
        .map(|file| {
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter("info"))
        });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
}

fn selected(state: &AppState, file: &SingleFileArgs) -> Result<PathBuf> {
    Ok(state.files.select_single(file.selected_index())?.path.clone())
}

fn paths(state: &AppState) -> Vec<PathBuf> {
    state.files.items().iter().map(|item| item.path.clone()).collect()
}

async fn run(command: Command, mut services: AppServices) -> Result<()> {
    let mut state = AppState::new(services.config().clone(), ActivityLog::new(true));
    let config = state.config.clone();

    let summary = match command {
        Command::Compress {
            files,
            quality,
            preset,
            output,
        } => {
            state.load_files(files.files);
            let inputs = state.files.require_at_least(1).map(|_| paths(&state))?;
            let quality = quality.unwrap_or(config.compression_quality);
            let out_dir = output.output_dir;
            run_action("Compress", &mut state.activity, move |reporter| {
                if preset {
                    actions::compress_with_preset(&config, inputs, &out_dir, quality, &reporter)
                } else {
                    actions::compress(&config, inputs, &out_dir, quality, &reporter)
                }
            })
            .await?
        }

        Command::Merge {
            files,
            output_file,
            fit_a4,
            output,
        } => {
            state.load_files(files.files);
            let inputs = state.files.require_at_least(2).map(|_| paths(&state))?;
            let target =
                output_file.unwrap_or_else(|| output.output_dir.join(actions::MERGED_FILE));
            run_action("Merge", &mut state.activity, move |reporter| {
                actions::merge(inputs, target, fit_a4, &reporter)
            })
            .await?
        }

        Command::Split {
            file,
            after,
            output,
        } => {
            state.load_files(file.files.files.clone());
            let input = selected(&state, &file)?;
            run_action("Split", &mut state.activity, move |reporter| {
                actions::split(input, after, &output.output_dir, &reporter)
            })
            .await?
        }

        Command::RemovePages {
            file,
            pages,
            output,
        } => {
            state.load_files(file.files.files.clone());
            let input = selected(&state, &file)?;
            run_action("Remove pages", &mut state.activity, move |_| {
                actions::remove_pages(input, &pages, &output.output_dir)
            })
            .await?
        }

        Command::ExtractText { file, output } => {
            state.load_files(file.files.files.clone());
            let input = selected(&state, &file)?;
            run_action("Extract text", &mut state.activity, move |_| {
                actions::extract_text(input, &output.output_dir)
            })
            .await?
        }

        Command::ExtractImages { file, output } => {
            state.load_files(file.files.files.clone());
            let input = selected(&state, &file)?;
            run_action("Extract images", &mut state.activity, move |reporter| {
                actions::extract_embedded_images(input, &output.output_dir, &reporter)
            })
            .await?
        }

        Command::ToImages {
            file,
            format,
            dpi,
            output,
        } => {
            state.load_files(file.files.files.clone());
            let input = selected(&state, &file)?;
            let format = match format {
                Some(name) => RasterFormat::parse(&name)?,
                None => config.image_format,
            };
            let dpi = validate_dpi(dpi.unwrap_or(config.image_dpi))?;
            run_action("Export images", &mut state.activity, move |reporter| {
                actions::to_images(&config, input, format, dpi, &output.output_dir, &reporter)
            })
            .await?
        }

        Command::Print { file } => {
            state.load_files(file.files.files.clone());
            let input = selected(&state, &file)?;
            run_action("Print", &mut state.activity, move |_| actions::print(input)).await?
        }

        Command::List { files } => {
            state.load_files(files.files);
            let inputs = state.files.require_at_least(1).map(|_| paths(&state))?;
            let lines = run_action("List", &mut state.activity, move |_| {
                Ok(actions::list(inputs))
            })
            .await?;
            for line in &lines {
                println!("{line}");
            }
            format!("{} file(s)", lines.len())
        }

        Command::Config { set } => {
            if !set.is_empty() {
                services.apply_settings(&set)?;
                state.activity.push(format!("Saved {}", services.config_path().display()));
            }
            println!("# {}", services.config_path().display());
            println!("{}", serde_json::to_string_pretty(services.config())?);
            return Ok(());
        }
    };

    state.activity.push(summary);
    tracing::debug!(lines = state.activity.lines().len(), "activity recorded");
    Ok(())
}
