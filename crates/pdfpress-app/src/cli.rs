// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Merge, split, compress, extract and rasterise PDF files.
#[derive(Parser, Debug)]
#[command(name = "pdfpress", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress every file with Ghostscript into <OUTPUT_DIR>/Compressed.
    Compress {
        #[command(flatten)]
        files: FileArgs,

        /// Quality 0-100 (default from config).
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        quality: Option<u8>,

        /// Use a plain Ghostscript preset instead of downsampling, with no
        /// size checks.
        #[arg(long)]
        preset: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Merge the files, in list order, into one document.
    Merge {
        #[command(flatten)]
        files: FileArgs,

        /// Output file (default: <OUTPUT_DIR>/Merged.pdf).
        #[arg(short = 'O', long, value_hint = ValueHint::FilePath)]
        output_file: Option<PathBuf>,

        /// Place every page centred on an A4 sheet.
        #[arg(long)]
        fit_a4: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write each page to <OUTPUT_DIR>/SplitPages/Page_<n>.pdf, or split in two.
    Split {
        #[command(flatten)]
        file: SingleFileArgs,

        /// Split into two parts after this page instead of one file per page.
        #[arg(long)]
        after: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Remove pages ("1,3-5", "even", "odd") into <OUTPUT_DIR>/Cleaned.
    RemovePages {
        #[command(flatten)]
        file: SingleFileArgs,

        /// Pages to remove.
        #[arg(short, long)]
        pages: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract text into <OUTPUT_DIR>/ExtractedText.
    ExtractText {
        #[command(flatten)]
        file: SingleFileArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract embedded images into <OUTPUT_DIR>/ExtractedImages.
    ExtractImages {
        #[command(flatten)]
        file: SingleFileArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render pages to images in <OUTPUT_DIR>/ImagesExported.
    ToImages {
        #[command(flatten)]
        file: SingleFileArgs,

        /// png, jpg, bmp or tiff (default from config).
        #[arg(short, long)]
        format: Option<String>,

        /// Resolution, 30-1200 (default from config).
        #[arg(short, long)]
        dpi: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Send a file to the default printer.
    Print {
        #[command(flatten)]
        file: SingleFileArgs,
    },

    /// Show the files in processing order with page counts and sizes.
    List {
        #[command(flatten)]
        files: FileArgs,
    },

    /// Show settings, or change them with --set key=value.
    Config {
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// PDF files. They are processed in numeric order of the digits in
    /// their names.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SingleFileArgs {
    #[command(flatten)]
    pub files: FileArgs,

    /// Which file to use (1-based, in processing order) when several are
    /// given.
    #[arg(short, long)]
    pub select: Option<usize>,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Folder results are written under.
    #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub output_dir: PathBuf,
}

impl SingleFileArgs {
    /// Zero-based selection index.
    pub fn selected_index(&self) -> Option<usize> {
        self.select.and_then(|n| n.checked_sub(1))
    }
}
