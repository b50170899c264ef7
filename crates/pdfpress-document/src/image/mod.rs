// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decoding embedded PDF images and encoding raster output.

pub mod encode;
pub mod extract;

pub use encode::save_image;
pub use extract::{ImageExtractionReport, extract_images};
