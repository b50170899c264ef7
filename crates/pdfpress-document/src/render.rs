// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterising through PDFium.

use std::fs;
use std::path::{Path, PathBuf};

use ::image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;
use pdfpress_core::RasterFormat;
use pdfpress_core::error::{PdfpressError, Result};
use tracing::{debug, info, instrument, warn};

use crate::image::save_image;

/// Lowest accepted rendering resolution.
pub const MIN_DPI: u32 = 30;
/// Highest accepted rendering resolution.
pub const MAX_DPI: u32 = 1200;

/// Reject resolutions outside `MIN_DPI..=MAX_DPI`.
pub fn validate_dpi(dpi: u32) -> Result<u32> {
    if (MIN_DPI..=MAX_DPI).contains(&dpi) {
        Ok(dpi)
    } else {
        Err(PdfpressError::InvalidDpi(dpi))
    }
}

/// Pixel size of a page measured in points (1/72 inch) at `dpi`.
/// Fractions are truncated.
pub fn pixel_size(width_pt: f32, height_pt: f32, dpi: u32) -> (i32, i32) {
    let to_pixels = |points: f32| (f64::from(points) * f64::from(dpi) / 72.0) as i32;
    (to_pixels(width_pt), to_pixels(height_pt))
}

/// A bound PDFium library, ready to render.
pub struct PageRenderer {
    pdfium: Pdfium,
}

impl PageRenderer {
    /// Bind PDFium from `library_dir` when given, falling back to the system
    /// library.
    pub fn bind(library_dir: Option<&Path>) -> Result<Self> {
        let bindings = match library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|err| {
                    warn!(dir = %dir.display(), %err, "PDFium not found in configured directory");
                    Pdfium::bind_to_system_library()
                }),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|err| PdfpressError::RenderError(format!("cannot load PDFium: {}", err)))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Render every page of `input` into `out_dir/page_<n>.<ext>`.
    ///
    /// `on_page` receives `(page_number, page_count)` after each page is
    /// written. Pages with a non-positive size are skipped with a warning.
    #[instrument(skip(self, on_page))]
    pub fn render_to_dir(
        &self,
        input: &Path,
        out_dir: &Path,
        format: RasterFormat,
        dpi: u32,
        mut on_page: impl FnMut(u32, u32),
    ) -> Result<Vec<PathBuf>> {
        let dpi = validate_dpi(dpi)?;
        fs::create_dir_all(out_dir)?;

        let document = self
            .pdfium
            .load_pdf_from_file(input, None)
            .map_err(|err| {
                PdfpressError::RenderError(format!("cannot open {}: {}", input.display(), err))
            })?;

        let pages = document.pages();
        let page_count = pages.len() as u32;
        let mut written = Vec::with_capacity(page_count as usize);

        for (index, page) in pages.iter().enumerate() {
            let page_number = index as u32 + 1;
            let (width, height) = pixel_size(page.width().value, page.height().value, dpi);
            if width <= 0 || height <= 0 {
                warn!(page_number, width, height, "skipping page with empty size");
                continue;
            }

            let config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);
            let bitmap = page.render_with_config(&config).map_err(|err| {
                PdfpressError::RenderError(format!("page {}: {}", page_number, err))
            })?;

            let pixels = bitmap.as_rgba_bytes().to_vec();
            let image = RgbaImage::from_raw(bitmap.width() as u32, bitmap.height() as u32, pixels)
                .ok_or_else(|| {
                    PdfpressError::RenderError(format!(
                        "page {}: bitmap size does not match its pixel data",
                        page_number
                    ))
                })?;

            let path = out_dir.join(format!("page_{}.{}", page_number, format.extension()));
            save_image(&DynamicImage::ImageRgba8(image), &path, format)?;
            debug!(page_number, width, height, "page rendered");

            written.push(path);
            on_page(page_number, page_count);
        }

        info!(pages = written.len(), dpi, %format, "Pages rasterised");
        Ok(written)
    }
}
