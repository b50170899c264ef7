// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Write decoded images to disk in one of the supported raster formats.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ::image::codecs::jpeg::JpegEncoder;
use ::image::{DynamicImage, ImageFormat};
use pdfpress_core::RasterFormat;
use pdfpress_core::error::{PdfpressError, Result};
use tracing::debug;

/// JPEG quality used for page exports.
pub const JPEG_QUALITY: u8 = 100;

/// Encode `image` as `format` and write it to `path`.
///
/// JPEG and BMP carry no alpha channel, so images are flattened to RGB8 for
/// those formats.
pub fn save_image(image: &DynamicImage, path: &Path, format: RasterFormat) -> Result<()> {
    let map_err = |err: ::image::ImageError| {
        PdfpressError::ImageError(format!("failed to write {}: {}", path.display(), err))
    };

    match format {
        RasterFormat::Jpeg => {
            let writer = BufWriter::new(File::create(path)?);
            let mut encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
            encoder
                .encode_image(&image.to_rgb8())
                .map_err(map_err)?;
        }
        RasterFormat::Bmp => {
            DynamicImage::ImageRgb8(image.to_rgb8())
                .save_with_format(path, ImageFormat::Bmp)
                .map_err(map_err)?;
        }
        RasterFormat::Png => image.save_with_format(path, ImageFormat::Png).map_err(map_err)?,
        RasterFormat::Tiff => image.save_with_format(path, ImageFormat::Tiff).map_err(map_err)?,
    }

    debug!(path = %path.display(), %format, "image written");
    Ok(())
}
