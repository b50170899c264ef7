// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded image extraction: find image XObjects on each page, decode the
// encodings we understand and save them as PNG.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ::image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Document, Object, ObjectId, Stream};
use pdfpress_core::RasterFormat;
use pdfpress_core::error::{PdfpressError, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::encode::save_image;
use crate::pdf::{PdfReader, inherited_attribute, resolve};

/// Result of extracting the images of one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageExtractionReport {
    /// Files written, in extraction order.
    pub written: Vec<PathBuf>,
    /// Images found but not decodable (unsupported filter or colour space),
    /// or whose PNG could not be written.
    pub skipped: usize,
}

/// Extract every image on every page of `input` into `out_dir` as
/// `page_<p>_img_<k>.png`, with `k` counting across the whole document.
///
/// Images that cannot be decoded or saved are skipped with a warning. `k`
/// still advances for an image that decoded but failed to save.
#[instrument]
pub fn extract_images(input: &Path, out_dir: &Path) -> Result<ImageExtractionReport> {
    fs::create_dir_all(out_dir)?;
    let reader = PdfReader::open(input)?;
    let document = reader.document();

    let mut report = ImageExtractionReport::default();
    let mut index = 0;
    for (page_number, page_id) in document.get_pages() {
        for (image_id, stream) in page_images(document, page_id) {
            let image = match decode_image(document, stream) {
                Ok(image) => image,
                Err(err) => {
                    warn!(page_number, ?image_id, %err, "skipping image");
                    report.skipped += 1;
                    continue;
                }
            };

            index += 1;
            let path = out_dir.join(format!("page_{}_img_{}.png", page_number, index));
            match save_image(&image, &path, RasterFormat::Png) {
                Ok(()) => report.written.push(path),
                Err(err) => {
                    warn!(page_number, ?image_id, %err, "could not save image");
                    report.skipped += 1;
                }
            }
        }
    }

    info!(
        written = report.written.len(),
        skipped = report.skipped,
        "Images extracted"
    );
    Ok(report)
}

/// Image XObjects referenced from the page's resources, in resource order.
fn page_images(document: &Document, page_id: ObjectId) -> Vec<(ObjectId, &Stream)> {
    let Some(xobjects) = inherited_attribute(document, page_id, b"Resources")
        .and_then(|resources| resolve(document, resources))
        .and_then(|resources| resources.as_dict().ok())
        .and_then(|resources| resources.get(b"XObject").ok())
        .and_then(|xobjects| resolve(document, xobjects))
        .and_then(|xobjects| xobjects.as_dict().ok())
    else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for (_, value) in xobjects.iter() {
        let Ok(id) = value.as_reference() else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        let Ok(Object::Stream(stream)) = document.get_object(id) else {
            continue;
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|name| name == b"Image")
            .unwrap_or(false);
        if is_image {
            images.push((id, stream));
        }
    }

    debug!(?page_id, count = images.len(), "page images found");
    images
}

/// Filter names applied to a stream, outermost first.
fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Number of colour components implied by the image's colour space.
fn components(document: &Document, stream: &Stream) -> Option<usize> {
    match resolve(document, stream.dict.get(b"ColorSpace").ok()?)? {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => Some(1),
            b"DeviceRGB" | b"CalRGB" => Some(3),
            b"DeviceCMYK" => Some(4),
            _ => None,
        },
        // [/ICCBased <stream>] carries /N; other array spaces are not handled.
        Object::Array(items) => match items.first().and_then(|n| n.as_name().ok()) {
            Some(b"ICCBased") => match resolve(document, items.get(1)?)? {
                Object::Stream(profile) => profile
                    .dict
                    .get(b"N")
                    .and_then(Object::as_i64)
                    .ok()
                    .and_then(|n| usize::try_from(n).ok()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn dimension(stream: &Stream, key: &[u8]) -> Result<u32> {
    stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            PdfpressError::ImageError(format!(
                "image has no valid /{}",
                String::from_utf8_lossy(key)
            ))
        })
}

/// Decode one image XObject.
///
/// Supported: DCT (JPEG) data, and 8-bit gray/RGB/CMYK samples that are
/// either unfiltered or Flate-compressed.
pub(crate) fn decode_image(document: &Document, stream: &Stream) -> Result<DynamicImage> {
    let filters = filters(stream);
    let filter_names: Vec<&[u8]> = filters.iter().map(Vec::as_slice).collect();

    let samples = match filter_names.as_slice() {
        [b"DCTDecode"] => {
            return ::image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|err| PdfpressError::ImageError(format!("bad JPEG data: {}", err)));
        }
        [] => stream.content.clone(),
        [b"FlateDecode"] => stream.decompressed_content().map_err(|err| {
            PdfpressError::ImageError(format!("cannot inflate image data: {}", err))
        })?,
        other => {
            let names: Vec<String> = other
                .iter()
                .map(|name| String::from_utf8_lossy(name).into_owned())
                .collect();
            return Err(PdfpressError::ImageError(format!(
                "unsupported image filter {}",
                names.join(", ")
            )));
        }
    };

    let width = dimension(stream, b"Width")?;
    let height = dimension(stream, b"Height")?;
    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        return Err(PdfpressError::ImageError(format!(
            "{} bits per component is not supported",
            bits
        )));
    }

    let channels = components(document, stream)
        .ok_or_else(|| PdfpressError::ImageError("unsupported colour space".into()))?;
    let pixels = width as usize * height as usize;
    let expected = pixels * channels;
    if samples.len() < expected {
        return Err(PdfpressError::ImageError(format!(
            "image data too short: {} bytes, expected {}",
            samples.len(),
            expected
        )));
    }
    let mut samples = samples;
    samples.truncate(expected);

    let too_short = || PdfpressError::ImageError("image buffer size mismatch".into());
    let image = match channels {
        1 => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, samples).ok_or_else(too_short)?,
        ),
        3 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, samples).ok_or_else(too_short)?,
        ),
        4 => {
            let rgb: Vec<u8> = samples.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, rgb).ok_or_else(too_short)?)
        }
        other => {
            return Err(PdfpressError::ImageError(format!(
                "{} colour components are not supported",
                other
            )));
        }
    };
    Ok(image)
}

fn cmyk_to_rgb(cmyk: &[u8]) -> [u8; 3] {
    let k = 255 - cmyk[3] as u16;
    let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
    [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;
    use lopdf::dictionary;

    #[test]
    fn extracts_every_image_with_running_index() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("images.pdf");
        fs::write(&input, fixtures::image_pdf()).unwrap();
        let out_dir = dir.path().join("ExtractedImages");

        let report = extract_images(&input, &out_dir).unwrap();
        assert_eq!(report.skipped, 0);
        assert_eq!(report.written.len(), 2);
        assert!(out_dir.join("page_1_img_1.png").exists());
        assert!(out_dir.join("page_1_img_2.png").exists());

        let first = ::image::open(out_dir.join("page_1_img_1.png")).unwrap();
        let second = ::image::open(out_dir.join("page_1_img_2.png")).unwrap();
        let mut sizes = vec![
            (first.width(), first.height()),
            (second.width(), second.height()),
        ];
        sizes.sort();
        assert_eq!(sizes, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn failed_write_is_skipped_and_extraction_continues() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("images.pdf");
        fs::write(&input, fixtures::image_pdf()).unwrap();
        let out_dir = dir.path().join("ExtractedImages");
        // A directory squatting on the first file name makes that write fail.
        fs::create_dir_all(out_dir.join("page_1_img_1.png")).unwrap();

        let report = extract_images(&input, &out_dir).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.written, vec![out_dir.join("page_1_img_2.png")]);
        assert!(::image::open(out_dir.join("page_1_img_2.png")).is_ok());
    }

    #[test]
    fn document_without_images_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("text.pdf");
        fs::write(&input, fixtures::text_pdf(2)).unwrap();

        let report = extract_images(&input, dir.path()).unwrap();
        assert!(report.written.is_empty());
    }

    #[test]
    fn decodes_raw_rgb_samples() {
        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 1,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            vec![255, 0, 0, 0, 0, 255],
        );
        let image = decode_image(&Document::new(), &stream).unwrap().to_rgb8();
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn decodes_dct_data() {
        let source = RgbImage::from_pixel(3, 2, ::image::Rgb([200, 40, 40]));
        let mut jpeg = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(source)
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();

        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 3,
                "Height" => 2,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg.into_inner(),
        );
        let image = decode_image(&Document::new(), &stream).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        let [r, g, b] = image.to_rgb8().get_pixel(1, 1).0;
        assert!(r > 150 && g < 90 && b < 90, "{r} {g} {b}");
    }

    #[test]
    fn decodes_flate_compressed_cmyk() {
        let mut stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 16,
                "Height" => 16,
                "ColorSpace" => "DeviceCMYK",
                "BitsPerComponent" => 8,
            },
            [0u8, 0, 0, 255].repeat(16 * 16),
        );
        stream.compress().unwrap();
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"FlateDecode"
        );

        let image = decode_image(&Document::new(), &stream).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (16, 16));
        assert!(image.pixels().all(|pixel| pixel.0 == [0, 0, 0]));
    }

    #[test]
    fn icc_based_colour_space_reads_components_from_profile() {
        let mut document = Document::with_version("1.5");
        let gray_profile = document.add_object(Stream::new(dictionary! { "N" => 1 }, Vec::new()));
        let rgb_profile = document.add_object(Stream::new(dictionary! { "N" => 3 }, Vec::new()));
        let icc = |profile| {
            vec![
                Object::Name(b"ICCBased".to_vec()),
                Object::Reference(profile),
            ]
        };

        let rgb = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => icc(rgb_profile),
                "BitsPerComponent" => 8,
            },
            vec![10, 20, 30],
        );
        let image = decode_image(&document, &rgb).unwrap();
        assert_eq!(image.to_rgb8().get_pixel(0, 0).0, [10, 20, 30]);

        let gray = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 1,
                "ColorSpace" => icc(gray_profile),
                "BitsPerComponent" => 8,
            },
            vec![0, 255],
        );
        let image = decode_image(&document, &gray).unwrap();
        assert!(matches!(image, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn converts_cmyk_to_rgb() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), [0, 255, 255]);
    }

    #[test]
    fn rejects_unsupported_filters() {
        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "Filter" => "JBIG2Decode",
            },
            vec![0],
        );
        assert!(matches!(
            decode_image(&Document::new(), &stream),
            Err(PdfpressError::ImageError(_))
        ));
    }

    #[test]
    fn rejects_short_sample_data() {
        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 4,
                "Height" => 4,
                "ColorSpace" => "DeviceGray",
            },
            vec![0; 3],
        );
        assert!(decode_image(&Document::new(), &stream).is_err());
    }
}
