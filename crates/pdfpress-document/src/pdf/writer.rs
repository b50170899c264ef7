// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: assemble a new document from pages copied out of existing ones.
//
// Pages are copied object-by-object with `lopdf`. Each source document gets
// its own `PageCopier`, which remembers every object it has already copied so
// shared resources (fonts, images) are written once and reference cycles
// (annotation /P back-links, for example) terminate.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use pdfpress_core::PaperSize;
use pdfpress_core::error::{PdfpressError, Result};
use tracing::{debug, info, instrument, warn};

use super::{INHERITABLE_KEYS, inherited_attribute, media_box};

/// How copied pages are placed in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeLayout {
    /// Keep every page exactly as it is in its source.
    #[default]
    Preserve,
    /// Place every page on a fresh page of the given size, scaled uniformly
    /// to fit and centred.
    Fit(PaperSize),
}

/// Builds a new PDF document page by page.
pub struct PdfWriter {
    document: Document,
    /// Reserved id of the /Pages node, written on save.
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    layout: MergeLayout,
}

impl PdfWriter {
    /// Create an empty PDF 1.5 document that keeps pages as they are.
    pub fn new() -> Self {
        Self::with_layout(MergeLayout::Preserve)
    }

    /// Create an empty document with the given page layout.
    pub fn with_layout(layout: MergeLayout) -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            kids: Vec::new(),
            layout,
        }
    }

    /// Set the PDF header version (e.g. to match a source document).
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.document.version = version.into();
    }

    /// Set /Title in the document information dictionary.
    pub fn set_title(&mut self, title: &str) {
        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        self.document.trailer.set("Info", info_id);
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append the given pages of `source`, in the order given.
    #[instrument(skip_all, fields(pages = page_ids.len(), layout = ?self.layout))]
    pub fn append_pages(&mut self, source: &Document, page_ids: &[ObjectId]) -> Result<()> {
        let mut copier = PageCopier::new(source);

        match self.layout {
            MergeLayout::Preserve => {
                copier.reserve_pages(&mut self.document, page_ids);
                for &page_id in page_ids {
                    let new_id = copier.copy_page(&mut self.document, page_id, self.pages_id)?;
                    self.kids.push(new_id);
                }
            }
            MergeLayout::Fit(paper) => {
                for &page_id in page_ids {
                    let new_id =
                        self.place_fitted(&mut copier, source, page_id, paper)?;
                    self.kids.push(new_id);
                }
            }
        }

        debug!(total_pages = self.kids.len(), "pages appended");
        Ok(())
    }

    /// Wrap a source page in a form XObject and draw it onto a new page of
    /// `paper` size.
    fn place_fitted(
        &mut self,
        copier: &mut PageCopier<'_>,
        source: &Document,
        page_id: ObjectId,
        paper: PaperSize,
    ) -> Result<ObjectId> {
        let content = source.get_page_content(page_id).map_err(|err| {
            PdfpressError::PdfError(format!("cannot read content of page {:?}: {}", page_id, err))
        })?;
        let bbox = media_box(source, page_id);

        let resources = match inherited_attribute(source, page_id, b"Resources") {
            Some(object) => copier.copy_object(&mut self.document, object),
            None => Object::Dictionary(Dictionary::new()),
        };

        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
                "Resources" => resources,
            },
            content,
        );
        let form_id = self.document.add_object(form);

        let (page_w, page_h) = paper.dimensions_pt();
        let placement = fit_transform(bbox, page_w, page_h);
        let ops = format!(
            "q {:.4} 0 0 {:.4} {:.4} {:.4} cm /Pg Do Q",
            placement.scale, placement.scale, placement.translate_x, placement.translate_y
        );
        let contents_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

        let page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w),
                Object::Real(page_h),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Pg" => form_id },
            },
            "Contents" => contents_id,
        };
        Ok(self.document.add_object(page))
    }

    /// Finish the page tree and serialise to bytes.
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        self.finish()?;
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            PdfpressError::PdfError(format!("failed to serialise PDF: {}", err))
        })?;
        Ok(output)
    }

    /// Finish the page tree and write the document to `path`.
    pub fn save(mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.finish()?;
        self.document.save(path).map_err(|err| {
            PdfpressError::PdfError(format!("failed to write {}: {}", path.display(), err))
        })?;
        info!(path = %path.display(), pages = self.kids.len(), "PDF written");
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.kids.is_empty() {
            return Err(PdfpressError::PdfError("document has no pages".into()));
        }
        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(self.kids.len() as i64),
            }),
        );
        self.document.compress();
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform scale and offset that centre a box inside a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

pub(crate) fn fit_transform(bbox: [f32; 4], page_w: f32, page_h: f32) -> Placement {
    let [llx, lly, urx, ury] = bbox;
    let width = (urx - llx).abs().max(1.0);
    let height = (ury - lly).abs().max(1.0);
    let scale = (page_w / width).min(page_h / height);

    Placement {
        scale,
        translate_x: (page_w - width * scale) / 2.0 - llx.min(urx) * scale,
        translate_y: (page_h - height * scale) / 2.0 - lly.min(ury) * scale,
    }
}

/// Copies pages and everything they reference from one source document.
struct PageCopier<'a> {
    source: &'a Document,
    /// Every page object in the source; references to pages that are not
    /// being copied are dropped rather than pulled in.
    source_pages: HashSet<ObjectId>,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            source_pages: source.get_pages().values().copied().collect(),
            copied: HashMap::new(),
        }
    }

    /// Reserve target ids for the pages about to be copied so that
    /// cross-references between them (link annotations) survive.
    fn reserve_pages(&mut self, target: &mut Document, page_ids: &[ObjectId]) {
        for &page_id in page_ids {
            self.copied
                .entry(page_id)
                .or_insert_with(|| target.new_object_id());
        }
    }

    /// Copy one page, re-parenting it under `parent` and flattening the
    /// attributes it inherited from the source page tree.
    fn copy_page(
        &mut self,
        target: &mut Document,
        page_id: ObjectId,
        parent: ObjectId,
    ) -> Result<ObjectId> {
        let page = self
            .source
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|err| {
                PdfpressError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
            })?;

        let new_id = *self
            .copied
            .entry(page_id)
            .or_insert_with(|| target.new_object_id());

        let mut dict = self.copy_dictionary(target, page);
        for key in INHERITABLE_KEYS {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(self.source, page_id, key) {
                let copied = self.copy_object(target, value);
                dict.set(key.to_vec(), copied);
            }
        }
        dict.set("Parent", Object::Reference(parent));

        target.objects.insert(new_id, Object::Dictionary(dict));
        Ok(new_id)
    }

    fn copy_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(match self.copied.get(id) {
                Some(new_id) => *new_id,
                None => {
                    if self.source_pages.contains(id) {
                        return Object::Null;
                    }
                    let new_id = target.new_object_id();
                    self.copied.insert(*id, new_id);
                    let copied = match self.source.get_object(*id) {
                        Ok(referenced) => self.copy_object(target, referenced),
                        Err(err) => {
                            warn!(?id, %err, "cannot resolve reference, using null");
                            Object::Null
                        }
                    };
                    target.objects.insert(new_id, copied);
                    new_id
                }
            }),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.copy_dictionary(target, &stream.dict);
                Object::Stream(copied)
            }
            other => other.clone(),
        }
    }

    /// Copy a dictionary, dropping /Parent (re-linked by the caller).
    fn copy_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            let value = self.copy_object(target, value);
            copied.set(key.clone(), value);
        }
        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    fn page_ids(document: &Document) -> Vec<ObjectId> {
        document.get_pages().values().copied().collect()
    }

    #[test]
    fn copied_pages_carry_inherited_attributes() {
        let source = Document::load_mem(&fixtures::text_pdf(2)).unwrap();
        let mut writer = PdfWriter::new();
        writer.append_pages(&source, &page_ids(&source)).unwrap();

        let output = Document::load_mem(&writer.to_bytes().unwrap()).unwrap();
        assert_eq!(output.get_pages().len(), 2);

        let first = *output.get_pages().get(&1).unwrap();
        let page = output.get_object(first).unwrap().as_dict().unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
    }

    #[test]
    fn shared_resources_are_copied_once() {
        let source = Document::load_mem(&fixtures::text_pdf(3)).unwrap();
        let mut writer = PdfWriter::new();
        writer.append_pages(&source, &page_ids(&source)).unwrap();

        let output = Document::load_mem(&writer.to_bytes().unwrap()).unwrap();
        let fonts = output
            .objects
            .values()
            .filter(|object| {
                object
                    .as_dict()
                    .ok()
                    .and_then(|dict| dict.get(b"Type").ok())
                    .and_then(|ty| ty.as_name().ok())
                    == Some(b"Font".as_slice())
            })
            .count();
        assert_eq!(fonts, 1);
    }

    #[test]
    fn fit_layout_uses_paper_size() {
        let source = Document::load_mem(&fixtures::text_pdf(1)).unwrap();
        let mut writer = PdfWriter::with_layout(MergeLayout::Fit(PaperSize::A4));
        writer.append_pages(&source, &page_ids(&source)).unwrap();

        let output = Document::load_mem(&writer.to_bytes().unwrap()).unwrap();
        let page_id = *output.get_pages().get(&1).unwrap();
        let [_, _, width, height] = media_box(&output, page_id);
        assert!((width - 595.28).abs() < 0.1);
        assert!((height - 841.89).abs() < 0.1);
    }

    #[test]
    fn fit_transform_centres_landscape_page() {
        let placement = fit_transform([0.0, 0.0, 842.0, 595.0], 595.0, 842.0);
        assert!((placement.scale - 595.0 / 842.0).abs() < 1e-4);
        assert!(placement.translate_x.abs() < 1e-3);
        assert!(placement.translate_y > 0.0);
    }

    #[test]
    fn title_lands_in_the_info_dictionary() {
        let source = Document::load_mem(&fixtures::text_pdf(1)).unwrap();
        let mut writer = PdfWriter::new();
        writer.set_title("Page 1");
        writer.append_pages(&source, &page_ids(&source)).unwrap();

        let output = Document::load_mem(&writer.to_bytes().unwrap()).unwrap();
        let info_id = output.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = output.get_object(info_id).unwrap().as_dict().unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Page 1");
        assert!(output.catalog().unwrap().has(b"Pages"));
    }

    #[test]
    fn empty_writer_refuses_to_save() {
        assert!(matches!(
            PdfWriter::new().to_bytes(),
            Err(PdfpressError::PdfError(_))
        ));
    }
}
