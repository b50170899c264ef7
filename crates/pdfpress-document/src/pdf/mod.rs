// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: reading, merging, splitting, page removal and text extraction
// on top of `lopdf`.

pub mod ops;
pub mod reader;
pub mod writer;

pub use ops::{MergeReport, RemovalReport};
pub use reader::PdfReader;
pub use writer::{MergeLayout, PdfWriter};

use lopdf::{Document, Object, ObjectId};

/// Attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when neither a page nor its ancestors declare a MediaBox.
pub(crate) const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Resolve a page attribute, walking up the /Parent chain when the page
/// itself does not carry it.
pub(crate) fn inherited_attribute<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page_id;
    // Guard against malformed trees whose /Parent links form a loop.
    for _ in 0..64 {
        let dict = document.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Follow a reference (if any) to the object it points at.
pub(crate) fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

/// The page's effective MediaBox as `[llx, lly, urx, ury]`.
pub(crate) fn media_box(document: &Document, page_id: ObjectId) -> [f32; 4] {
    inherited_attribute(document, page_id, b"MediaBox")
        .and_then(|object| resolve(document, object))
        .and_then(|object| object.as_array().ok())
        .and_then(|values| {
            let numbers: Vec<f32> = values
                .iter()
                .filter_map(|value| resolve(document, value).and_then(as_number))
                .collect();
            <[f32; 4]>::try_from(numbers).ok()
        })
        .unwrap_or(DEFAULT_MEDIA_BOX)
}
