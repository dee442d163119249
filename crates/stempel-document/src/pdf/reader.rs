// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — load a rendered PDF with `lopdf` and inspect its page tree.

use lopdf::{Dictionary, Document, Object, ObjectId};
use stempel_core::error::{Result, StempelError};
use stempel_core::types::PageGeometry;
use tracing::{debug, instrument, warn};

/// A4 in points, used when a page tree carries no media box at all.
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 595.28, 841.89];

/// How many `/Parent` hops to follow when resolving inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A page's media box: its geometry plus the lower-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub origin_x: f32,
    pub origin_y: f32,
    pub geometry: PageGeometry,
}

impl PageBox {
    fn from_rect(rect: [f32; 4]) -> Self {
        let [x0, y0, x1, y1] = rect;
        Self {
            origin_x: x0.min(x1),
            origin_y: y0.min(y1),
            geometry: PageGeometry {
                width: (x1 - x0).abs(),
                height: (y1 - y0).abs(),
            },
        }
    }
}

/// Loads an existing PDF and exposes its pages in order.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Load a PDF from bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(StempelError::Load("document buffer is empty".into()));
        }

        let document = Document::load_mem(data)
            .map_err(|err| StempelError::Load(format!("failed to load PDF from memory: {err}")))?;

        if document.get_pages().is_empty() {
            return Err(StempelError::Load("document has no pages".into()));
        }

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // lopdf keys pages by their 1-indexed page number in a BTreeMap.
        self.document.get_pages().into_values().collect()
    }

    /// The effective media box of a page, following page-tree inheritance.
    pub fn page_box(&self, page_id: ObjectId) -> PageBox {
        match inherited_attribute(&self.document, page_id, b"MediaBox")
            .and_then(|obj| rect_from_object(&self.document, obj))
        {
            Some(rect) => PageBox::from_rect(rect),
            None => {
                warn!(?page_id, "Page has no usable /MediaBox, assuming A4");
                PageBox::from_rect(FALLBACK_MEDIA_BOX)
            }
        }
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Look up `key` on the page dictionary, then on its ancestors.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        current = parent_of(doc, current)?;
    }
    None
}

fn parent_of<'a>(doc: &'a Document, dict: &Dictionary) -> Option<&'a Dictionary> {
    match dict.get(b"Parent") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

/// Read a four-number rectangle, resolving an indirect array if needed.
fn rect_from_object(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let array = match obj {
        Object::Array(array) => array,
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Array(array) => array,
            _ => return None,
        },
        _ => return None,
    };

    if array.len() != 4 {
        return None;
    }

    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(array) {
        *slot = number(doc, value)?;
    }
    Some(rect)
}

fn number(doc: &Document, obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        },
        _ => None,
    }
}
