// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF overlay — draw the stamp layers onto a page with `lopdf`.
//
// Shared objects (font, images, graphics states) are added to the document
// once. Each page then receives resource names pointing at those objects and
// one extra content stream. The page's own content streams are kept as they
// are, bracketed by a `q`/`Q` pair so whatever state they leave behind cannot
// leak into the stamp.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use stempel_core::error::{Result, StempelError};
use stempel_core::types::AnnotationPolicy;
use tracing::{debug, instrument};

use super::reader::{PageBox, inherited_attribute};
use crate::image::embed::EmbeddedImage;
use crate::layout::{DrawRect, PlacementResult};
use crate::text::metrics::StandardFont;

const FONT_NAME: &str = "StempelFont";
const CODE_NAME: &str = "StempelCode";
const WATERMARK_NAME: &str = "StempelMark";
const CODE_GS_NAME: &str = "StempelCodeGs";
const CAPTION_GS_NAME: &str = "StempelCaptionGs";
const WATERMARK_GS_NAME: &str = "StempelMarkGs";

/// Objects embedded once per document and referenced from every page.
#[derive(Debug, Clone)]
pub struct SharedResources {
    font: StandardFont,
    font_id: ObjectId,
    code_id: ObjectId,
    /// Watermark XObject and its pixel size.
    watermark: Option<(ObjectId, (f32, f32))>,
    code_gs_id: ObjectId,
    caption_gs_id: ObjectId,
    watermark_gs_id: ObjectId,
    /// Content streams holding a lone `q` and a lone `Q`.
    save_state_id: ObjectId,
    restore_state_id: ObjectId,
}

impl SharedResources {
    /// Add the font, images and graphics states to `doc`.
    #[instrument(skip_all, fields(watermark = watermark.is_some()))]
    pub fn embed(
        doc: &mut Document,
        policy: &AnnotationPolicy,
        font: StandardFont,
        code: &EmbeddedImage,
        watermark: Option<&EmbeddedImage>,
    ) -> Self {
        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(font.base_font().as_bytes().to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = doc.add_object(font_dict);

        let code_id = code.add_to(doc);
        let watermark = watermark.map(|image| (image.add_to(doc), image.size()));

        let code_gs_id = doc.add_object(opacity_state(policy.code_opacity));
        let caption_gs_id = doc.add_object(opacity_state(policy.caption_opacity));
        let watermark_gs_id = doc.add_object(opacity_state(policy.watermark_opacity));

        let save_state_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_state_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

        debug!(?font_id, ?code_id, "Shared stamp resources embedded");

        Self {
            font,
            font_id,
            code_id,
            watermark,
            code_gs_id,
            caption_gs_id,
            watermark_gs_id,
            save_state_id,
            restore_state_id,
        }
    }

    /// Pixel size of the embedded watermark, if there is one.
    pub fn watermark_size(&self) -> Option<(f32, f32)> {
        self.watermark.map(|(_, size)| size)
    }
}

fn opacity_state(opacity: f32) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"ExtGState".to_vec()));
    dict.set("ca", Object::Real(opacity));
    dict.set("CA", Object::Real(opacity));
    dict
}

/// Resource names under which the shared objects are visible on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageNames {
    font: String,
    code: String,
    watermark: Option<String>,
    code_gs: String,
    caption_gs: String,
    watermark_gs: String,
}

/// Draws a [`PlacementResult`] onto pages using one set of shared resources.
pub struct PageAnnotator<'r> {
    resources: &'r SharedResources,
}

impl<'r> PageAnnotator<'r> {
    pub fn new(resources: &'r SharedResources) -> Self {
        Self { resources }
    }

    /// Stamp one page. Only `/Resources` and `/Contents` of the page change.
    pub fn annotate(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        page_box: &PageBox,
        placement: &PlacementResult,
    ) -> Result<()> {
        let names = self.register_resources(doc, page_id)?;
        let content = self.overlay_content(&names, page_box, placement);
        let encoded = content
            .encode()
            .map_err(|err| StempelError::Serialize(format!("failed to encode overlay: {err}")))?;
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        self.bracket_contents(doc, page_id, overlay_id)
    }

    /// Give the page its own resource dictionary (copied from what it had or
    /// inherited) and add entries for the shared objects.
    fn register_resources(&self, doc: &mut Document, page_id: ObjectId) -> Result<PageNames> {
        let shared = self.resources;
        let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
            Some(obj) => resolve_dictionary(doc, obj),
            None => Dictionary::new(),
        };

        let mut xobjects = category(doc, &resources, b"XObject");
        let code = insert_unique(&mut xobjects, CODE_NAME, shared.code_id);
        let watermark = shared
            .watermark
            .map(|(id, _)| insert_unique(&mut xobjects, WATERMARK_NAME, id));

        let mut states = category(doc, &resources, b"ExtGState");
        let code_gs = insert_unique(&mut states, CODE_GS_NAME, shared.code_gs_id);
        let caption_gs = insert_unique(&mut states, CAPTION_GS_NAME, shared.caption_gs_id);
        let watermark_gs = insert_unique(&mut states, WATERMARK_GS_NAME, shared.watermark_gs_id);

        let mut fonts = category(doc, &resources, b"Font");
        let font = insert_unique(&mut fonts, FONT_NAME, shared.font_id);

        resources.set("XObject", Object::Dictionary(xobjects));
        resources.set("ExtGState", Object::Dictionary(states));
        resources.set("Font", Object::Dictionary(fonts));

        page_dictionary_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));

        Ok(PageNames {
            font,
            code,
            watermark,
            code_gs,
            caption_gs,
            watermark_gs,
        })
    }

    fn overlay_content(
        &self,
        names: &PageNames,
        page_box: &PageBox,
        placement: &PlacementResult,
    ) -> Content {
        let mut operations = vec![Operation::new("q", vec![])];

        if page_box.origin_x != 0.0 || page_box.origin_y != 0.0 {
            operations.push(Operation::new(
                "cm",
                reals(&[1.0, 0.0, 0.0, 1.0, page_box.origin_x, page_box.origin_y]),
            ));
        }

        if let (Some(rect), Some(name)) = (&placement.watermark, &names.watermark) {
            push_image(&mut operations, rect, name, &names.watermark_gs);
        }

        push_image(&mut operations, &placement.code, &names.code, &names.code_gs);

        if !placement.caption.is_empty() {
            let font = self.resources.font;
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new("gs", vec![name(&names.caption_gs)]));
            operations.push(Operation::new("rg", reals(&[0.0, 0.0, 0.0])));
            for line in &placement.caption {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![name(&names.font), Object::Real(placement.font_size)],
                ));
                operations.push(Operation::new("Td", reals(&[line.x, line.y])));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(font.encode(&line.text))],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            operations.push(Operation::new("Q", vec![]));
        }

        operations.push(Operation::new("Q", vec![]));
        Content { operations }
    }

    /// `/Contents` becomes `[q, <existing...>, Q, overlay]`.
    fn bracket_contents(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        overlay_id: ObjectId,
    ) -> Result<()> {
        let existing = match page_dictionary(doc, page_id)?.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(streams)) => streams.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(streams)) => streams.clone(),
            _ => Vec::new(),
        };

        let mut contents = Vec::with_capacity(existing.len() + 3);
        contents.push(Object::Reference(self.resources.save_state_id));
        contents.extend(existing);
        contents.push(Object::Reference(self.resources.restore_state_id));
        contents.push(Object::Reference(overlay_id));

        page_dictionary_mut(doc, page_id)?.set("Contents", Object::Array(contents));
        Ok(())
    }
}

fn push_image(operations: &mut Vec<Operation>, rect: &DrawRect, xobject: &str, state: &str) {
    operations.push(Operation::new("q", vec![]));
    operations.push(Operation::new("gs", vec![name(state)]));
    operations.push(Operation::new(
        "cm",
        reals(&[rect.width, 0.0, 0.0, rect.height, rect.x, rect.y]),
    ));
    operations.push(Operation::new("Do", vec![name(xobject)]));
    operations.push(Operation::new("Q", vec![]));
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v)).collect()
}

/// A dictionary given inline or by reference, as an owned copy.
fn resolve_dictionary(doc: &Document, obj: &Object) -> Dictionary {
    match obj {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(id) => doc.get_dictionary(*id).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    }
}

/// One resource category (`/Font`, `/XObject`, ...) as an owned copy.
fn category(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .map(|obj| resolve_dictionary(doc, obj))
        .unwrap_or_default()
}

/// Insert `id` under `base`, or `base1`, `base2`, ... if the name is taken.
fn insert_unique(dict: &mut Dictionary, base: &str, id: ObjectId) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 1;
    while dict.has(candidate.as_bytes()) {
        candidate = format!("{base}{suffix}");
        suffix += 1;
    }
    dict.set(candidate.clone(), Object::Reference(id));
    candidate
}

fn page_dictionary(doc: &Document, page_id: ObjectId) -> Result<&Dictionary> {
    doc.get_dictionary(page_id)
        .map_err(|err| StempelError::Load(format!("page {page_id:?} is not a dictionary: {err}")))
}

fn page_dictionary_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        Ok(_) => Err(StempelError::Load(format!(
            "page {page_id:?} is not a dictionary"
        ))),
        Err(err) => Err(StempelError::Load(format!(
            "page {page_id:?} not found: {err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_names_get_a_suffix() {
        let mut dict = Dictionary::new();
        dict.set("StempelCode", Object::Reference((1, 0)));
        dict.set("StempelCode1", Object::Reference((2, 0)));

        let chosen = insert_unique(&mut dict, "StempelCode", (9, 0));
        assert_eq!(chosen, "StempelCode2");
        assert_eq!(
            dict.get(b"StempelCode").unwrap(),
            &Object::Reference((1, 0))
        );
        assert_eq!(
            dict.get(b"StempelCode2").unwrap(),
            &Object::Reference((9, 0))
        );
    }

    #[test]
    fn free_name_is_used_as_is() {
        let mut dict = Dictionary::new();
        assert_eq!(insert_unique(&mut dict, "StempelFont", (3, 0)), "StempelFont");
    }

    #[test]
    fn opacity_state_sets_fill_and_stroke_alpha() {
        let dict = opacity_state(0.1);
        assert_eq!(dict.get(b"ca").unwrap().as_float().unwrap(), 0.1);
        assert_eq!(dict.get(b"CA").unwrap().as_float().unwrap(), 0.1);
    }
}
