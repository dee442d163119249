// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixtures and inspection helpers shared by the unit tests.

use std::io::Cursor;

use ::image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};

/// Opaque grey PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// PNG whose left half is fully transparent.
pub fn translucent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 0])
        } else {
            Rgba([255, 0, 0, 255])
        }
    });
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A printpdf document with one page per `(width_mm, height_mm)` entry,
/// each carrying a line of body text.
pub fn fixture_pdf(pages: &[(f32, f32)]) -> Vec<u8> {
    let mut doc = PdfDocument::new("fixture");
    let pages = pages
        .iter()
        .enumerate()
        .map(|(index, &(w, h))| {
            let ops = vec![
                Op::StartTextSection,
                Op::SetTextCursor {
                    pos: Point {
                        x: Pt(20.0),
                        y: Mm(h - 20.0).into_pt(),
                    },
                },
                Op::SetFontSizeBuiltinFont {
                    size: Pt(12.0),
                    font: BuiltinFont::Helvetica,
                },
                Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(format!("Body text on page {}", index + 1))],
                    font: BuiltinFont::Helvetica,
                },
                Op::EndTextSection,
            ];
            PdfPage::new(Mm(w), Mm(h), ops)
        })
        .collect();
    doc.with_pages(pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    doc.save(&PdfSaveOptions::default(), &mut warnings)
}

/// Body content stream of every page built by [`lopdf_fixture`].
pub const FIXTURE_BODY: &[u8] = b"0 0 1 rg 10 10 50 50 re f";

/// A hand-built page tree. `pages` gives each page's own media box (or
/// none); `tree_media_box` goes on the `/Pages` node for inheritance.
/// Every page shares a `/Resources` dictionary on the tree node that already
/// uses the name `StempelCode`.
pub fn lopdf_fixture(pages: &[Option<[i64; 4]>], tree_media_box: Option<[i64; 4]>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let taken = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
    let mut xobjects = Dictionary::new();
    xobjects.set("StempelCode", Object::Reference(taken));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::new();
    for media_box in pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), FIXTURE_BODY.to_vec()));
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        if let Some(rect) = media_box {
            page.set("MediaBox", rect_object(*rect));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut tree = Dictionary::new();
    tree.set("Type", Object::Name(b"Pages".to_vec()));
    tree.set("Count", Object::Integer(kids.len() as i64));
    tree.set("Kids", Object::Array(kids));
    tree.set("Resources", Object::Reference(resources_id));
    if let Some(rect) = tree_media_box {
        tree.set("MediaBox", rect_object(rect));
    }
    doc.objects.insert(pages_id, Object::Dictionary(tree));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn rect_object(rect: [i64; 4]) -> Object {
    Object::Array(rect.iter().map(|v| Object::Integer(*v)).collect())
}

/// References in a page's `/Contents` array.
pub fn content_refs(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let page = doc.get_dictionary(page_id).unwrap();
    page.get(b"Contents")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|obj| obj.as_reference().unwrap())
        .collect()
}

/// Raw (decompressed if needed) bytes of a content stream.
pub fn stream_bytes(doc: &Document, id: ObjectId) -> Vec<u8> {
    let stream = doc.get_object(id).unwrap().as_stream().unwrap();
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Operations of the stamp stream, which is always last in `/Contents`.
pub fn overlay_operations(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
    let last = *content_refs(doc, page_id).last().unwrap();
    Content::decode(&stream_bytes(doc, last)).unwrap().operations
}

/// An image painted by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDraw {
    pub xobject: String,
    pub state: String,
    /// `[w 0 0 h x y]`
    pub matrix: [f32; 6],
}

pub fn image_draws(ops: &[Operation]) -> Vec<ImageDraw> {
    let mut draws = Vec::new();
    let mut state = String::new();
    let mut matrix = [0.0; 6];
    for op in ops {
        match op.operator.as_str() {
            "gs" => state = name_of(&op.operands[0]),
            "cm" => {
                for (slot, value) in matrix.iter_mut().zip(&op.operands) {
                    *slot = value.as_float().unwrap();
                }
            }
            "Do" => draws.push(ImageDraw {
                xobject: name_of(&op.operands[0]),
                state: state.clone(),
                matrix,
            }),
            _ => {}
        }
    }
    draws
}

/// A caption line painted by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub text: Vec<u8>,
    pub x: f32,
    pub y: f32,
    pub font: String,
    pub size: f32,
}

pub fn text_draws(ops: &[Operation]) -> Vec<TextDraw> {
    let mut draws = Vec::new();
    let (mut x, mut y, mut font, mut size) = (0.0, 0.0, String::new(), 0.0);
    for op in ops {
        match op.operator.as_str() {
            "Tf" => {
                font = name_of(&op.operands[0]);
                size = op.operands[1].as_float().unwrap();
            }
            "Td" => {
                x = op.operands[0].as_float().unwrap();
                y = op.operands[1].as_float().unwrap();
            }
            "Tj" => draws.push(TextDraw {
                text: op.operands[0].as_str().unwrap().to_vec(),
                x,
                y,
                font: font.clone(),
                size,
            }),
            _ => {}
        }
    }
    draws
}

/// Fill opacity of the graphics state a page knows as `name`.
pub fn state_opacity(doc: &Document, page_id: ObjectId, name: &str) -> f32 {
    let states = page_category(doc, page_id, b"ExtGState");
    let id = states.get(name.as_bytes()).unwrap().as_reference().unwrap();
    doc.get_dictionary(id)
        .unwrap()
        .get(b"ca")
        .unwrap()
        .as_float()
        .unwrap()
}

/// A resource category of a stamped page (stamped pages always carry their
/// own inline `/Resources`).
pub fn page_category(doc: &Document, page_id: ObjectId, key: &[u8]) -> Dictionary {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    resources.get(key).unwrap().as_dict().unwrap().clone()
}

fn name_of(obj: &Object) -> String {
    String::from_utf8(obj.as_name().unwrap().to_vec()).unwrap()
}
