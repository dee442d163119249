// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image embedding — decode PNG/JPEG/etc. with the `image` crate and turn the
// pixels into Flate-compressed PDF image XObjects, with a soft mask when the
// source carries transparency.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use stempel_core::error::{Result, StempelError};
use tracing::{debug, instrument};

/// What an image is used for; decides which error a bad buffer raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    /// Best-effort background layer.
    Watermark,
    /// Required code image.
    Code,
}

impl ImageRole {
    fn error(self, detail: String) -> StempelError {
        match self {
            Self::Watermark => StempelError::WatermarkDecode(detail),
            Self::Code => StempelError::CodeImage(detail),
        }
    }
}

/// A decoded image, compressed and ready to be written as an XObject.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    width: u32,
    height: u32,
    /// Zlib-compressed RGB samples.
    rgb: Vec<u8>,
    /// Zlib-compressed alpha samples, present only if some pixel is not opaque.
    alpha: Option<Vec<u8>>,
}

impl EmbeddedImage {
    /// Decode an encoded raster image (PNG, JPEG, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8], role: ImageRole) -> Result<Self> {
        if data.is_empty() {
            return Err(role.error("image buffer is empty".into()));
        }

        let decoded = ::image::load_from_memory(data)
            .map_err(|err| role.error(format!("failed to decode image: {err}")))?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(role.error(format!("image has no pixels ({width}x{height})")));
        }

        let has_alpha = decoded.color().has_alpha();
        let rgba = decoded.to_rgba8();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }
        let translucent = has_alpha && alpha.iter().any(|&a| a < u8::MAX);

        let rgb = deflate(&rgb).map_err(|err| role.error(format!("compression failed: {err}")))?;
        let alpha = if translucent {
            Some(deflate(&alpha).map_err(|err| role.error(format!("compression failed: {err}")))?)
        } else {
            None
        };

        debug!(width, height, translucent, "Image prepared for embedding");

        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }

    /// Pixel size as floats, for placement maths.
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// Add the image (and its soft mask) to `doc`, returning the XObject id.
    pub fn add_to(&self, doc: &mut Document) -> ObjectId {
        let smask_id = self.alpha.as_ref().map(|alpha| {
            let dict = self.image_dict(b"DeviceGray");
            doc.add_object(Stream::new(dict, alpha.clone()).with_compression(false))
        });

        let mut dict = self.image_dict(b"DeviceRGB");
        if let Some(id) = smask_id {
            dict.set("SMask", Object::Reference(id));
        }
        doc.add_object(Stream::new(dict, self.rgb.clone()).with_compression(false))
    }

    fn image_dict(&self, color_space: &[u8]) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(i64::from(self.width)));
        dict.set("Height", Object::Integer(i64::from(self.height)));
        dict.set("ColorSpace", Object::Name(color_space.to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        dict
    }
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
