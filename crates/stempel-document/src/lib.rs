// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stempel-document — Page annotation engine for Stempel.
//
// Provides caption word-wrapping against standard font metrics, pure per-page
// placement geometry, image embedding as PDF XObjects, and the pipeline that
// stamps every page of a rendered PDF with a watermark, a code image and a
// caption.

pub mod image;
pub mod layout;
pub mod pdf;
pub mod pipeline;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the primary structs so callers can use `stempel_document::AnnotationPipeline` etc.
pub use image::embed::EmbeddedImage;
pub use layout::{CaptionBlock, CaptionLine, DrawRect, PlacementResult, place_page};
pub use pdf::reader::PdfReader;
pub use pipeline::AnnotationPipeline;
pub use text::metrics::{FontMetrics, StandardFont};
pub use text::wrap::{WrapConfig, wrap, wrap_with};
