// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Placement geometry for the stamp layers of a single page.
//
// Pure computation: nothing here touches a PDF. Coordinates are PDF user
// space relative to the page's lower-left corner (y grows upward).

use stempel_core::types::{AnnotationPolicy, CodeAnchor, PageGeometry};

use crate::text::metrics::FontMetrics;
use crate::text::wrap::wrap;

/// Where and how opaque an image is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
}

/// One caption line positioned on the page; `y` is the text baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// Rendered width at the caption font size.
    pub width: f32,
}

/// A caption wrapped to the code-image width, with each line's width.
///
/// Wrapping depends only on the caption, the font and the policy, so it is
/// done once per document and reused for every page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionBlock {
    lines: Vec<(String, f32)>,
}

impl CaptionBlock {
    pub fn wrap(caption: &str, policy: &AnnotationPolicy, metrics: &dyn FontMetrics) -> Self {
        let measure = |text: &str, size: f32| metrics.width_of_text_at_size(text, size);
        let lines = wrap(caption, policy.code_size, measure, policy.font_size)
            .into_iter()
            .map(|line| {
                let width = measure(&line, policy.font_size);
                (line, width)
            })
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Everything drawn on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementResult {
    pub watermark: Option<DrawRect>,
    pub code: DrawRect,
    /// Caption lines, nearest the code image first.
    pub caption: Vec<CaptionLine>,
    pub caption_opacity: f32,
    pub font_size: f32,
}

/// Centre the watermark and scale it uniformly to fit inside
/// `watermark_fraction` of the page in both dimensions.
///
/// Returns `None` for a degenerate (zero-sized) image.
pub fn watermark_rect(
    geometry: PageGeometry,
    policy: &AnnotationPolicy,
    image_size: (f32, f32),
) -> Option<DrawRect> {
    let (image_w, image_h) = image_size;
    if image_w <= 0.0 || image_h <= 0.0 {
        return None;
    }

    let fraction = policy.watermark_fraction;
    let scale = (geometry.width * fraction / image_w).min(geometry.height * fraction / image_h);
    let width = image_w * scale;
    let height = image_h * scale;

    Some(DrawRect {
        x: (geometry.width - width) / 2.0,
        y: (geometry.height - height) / 2.0,
        width,
        height,
        opacity: policy.watermark_opacity,
    })
}

/// Fixed-size square in the configured corner.
///
/// On pages smaller than `code_size + margin` the square overhangs the left
/// or bottom edge; that is accepted.
pub fn code_rect(geometry: PageGeometry, policy: &AnnotationPolicy) -> DrawRect {
    let side = policy.code_size;
    let y = match policy.anchor {
        CodeAnchor::BottomRight => policy.margin,
        CodeAnchor::TopRight => geometry.height - side - policy.margin,
    };

    DrawRect {
        x: geometry.width - side - policy.margin,
        y,
        width: side,
        height: side,
        opacity: policy.code_opacity,
    }
}

/// Centre each caption line on the code image. The first line sits next to
/// the code and later lines step away from it: upwards from a bottom-anchored
/// code, downwards from a top-anchored one.
pub fn caption_lines(
    code: &DrawRect,
    policy: &AnnotationPolicy,
    block: &CaptionBlock,
) -> Vec<CaptionLine> {
    let pitch = policy.line_pitch();

    let (first_baseline, step) = match policy.anchor {
        CodeAnchor::BottomRight => (code.y + code.height + policy.caption_gap, pitch),
        CodeAnchor::TopRight => (code.y - policy.caption_gap - policy.font_size, -pitch),
    };

    block
        .lines
        .iter()
        .enumerate()
        .map(|(index, (text, width))| CaptionLine {
            text: text.clone(),
            x: code.x + (code.width - width) / 2.0,
            y: first_baseline + index as f32 * step,
            width: *width,
        })
        .collect()
}

/// Compute the full placement for one page.
pub fn place_page(
    geometry: PageGeometry,
    policy: &AnnotationPolicy,
    watermark_size: Option<(f32, f32)>,
    caption: &CaptionBlock,
) -> PlacementResult {
    let code = code_rect(geometry, policy);
    PlacementResult {
        watermark: watermark_size.and_then(|size| watermark_rect(geometry, policy, size)),
        caption: caption_lines(&code, policy, caption),
        code,
        caption_opacity: policy.caption_opacity,
        font_size: policy.font_size,
    }
}
