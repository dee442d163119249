// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Stempel annotation service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StempelError};

/// Unique identifier for a stamping job, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Page setup ---------------------------------------------------------------

/// Standard paper sizes understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in inches (width, height), as expected by Chromium's
    /// print settings.
    pub fn dimensions_in(&self) -> (f64, f64) {
        match self {
            Self::Letter => (8.5, 11.0),
            Self::Legal => (8.5, 14.0),
            other => {
                let (w, h) = other.dimensions_mm();
                (f64::from(w) / 25.4, f64::from(h) / 25.4)
            }
        }
    }

    /// Value for the CSS `@page { size: ... }` descriptor.
    pub fn css_size(&self) -> String {
        match self {
            Self::A4 => "A4".into(),
            Self::A3 => "A3".into(),
            Self::A5 => "A5".into(),
            Self::Letter => "letter".into(),
            Self::Legal => "legal".into(),
            Self::Custom {
                width_mm,
                height_mm,
            } => format!("{width_mm}mm {height_mm}mm"),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top_mm: f32,
    pub right_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
}

impl PageMargins {
    /// CSS shorthand (`top right bottom left`).
    pub fn css(&self) -> String {
        format!(
            "{}mm {}mm {}mm {}mm",
            self.top_mm, self.right_mm, self.bottom_mm, self.left_mm
        )
    }
}

/// Page size and margin directives injected into the HTML before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub paper_size: PaperSize,
    /// Margins for every page after the first.
    pub margins: PageMargins,
    /// Top margin of the first page (the first page usually carries a
    /// full-bleed header).
    pub first_page_top_mm: f32,
    /// Bottom margin of the first page.
    pub first_page_bottom_mm: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            margins: PageMargins {
                top_mm: 25.0,
                right_mm: 0.0,
                bottom_mm: 20.0,
                left_mm: 0.0,
            },
            first_page_top_mm: 0.0,
            first_page_bottom_mm: 20.0,
        }
    }
}

// -- Annotation policy --------------------------------------------------------

/// Which page corner the code image is anchored to.
///
/// The first caption line always sits next to the code image and later lines
/// move away from it. With `BottomRight` the caption grows upwards above the
/// code image; with `TopRight` it hangs below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeAnchor {
    #[default]
    BottomRight,
    TopRight,
}

/// Layout constants applied identically to every page of a document.
///
/// All lengths are in PDF user-space units (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationPolicy {
    /// Side of the square code image.
    pub code_size: f32,
    /// Caption font size.
    pub font_size: f32,
    /// Distance from the page edges to the code image.
    pub margin: f32,
    pub watermark_opacity: f32,
    pub code_opacity: f32,
    pub caption_opacity: f32,
    /// Fraction of each page dimension the watermark may occupy.
    pub watermark_fraction: f32,
    /// Extra space between caption lines; line pitch is `font_size + line_gap`.
    pub line_gap: f32,
    /// Space between the code image and the nearest caption line.
    pub caption_gap: f32,
    pub anchor: CodeAnchor,
}

impl Default for AnnotationPolicy {
    fn default() -> Self {
        Self {
            code_size: 40.0,
            font_size: 6.0,
            margin: 10.0,
            watermark_opacity: 0.1,
            code_opacity: 0.7,
            caption_opacity: 0.7,
            watermark_fraction: 0.6,
            line_gap: 1.0,
            caption_gap: 2.0,
            anchor: CodeAnchor::BottomRight,
        }
    }
}

impl AnnotationPolicy {
    /// Vertical distance between consecutive caption baselines.
    pub fn line_pitch(&self) -> f32 {
        self.font_size + self.line_gap
    }

    /// Reject policies outside the supported ranges.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, msg: impl FnOnce() -> String) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(StempelError::InvalidPolicy(msg()))
            }
        }

        check(self.code_size > 0.0, || {
            format!("code_size must be positive, got {}", self.code_size)
        })?;
        check(self.font_size > 0.0, || {
            format!("font_size must be positive, got {}", self.font_size)
        })?;
        check((5.0..=10.0).contains(&self.margin), || {
            format!("margin must be within 5..=10, got {}", self.margin)
        })?;
        check(
            self.watermark_opacity > 0.0 && self.watermark_opacity <= 1.0,
            || {
                format!(
                    "watermark_opacity must be within (0, 1], got {}",
                    self.watermark_opacity
                )
            },
        )?;
        check((0.5..=0.7).contains(&self.code_opacity), || {
            format!(
                "code_opacity must be within 0.5..=0.7, got {}",
                self.code_opacity
            )
        })?;
        check(
            (self.caption_opacity - self.code_opacity).abs() < 1e-6,
            || {
                format!(
                    "caption_opacity ({}) must match code_opacity ({})",
                    self.caption_opacity, self.code_opacity
                )
            },
        )?;
        check((0.5..=0.6).contains(&self.watermark_fraction), || {
            format!(
                "watermark_fraction must be within 0.5..=0.6, got {}",
                self.watermark_fraction
            )
        })?;
        check((1.0..=2.0).contains(&self.line_gap), || {
            format!("line_gap must be within 1..=2, got {}", self.line_gap)
        })?;
        check(self.caption_gap >= 0.0, || {
            format!("caption_gap must not be negative, got {}", self.caption_gap)
        })
    }
}

// -- Annotation inputs and outputs -------------------------------------------

/// Width and height of a single page, read from its media box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

/// Everything the annotation pipeline needs for one document.
///
/// Built once per request and consumed by value.
#[derive(Debug, Clone)]
pub struct AnnotationJob {
    /// A rendered, paginated PDF.
    pub document_bytes: Vec<u8>,
    /// Encoded watermark image, if one could be obtained.
    pub watermark_image: Option<Vec<u8>>,
    /// Encoded code (QR) image.
    pub code_image: Vec<u8>,
    pub caption: String,
}

/// The stamped PDF and its page count.
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(AnnotationPolicy::default().validate().is_ok());
        assert!((AnnotationPolicy::default().line_pitch() - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn opacity_out_of_range_is_rejected() {
        let policy = AnnotationPolicy {
            code_opacity: 0.9,
            caption_opacity: 0.9,
            ..AnnotationPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(StempelError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn caption_opacity_must_follow_code_opacity() {
        let policy = AnnotationPolicy {
            caption_opacity: 0.5,
            ..AnnotationPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn margin_and_fraction_bounds() {
        let narrow = AnnotationPolicy {
            margin: 5.0,
            watermark_fraction: 0.5,
            ..AnnotationPolicy::default()
        };
        assert!(narrow.validate().is_ok());

        let too_wide = AnnotationPolicy {
            margin: 12.0,
            ..AnnotationPolicy::default()
        };
        assert!(too_wide.validate().is_err());

        let too_big = AnnotationPolicy {
            watermark_fraction: 0.8,
            ..AnnotationPolicy::default()
        };
        assert!(too_big.validate().is_err());
    }

    #[test]
    fn paper_sizes_for_renderer() {
        let (w, h) = PaperSize::A4.dimensions_in();
        assert!((w - 8.2677).abs() < 1e-3);
        assert!((h - 11.6929).abs() < 1e-3);
        assert_eq!(PaperSize::Letter.dimensions_in(), (8.5, 11.0));
        assert_eq!(
            PaperSize::Custom {
                width_mm: 100,
                height_mm: 150
            }
            .css_size(),
            "100mm 150mm"
        );
    }

    #[test]
    fn anchor_serialises_kebab_case() {
        let json = serde_json::to_string(&CodeAnchor::TopRight).unwrap();
        assert_eq!(json, "\"top-right\"");
    }
}
