// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Advance widths for the built-in (standard 14) PDF fonts used for captions.
//
// Widths come from the Adobe Type 1 AFM files, in units of 1/1000 em. Only
// printable ASCII is covered; anything else is drawn and measured as `?`.

use stempel_core::config::CaptionFont;

/// Measures the rendered width of a string at a given font size.
pub trait FontMetrics {
    /// Width of `text` in user-space units when set at `size`.
    fn width_of_text_at_size(&self, text: &str, size: f32) -> f32;
}

impl<F> FontMetrics for F
where
    F: Fn(&str, f32) -> f32,
{
    fn width_of_text_at_size(&self, text: &str, size: f32) -> f32 {
        self(text, size)
    }
}

/// Built-in PDF fonts that need no embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
    Courier,
}

/// Helvetica advance widths for code points 32 (space) through 126 (`~`).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space–/
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0–9
    278, 278, 584, 584, 584, 556, 1015, // :–@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A–M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N–Z
    278, 278, 278, 469, 556, 333, // [–`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a–m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n–z
    334, 260, 334, 584, // {–~
];

const COURIER_WIDTH: u16 = 600;

impl StandardFont {
    /// The `/BaseFont` name written into the font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
        }
    }

    /// Advance width of a single WinAnsi byte, in 1/1000 em.
    fn glyph_width(&self, byte: u8) -> u16 {
        match self {
            Self::Courier => COURIER_WIDTH,
            Self::Helvetica => HELVETICA_WIDTHS[usize::from(byte - 32)],
        }
    }

    /// Encode text into the single-byte form written to the content stream.
    ///
    /// Control characters and non-ASCII code points become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| match c {
                ' '..='~' => c as u8,
                _ => b'?',
            })
            .collect()
    }
}

impl From<CaptionFont> for StandardFont {
    fn from(font: CaptionFont) -> Self {
        match font {
            CaptionFont::Helvetica => Self::Helvetica,
            CaptionFont::Courier => Self::Courier,
        }
    }
}

impl FontMetrics for StandardFont {
    fn width_of_text_at_size(&self, text: &str, size: f32) -> f32 {
        let units: u32 = self
            .encode(text)
            .into_iter()
            .map(|byte| u32::from(self.glyph_width(byte)))
            .sum();
        units as f32 * size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn helvetica_sample_caption_width() {
        // S a m p l e _ C o d e = 6058 units
        let width = StandardFont::Helvetica.width_of_text_at_size("Sample Code", 6.0);
        assert!(approx(width, 36.348), "got {width}");
    }

    #[test]
    fn courier_is_monospaced() {
        let font = StandardFont::Courier;
        assert!(approx(font.width_of_text_at_size("iiii", 10.0), 24.0));
        assert!(approx(font.width_of_text_at_size("WWWW", 10.0), 24.0));
    }

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(StandardFont::Helvetica.width_of_text_at_size("", 12.0), 0.0);
    }

    #[test]
    fn non_ascii_is_measured_as_question_mark() {
        let font = StandardFont::Helvetica;
        assert_eq!(font.encode("Mã QR"), b"M? QR".to_vec());
        assert!(approx(
            font.width_of_text_at_size("ã", 10.0),
            font.width_of_text_at_size("?", 10.0)
        ));
    }

    #[test]
    fn closures_act_as_metrics() {
        let fixed = |text: &str, size: f32| text.len() as f32 * size;
        assert!(approx(fixed.width_of_text_at_size("abc", 2.0), 6.0));
    }
}
