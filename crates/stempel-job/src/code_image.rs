// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR code image generation — encode a payload with `qrcode`, paint the
// modules with `image`, return PNG bytes.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use qrcode::{Color, QrCode};
use stempel_core::config::CodeImageSettings;
use stempel_core::error::{Result, StempelError};
use tracing::{debug, instrument};

/// Renders payloads as square QR code PNGs.
#[derive(Debug, Clone)]
pub struct CodeImageGenerator {
    size: u32,
    quiet_zone: usize,
    dark: Rgb<u8>,
    light: Rgb<u8>,
}

impl CodeImageGenerator {
    pub fn new(settings: &CodeImageSettings) -> Result<Self> {
        if settings.size == 0 {
            return Err(StempelError::CodeImage("code image size must be positive".into()));
        }
        Ok(Self {
            size: settings.size,
            quiet_zone: settings.quiet_zone_modules as usize,
            dark: parse_hex_color(&settings.dark)?,
            light: parse_hex_color(&settings.light)?,
        })
    }

    /// Encode `payload` and return a `size`×`size` PNG.
    #[instrument(skip_all, fields(payload_len = payload.len()))]
    pub fn generate(&self, payload: &str) -> Result<Vec<u8>> {
        let code = QrCode::new(payload.as_bytes())
            .map_err(|err| StempelError::CodeImage(format!("QR encoding failed: {err}")))?;

        let width = code.width();
        let modules = (width + 2 * self.quiet_zone) as u32;
        let mut canvas = RgbImage::from_pixel(modules, modules, self.light);
        for (y, row) in code.to_colors().chunks(width).enumerate() {
            for (x, module) in row.iter().enumerate() {
                if *module == Color::Dark {
                    canvas.put_pixel(
                        (x + self.quiet_zone) as u32,
                        (y + self.quiet_zone) as u32,
                        self.dark,
                    );
                }
            }
        }

        // Nearest keeps module edges hard.
        let scaled = imageops::resize(&canvas, self.size, self.size, FilterType::Nearest);

        let mut out = Cursor::new(Vec::new());
        scaled
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|err| StempelError::CodeImage(format!("PNG encoding failed: {err}")))?;

        debug!(modules, size = self.size, "QR code generated");
        Ok(out.into_inner())
    }
}

/// Parse `#RRGGBB` (the `#` is optional).
fn parse_hex_color(value: &str) -> Result<Rgb<u8>> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = || StempelError::CodeImage(format!("invalid colour {value:?}, expected #RRGGBB"));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
    };
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> CodeImageGenerator {
        CodeImageGenerator::new(&CodeImageSettings::default()).unwrap()
    }

    #[test]
    fn output_is_a_square_png_of_configured_size() {
        let png = generator().generate("https://example.com").unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    #[test]
    fn corners_are_quiet_and_finder_pattern_is_dark() {
        let png = generator().generate("https://example.com").unwrap();
        let rgb = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 255]));

        // Middle of the first module after the quiet zone: finder pattern.
        let code = QrCode::new(b"https://example.com").unwrap();
        let module_px = 200.0 / (code.width() + 2) as f32;
        let finder = (module_px * 1.5) as u32;
        assert_eq!(*rgb.get_pixel(finder, finder), Rgb([0, 0, 0]));
    }

    #[test]
    fn custom_colours_are_used() {
        let settings = CodeImageSettings {
            dark: "#1a2b3c".into(),
            light: "FFFF00".into(),
            ..CodeImageSettings::default()
        };
        let png = CodeImageGenerator::new(&settings).unwrap().generate("x").unwrap();
        let rgb = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 0]));
    }

    #[test]
    fn oversized_payload_is_a_code_image_error() {
        let payload = "x".repeat(8000);
        let err = generator().generate(&payload).unwrap_err();
        assert!(matches!(err, StempelError::CodeImage(_)));
    }

    #[test]
    fn bad_colour_is_rejected() {
        let settings = CodeImageSettings {
            dark: "black".into(),
            ..CodeImageSettings::default()
        };
        assert!(matches!(
            CodeImageGenerator::new(&settings),
            Err(StempelError::CodeImage(_))
        ));
    }
}
