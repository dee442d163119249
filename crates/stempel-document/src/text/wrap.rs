// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Greedy word-wrap measured in rendered width rather than character count.

use super::metrics::FontMetrics;

/// Width limit and font used when wrapping a caption.
#[derive(Clone, Copy)]
pub struct WrapConfig<'a> {
    pub max_width: f32,
    pub font_size: f32,
    pub metrics: &'a dyn FontMetrics,
}

/// Wrap `text` into lines no wider than `max_width` at `font_size`.
///
/// Tokens are split on any whitespace and re-joined with single spaces. A
/// token that alone exceeds `max_width` is emitted as its own line rather
/// than broken apart, so such a line is the only one that may overflow.
///
/// Empty or all-whitespace input produces no lines.
pub fn wrap(
    text: &str,
    max_width: f32,
    measure: impl Fn(&str, f32) -> f32,
    font_size: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for token in text.split_whitespace() {
        let candidate = if current.is_empty() {
            token.to_string()
        } else {
            format!("{current} {token}")
        };

        if measure(&candidate, font_size) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            // Nothing to flush: the token is wider than the line on its own.
            lines.push(candidate);
        } else {
            lines.push(std::mem::replace(&mut current, token.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// [`wrap`] driven by a [`WrapConfig`].
pub fn wrap_with(config: &WrapConfig<'_>, text: &str) -> Vec<String> {
    wrap(
        text,
        config.max_width,
        |candidate, size| config.metrics.width_of_text_at_size(candidate, size),
        config.font_size,
    )
}
