// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-CSS injection — page size, margins and break rules the renderer must
// honour, spliced into caller-supplied HTML.

use stempel_core::types::PageSetup;

/// The `<style>` block for `page`.
pub fn print_stylesheet(page: &PageSetup) -> String {
    format!(
        "<style>\n\
         @page {{ size: {size}; margin: {margins}; }}\n\
         @page :first {{ margin-top: {first_top}mm; margin-bottom: {first_bottom}mm; }}\n\
         body {{ margin: 0; font-family: Arial, sans-serif; }}\n\
         .avoid-break, img, table {{ break-inside: avoid; page-break-inside: avoid; }}\n\
         .keep-together {{ break-inside: avoid; page-break-inside: avoid; }}\n\
         * {{ box-sizing: border-box; }}\n\
         </style>",
        size = page.paper_size.css_size(),
        margins = page.margins.css(),
        first_top = page.first_page_top_mm,
        first_bottom = page.first_page_bottom_mm,
    )
}

/// Put the print stylesheet into `html`.
///
/// - after the opening `<head>` tag if there is one;
/// - else in a new `<head>` right after the opening `<html>` tag;
/// - else the fragment is wrapped in a complete document.
///
/// Tag matching ignores case and accepts attributes.
pub fn inject_print_css(html: &str, page: &PageSetup) -> String {
    let css = print_stylesheet(page);

    if let Some(end) = opening_tag_end(html, "head") {
        return splice(html, end, &css);
    }
    if let Some(end) = opening_tag_end(html, "html") {
        return splice(html, end, &format!("<head>{css}</head>"));
    }
    format!("<!doctype html><html><head>{css}</head><body>{html}</body></html>")
}

/// Byte offset just past the `>` of the first `<name ...>` tag.
///
/// `<header>` does not count as `<head>`: the name must be followed by
/// whitespace or `>`.
fn opening_tag_end(html: &str, name: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let needle = format!("<{name}");
    let bytes = lower.as_bytes();

    let mut from = 0;
    while let Some(found) = lower[from..].find(&needle) {
        let start = from + found;
        let after = start + needle.len();
        match bytes.get(after) {
            Some(b) if *b == b'>' || b.is_ascii_whitespace() => {
                return lower[after..].find('>').map(|close| after + close + 1);
            }
            _ => from = after,
        }
    }
    None
}

fn splice(html: &str, at: usize, insert: &str) -> String {
    let mut out = String::with_capacity(html.len() + insert.len());
    out.push_str(&html[..at]);
    out.push_str(insert);
    out.push_str(&html[at..]);
    out
}
