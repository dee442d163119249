// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for API callers.
//
// Every technical error is mapped to a plain summary with a concrete remedy.
// The summary goes to the server log, the remedy to the caller.

use crate::error::StempelError;

/// A human-readable error with a summary and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary.
    pub message: String,
    /// What the caller should try.
    pub suggestion: String,
}

/// Convert a `StempelError` into a `HumanError`.
pub fn humanize_error(err: &StempelError) -> HumanError {
    match err {
        StempelError::Render(detail) => humanize_render_error(detail),

        StempelError::Load(_) => HumanError {
            message: "The rendered document could not be read.".into(),
            suggestion: "Check the HTML content and try again. Very large or malformed markup can produce an unreadable document.".into(),
        },

        StempelError::WatermarkFetch(_) => HumanError {
            message: "The watermark image could not be downloaded.".into(),
            suggestion: "Check that the watermark URL is publicly reachable. The document is still produced without a watermark.".into(),
        },

        StempelError::WatermarkDecode(_) => HumanError {
            message: "The watermark image is not a readable image.".into(),
            suggestion: "Use a PNG or JPEG watermark. The document is still produced without a watermark.".into(),
        },

        StempelError::CodeImage(_) => HumanError {
            message: "The QR code could not be generated.".into(),
            suggestion: "Shorten the code payload and try again.".into(),
        },

        StempelError::Serialize(_) => HumanError {
            message: "The stamped document could not be written.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
        },

        StempelError::InvalidPolicy(detail) => HumanError {
            message: "The stamping settings are invalid.".into(),
            suggestion: format!("Fix the service configuration. ({detail})"),
        },

        StempelError::InvalidRequest(detail) => HumanError {
            message: "The request could not be understood.".into(),
            suggestion: format!("Send a JSON body with html, watermarkUrl, code and codeName fields. ({detail})"),
        },

        StempelError::Internal(_) => HumanError {
            message: "The service had an internal problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
        },

        StempelError::Io(_) => HumanError {
            message: "There was a problem reading or writing a file.".into(),
            suggestion: "Check the configuration file path and permissions.".into(),
        },

        StempelError::Serialization(_) => HumanError {
            message: "Some data could not be converted to or from JSON.".into(),
            suggestion: "Check the JSON syntax of the request or configuration file.".into(),
        },
    }
}

/// Parse renderer failure details into a more specific message.
fn humanize_render_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("timed out") || lower.contains("timeout") {
        HumanError {
            message: "Rendering the HTML took too long.".into(),
            suggestion: "Reduce the size of the HTML or the number of external resources it loads, then try again.".into(),
        }
    } else if lower.contains("connection refused") || lower.contains("error sending request") {
        HumanError {
            message: "The rendering service is not reachable.".into(),
            suggestion: "Make sure the rendering service is running and the renderer URL is correct.".into(),
        }
    } else {
        HumanError {
            message: "The HTML could not be rendered.".into(),
            suggestion: "Check the HTML content and try again.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_timeout_asks_for_smaller_html() {
        let err = StempelError::Render("renderer timed out after 30s".into());
        let human = humanize_error(&err);
        assert_eq!(human.message, "Rendering the HTML took too long.");
        assert!(human.suggestion.starts_with("Reduce the size of the HTML"));
    }

    #[test]
    fn refused_connection_points_at_the_renderer() {
        let err = StempelError::Render("connection refused by renderer: tcp connect error".into());
        let human = humanize_error(&err);
        assert_eq!(human.message, "The rendering service is not reachable.");
    }

    #[test]
    fn generic_render_failure_asks_to_check_html() {
        let err = StempelError::Render("renderer answered 400 Bad Request".into());
        let human = humanize_error(&err);
        assert_eq!(human.message, "The HTML could not be rendered.");
        assert_eq!(human.suggestion, "Check the HTML content and try again.");
    }

    #[test]
    fn invalid_request_names_the_expected_fields() {
        let human = humanize_error(&StempelError::InvalidRequest("expected value".into()));
        assert!(human.suggestion.contains("watermarkUrl"));
        assert!(human.suggestion.ends_with("(expected value)"));
    }

    #[test]
    fn internal_failure_asks_for_a_report() {
        let human = humanize_error(&StempelError::Internal("join".into()));
        assert_eq!(human.message, "The service had an internal problem.");
        assert!(human.suggestion.contains("report"));
    }
}
