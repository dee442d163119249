// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use stempel_core::error::StempelError;
use stempel_core::human_errors::humanize_error;
use thiserror::Error;
use tracing::error;

/// Headline returned for every failed generation.
const GENERATE_FAILED: &str = "Failed to generate PDF";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Job(#[from] StempelError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        let Self::Job(err) = self;
        match err {
            StempelError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StempelError::InvalidRequest(_) | StempelError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            StempelError::Render(_)
            | StempelError::CodeImage(_)
            | StempelError::Serialize(_)
            | StempelError::WatermarkFetch(_)
            | StempelError::WatermarkDecode(_)
            | StempelError::InvalidPolicy(_)
            | StempelError::Internal(_)
            | StempelError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    details: String,
    suggestion: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let Self::Job(err) = &self;
        let human = humanize_error(err);
        error!(
            status = status.as_u16(),
            error = %err,
            summary = %human.message,
            "PDF generation failed"
        );

        let body = ErrorResponse {
            error: GENERATE_FAILED,
            details: err.to_string(),
            suggestion: human.suggestion,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: StempelError) -> StatusCode {
        ServerError::from(err).status()
    }

    #[test]
    fn statuses_follow_error_class() {
        assert_eq!(status_of(StempelError::Render("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(StempelError::Serialize("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(StempelError::CodeImage("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(StempelError::Load("x".into())), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(StempelError::InvalidRequest("x".into())), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn body_pairs_details_with_the_remedy() {
        let err = StempelError::Render("renderer request timed out: deadline".into());
        let response = ServerError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], GENERATE_FAILED);
        assert_eq!(body["details"], "HTML rendering failed: renderer request timed out: deadline");
        assert!(body["suggestion"].as_str().unwrap().starts_with("Reduce the size of the HTML"));
    }
}
