// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// API handlers: health check and PDF generation.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use stempel_core::error::StempelError;
use stempel_job::{DocumentRenderer, GenerateRequest, JobResult};
use tracing::{debug, info};

use crate::AppState;
use crate::error::ServerError;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "stempel-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/generate-pdf
pub async fn handle_generate_pdf<R>(
    State(state): State<AppState<R>>,
    body: Bytes,
) -> Result<Json<JobResult>, ServerError>
where
    R: DocumentRenderer + 'static,
{
    let request = parse_request(&body)?;
    debug!(
        html_len = request.html.as_ref().map(String::len),
        watermark = request.watermark_url.is_some(),
        "Generate request received"
    );

    let result = state.orchestrator.run(request).await?;
    info!(pages = result.pages, "PDF generated");
    Ok(Json(result))
}

#[derive(Serialize)]
pub struct MethodNotAllowed {
    pub error: &'static str,
}

/// Any other method on the generate route.
pub async fn handle_method_not_allowed() -> (StatusCode, Json<MethodNotAllowed>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MethodNotAllowed {
            error: "Method not allowed",
        }),
    )
}

/// An empty body or `null` means "all defaults".
fn parse_request(body: &[u8]) -> Result<GenerateRequest, StempelError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateRequest::default());
    }
    serde_json::from_slice::<Option<GenerateRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|err| StempelError::InvalidRequest(format!("body is not valid JSON: {err}")))
}
