// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTML-to-PDF rendering.
//
// Layout and pagination are delegated to a headless-Chromium service with a
// Gotenberg-compatible HTTP API; this module only ships the HTML and paper
// settings across and returns the PDF it gets back.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use stempel_core::error::{Result, StempelError};
use stempel_core::types::PageSetup;
use tracing::{debug, instrument};

use crate::body::{BodyError, read_limited};

/// Longest renderer error body echoed into an error message.
const MAX_ERROR_BODY: usize = 512;

/// Default cap on a rendered PDF.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 100 * 1024 * 1024;

/// Turns a complete HTML document into a paginated PDF.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        html: &str,
        page: &PageSetup,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Client for a Gotenberg-compatible Chromium conversion endpoint.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    client: reqwest::Client,
    endpoint: String,
    max_bytes: u64,
}

impl ChromiumRenderer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| StempelError::Render(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/forms/chromium/convert/html",
                base_url.trim_end_matches('/')
            ),
            max_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(html: &str, page: &PageSetup) -> Result<Form> {
        let index = Part::bytes(html.as_bytes().to_vec())
            .file_name("index.html")
            .mime_str("text/html")
            .map_err(|err| StempelError::Render(format!("invalid multipart part: {err}")))?;

        let (width_in, height_in) = page.paper_size.dimensions_in();
        Ok(Form::new()
            .part("files", index)
            .text("paperWidth", width_in.to_string())
            .text("paperHeight", height_in.to_string())
            .text("marginTop", "0")
            .text("marginBottom", "0")
            .text("marginLeft", "0")
            .text("marginRight", "0")
            .text("printBackground", "true")
            .text("preferCssPageSize", "true")
            .text("skipNetworkIdleEvent", "false"))
    }
}

impl DocumentRenderer for ChromiumRenderer {
    #[instrument(skip_all, fields(endpoint = %self.endpoint, html_len = html.len()))]
    async fn render(&self, html: &str, page: &PageSetup) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::form(html, page)?)
            .send()
            .await
            .map_err(|err| StempelError::Render(describe_transport_error(&err)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(StempelError::Render(format!(
                "renderer answered {status}: {body}"
            )));
        }

        let bytes = read_limited(response, self.max_bytes)
            .await
            .map_err(|err| match err {
                BodyError::Transport(err) => StempelError::Render(describe_transport_error(&err)),
                too_large => StempelError::Render(format!("renderer output rejected: {too_large}")),
            })?;
        if bytes.is_empty() {
            return Err(StempelError::Render("renderer returned an empty document".into()));
        }

        debug!(pdf_len = bytes.len(), "Renderer returned PDF");
        Ok(bytes)
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("renderer request timed out: {err}")
    } else if err.is_connect() {
        format!("connection refused by renderer: {err}")
    } else {
        format!("renderer request failed: {err}")
    }
}
