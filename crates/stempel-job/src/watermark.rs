// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watermark download. Every download failure is a `WatermarkFetch` error,
// which callers treat as "stamp without a watermark".

use std::time::Duration;

use stempel_core::error::{Result, StempelError};
use tracing::{debug, instrument};

use crate::body::read_limited;

/// Default cap on a downloaded watermark.
pub const DEFAULT_MAX_WATERMARK_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct WatermarkFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl WatermarkFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(client_build_error)?;
        Ok(Self {
            client,
            max_bytes: DEFAULT_MAX_WATERMARK_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Download the image at `url`. Transport errors, timeouts, non-success
    /// statuses, oversized and empty bodies are all errors.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_error = |err: reqwest::Error| StempelError::WatermarkFetch(format!("{url}: {err}"));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?;
        let bytes = read_limited(response, self.max_bytes)
            .await
            .map_err(|err| StempelError::WatermarkFetch(format!("{url}: {err}")))?;

        if bytes.is_empty() {
            return Err(StempelError::WatermarkFetch(format!("{url}: empty response body")));
        }

        debug!(bytes = bytes.len(), "Watermark downloaded");
        Ok(bytes)
    }
}

/// The client is part of the service setup, not of any one download.
fn client_build_error(err: reqwest::Error) -> StempelError {
    StempelError::Internal(format!("failed to build watermark HTTP client: {err}"))
}
