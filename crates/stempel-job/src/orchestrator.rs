// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job orchestration — one request from HTML to a stamped, base64-encoded PDF.
//
// Order: fill defaults, inject print CSS, render, generate the QR image,
// fetch the watermark (best effort), stamp every page, encode.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use stempel_core::config::{AppConfig, JobDefaults};
use stempel_core::error::{Result, StempelError};
use stempel_core::types::{AnnotationJob, JobId, PageSetup};
use stempel_document::AnnotationPipeline;
use tokio::task::JoinError;
use tracing::{info, instrument, warn};

use crate::code_image::CodeImageGenerator;
use crate::html::inject_print_css;
use crate::renderer::DocumentRenderer;
use crate::watermark::WatermarkFetcher;

/// Request body of the generate endpoint. Missing fields take the
/// configured [`JobDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateRequest {
    pub html: Option<String>,
    pub watermark_url: Option<String>,
    pub code: Option<String>,
    pub code_name: Option<String>,
}

/// Successful job output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub success: bool,
    pub pdf_base64: String,
    pub pages: usize,
}

/// A request with every default applied.
#[derive(Debug, Clone)]
struct ResolvedRequest {
    html: String,
    watermark_url: Option<String>,
    code: String,
    caption: String,
}

impl ResolvedRequest {
    fn resolve(request: GenerateRequest, defaults: &JobDefaults) -> Self {
        Self {
            html: request.html.unwrap_or_else(|| defaults.html.clone()),
            watermark_url: request
                .watermark_url
                .or_else(|| defaults.watermark_url.clone())
                .filter(|url| !url.trim().is_empty()),
            code: request.code.unwrap_or_else(|| defaults.code.clone()),
            caption: request.code_name.unwrap_or_else(|| defaults.code_name.clone()),
        }
    }
}

/// Runs jobs against one renderer. Holds no per-job state.
pub struct JobOrchestrator<R> {
    renderer: R,
    pipeline: Arc<AnnotationPipeline>,
    code_images: Arc<CodeImageGenerator>,
    watermarks: WatermarkFetcher,
    page: PageSetup,
    defaults: JobDefaults,
    render_timeout: Duration,
}

impl<R: DocumentRenderer> JobOrchestrator<R> {
    pub fn new(config: &AppConfig, renderer: R) -> Result<Self> {
        Ok(Self {
            renderer,
            pipeline: Arc::new(AnnotationPipeline::from_config(config)?),
            code_images: Arc::new(CodeImageGenerator::new(&config.code_image)?),
            watermarks: WatermarkFetcher::new(config.watermark_timeout())?
                .with_max_bytes(config.max_watermark_bytes),
            page: config.page,
            defaults: config.defaults.clone(),
            render_timeout: config.render_timeout(),
        })
    }

    /// Run one job to completion.
    #[instrument(skip_all, fields(job_id = %JobId::new()))]
    pub async fn run(&self, request: GenerateRequest) -> Result<JobResult> {
        let request = ResolvedRequest::resolve(request, &self.defaults);
        let html = inject_print_css(&request.html, &self.page);

        let document = tokio::time::timeout(self.render_timeout, self.renderer.render(&html, &self.page))
            .await
            .map_err(|_| {
                StempelError::Render(format!(
                    "rendering timed out after {}s",
                    self.render_timeout.as_secs_f32()
                ))
            })??;
        info!(pdf_len = document.len(), "HTML rendered");

        let generator = Arc::clone(&self.code_images);
        let payload = request.code;
        let code_image = tokio::task::spawn_blocking(move || generator.generate(&payload))
            .await
            .map_err(task_failed)??;

        let watermark_image = match request.watermark_url.as_deref() {
            Some(url) => match self.watermarks.fetch(url).await {
                Ok(bytes) => Some(bytes),
                Err(err) if !err.is_fatal() => {
                    warn!(error = %err, "Watermark download failed, stamping without it");
                    None
                }
                Err(err) => return Err(err),
            },
            None => None,
        };

        let job = AnnotationJob {
            document_bytes: document,
            watermark_image,
            code_image,
            caption: request.caption,
        };
        let pipeline = Arc::clone(&self.pipeline);
        let annotated = tokio::task::spawn_blocking(move || pipeline.annotate_document(job))
            .await
            .map_err(task_failed)??;

        info!(pages = annotated.page_count, "Job complete");

        Ok(JobResult {
            success: true,
            pdf_base64: BASE64.encode(&annotated.bytes),
            pages: annotated.page_count,
        })
    }
}

fn task_failed(err: JoinError) -> StempelError {
    StempelError::Internal(format!("blocking task failed: {err}"))
}
