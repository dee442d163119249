// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stempel-job — Everything around the annotation pipeline for one request:
// print-CSS injection, the HTTP renderer client, QR code generation,
// best-effort watermark download, and the orchestrator that ties them to
// `stempel_document::AnnotationPipeline`.

mod body;
pub mod code_image;
pub mod html;
pub mod orchestrator;
pub mod renderer;
pub mod watermark;

#[cfg(test)]
pub(crate) mod testing;

pub use code_image::CodeImageGenerator;
pub use html::{inject_print_css, print_stylesheet};
pub use orchestrator::{GenerateRequest, JobOrchestrator, JobResult};
pub use renderer::{ChromiumRenderer, DocumentRenderer};
pub use watermark::WatermarkFetcher;
