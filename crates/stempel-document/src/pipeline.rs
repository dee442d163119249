// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation pipeline — load a rendered PDF, stamp every page, serialise.
//
// The pipeline is synchronous and CPU-bound. Async callers should run it on
// a blocking thread.

use lopdf::ObjectId;
use stempel_core::config::AppConfig;
use stempel_core::error::{Result, StempelError};
use stempel_core::types::{AnnotatedDocument, AnnotationJob, AnnotationPolicy};
use tracing::{debug, info, instrument, warn};

use crate::image::embed::{EmbeddedImage, ImageRole};
use crate::layout::{CaptionBlock, place_page};
use crate::pdf::overlay::{PageAnnotator, SharedResources};
use crate::pdf::reader::{PageBox, PdfReader};
use crate::text::metrics::StandardFont;

/// Stamps documents with a validated [`AnnotationPolicy`].
#[derive(Debug, Clone)]
pub struct AnnotationPipeline {
    policy: AnnotationPolicy,
    font: StandardFont,
}

impl AnnotationPipeline {
    pub fn new(policy: AnnotationPolicy, font: StandardFont) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy, font })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.policy, config.font.into())
    }

    /// Stamp every page of `job.document_bytes`.
    ///
    /// A missing or undecodable watermark only drops that layer. A bad code
    /// image or document fails the whole job.
    #[instrument(skip_all, fields(
        document_len = job.document_bytes.len(),
        has_watermark = job.watermark_image.is_some(),
    ))]
    pub fn annotate_document(&self, job: AnnotationJob) -> Result<AnnotatedDocument> {
        let mut reader = PdfReader::from_bytes(&job.document_bytes)?;
        let code = EmbeddedImage::decode(&job.code_image, ImageRole::Code)?;
        let watermark = match job.watermark_image.as_deref() {
            Some(data) => match EmbeddedImage::decode(data, ImageRole::Watermark) {
                Ok(image) => Some(image),
                Err(err) if !err.is_fatal() => {
                    warn!(error = %err, "Watermark unusable, stamping without it");
                    None
                }
                Err(err) => return Err(err),
            },
            None => None,
        };

        let pages: Vec<(ObjectId, PageBox)> = reader
            .page_ids()
            .into_iter()
            .map(|id| (id, reader.page_box(id)))
            .collect();
        let caption = CaptionBlock::wrap(&job.caption, &self.policy, &self.font);

        let doc = reader.document_mut();
        let shared = SharedResources::embed(doc, &self.policy, self.font, &code, watermark.as_ref());
        let annotator = PageAnnotator::new(&shared);

        for (index, (page_id, page_box)) in pages.iter().enumerate() {
            let placement = place_page(
                page_box.geometry,
                &self.policy,
                shared.watermark_size(),
                &caption,
            );
            annotator.annotate(doc, *page_id, page_box, &placement)?;
            debug!(
                page = index + 1,
                width = page_box.geometry.width,
                height = page_box.geometry.height,
                "Page stamped"
            );
        }

        let mut document = reader.into_document();
        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|err| StempelError::Serialize(format!("failed to write PDF: {err}")))?;

        let page_count = document.get_pages().len();
        if page_count != pages.len() {
            return Err(StempelError::Internal(format!(
                "page count changed while stamping: {} -> {page_count}",
                pages.len()
            )));
        }

        info!(
            pages = page_count,
            output_len = bytes.len(),
            caption_lines = caption.len(),
            "Document stamped"
        );

        Ok(AnnotatedDocument { bytes, page_count })
    }

    /// Convenience wrapper over [`annotate_document`](Self::annotate_document).
    pub fn annotate_bytes(
        &self,
        document: &[u8],
        watermark: Option<&[u8]>,
        code: &[u8],
        caption: &str,
    ) -> Result<AnnotatedDocument> {
        self.annotate_document(AnnotationJob {
            document_bytes: document.to_vec(),
            watermark_image: watermark.map(<[u8]>::to_vec),
            code_image: code.to_vec(),
            caption: caption.to_string(),
        })
    }
}
