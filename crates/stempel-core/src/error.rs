// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Stempel.

use thiserror::Error;

/// Top-level error type for all Stempel operations.
#[derive(Debug, Error)]
pub enum StempelError {
    // -- Rendering --
    #[error("HTML rendering failed: {0}")]
    Render(String),

    // -- Annotation pipeline --
    #[error("document could not be loaded: {0}")]
    Load(String),

    #[error("watermark image could not be fetched: {0}")]
    WatermarkFetch(String),

    #[error("watermark image could not be decoded: {0}")]
    WatermarkDecode(String),

    #[error("code image unavailable: {0}")]
    CodeImage(String),

    #[error("document could not be serialised: {0}")]
    Serialize(String),

    #[error("invalid annotation policy: {0}")]
    InvalidPolicy(String),

    // -- Request handling --
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StempelError {
    /// Whether this error must abort the job.
    ///
    /// Watermarking is best-effort: a watermark that cannot be fetched or
    /// decoded is dropped and the job carries on without that layer.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            StempelError::WatermarkFetch(_) | StempelError::WatermarkDecode(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StempelError>;
