// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service configuration. One `AppConfig` is built at startup and handed to
// the orchestrator; nothing reads process-wide flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AnnotationPolicy, PageSetup};

/// Built-in PDF font used for captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionFont {
    #[default]
    Helvetica,
    Courier,
}

/// Appearance of the generated code image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeImageSettings {
    /// Target raster size in pixels (the image is square).
    pub size: u32,
    /// Quiet zone around the symbol, in modules.
    pub quiet_zone_modules: u32,
    /// Foreground colour as `#RRGGBB`.
    pub dark: String,
    /// Background colour as `#RRGGBB`.
    pub light: String,
}

impl Default for CodeImageSettings {
    fn default() -> Self {
        Self {
            size: 200,
            quiet_zone_modules: 1,
            dark: "#000000".into(),
            light: "#FFFFFF".into(),
        }
    }
}

/// Values used when a request leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDefaults {
    pub html: String,
    pub watermark_url: Option<String>,
    pub code: String,
    pub code_name: String,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            html: "<h1>Hello World</h1>".into(),
            watermark_url: None,
            code: "https://example.com".into(),
            code_name: "Sample Code".into(),
        }
    }
}

/// Service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP endpoint binds to.
    pub server_host: String,
    /// Port for the HTTP endpoint (default 3000).
    pub server_port: u16,
    /// Base URL of the Gotenberg-compatible Chromium rendering service.
    pub renderer_url: String,
    /// Upper bound for one rendering call. Exceeding it fails the job.
    pub render_timeout_secs: u64,
    /// Upper bound for fetching the watermark. Exceeding it only drops the
    /// watermark layer.
    pub watermark_timeout_secs: u64,
    /// Largest rendered PDF accepted from the renderer.
    pub max_document_bytes: u64,
    /// Largest watermark download. Bigger images only drop the layer.
    pub max_watermark_bytes: u64,
    pub page: PageSetup,
    pub policy: AnnotationPolicy,
    pub font: CaptionFont,
    pub code_image: CodeImageSettings,
    pub defaults: JobDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            renderer_url: "http://127.0.0.1:3001".into(),
            render_timeout_secs: 30,
            watermark_timeout_secs: 10,
            max_document_bytes: 100 * 1024 * 1024,
            max_watermark_bytes: 20 * 1024 * 1024,
            page: PageSetup::default(),
            policy: AnnotationPolicy::default(),
            font: CaptionFont::default(),
            code_image: CodeImageSettings::default(),
            defaults: JobDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn watermark_timeout(&self) -> Duration {
        Duration::from_secs(self.watermark_timeout_secs)
    }
}
