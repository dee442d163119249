// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — loading rendered PDFs and drawing the stamp overlay onto pages.

pub mod overlay;
pub mod reader;

pub use overlay::{PageAnnotator, SharedResources};
pub use reader::{PageBox, PdfReader};
