// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text module — font metrics for the built-in PDF fonts and caption wrapping.

pub mod metrics;
pub mod wrap;

pub use metrics::{FontMetrics, StandardFont};
pub use wrap::{WrapConfig, wrap, wrap_with};
