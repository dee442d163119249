// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decode raster images and prepare them as PDF image XObjects.

pub mod embed;

pub use embed::{EmbeddedImage, ImageRole};
