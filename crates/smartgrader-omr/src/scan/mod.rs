// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning stages: sheet location and rectification, bubble detection, and
// optical character recognition (OCR) for the header.

pub mod grid;
pub mod locate;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use grid::GridSampler;
pub use locate::{DocumentLocator, Point2, Quadrilateral, RectifiedSheet};

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrEngine};
