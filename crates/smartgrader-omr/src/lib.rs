// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// smartgrader-omr: Optical mark recognition for photographed answer sheets.
//
// Provides preprocessing (resize, grayscale, blur, Canny edges), sheet location
// and perspective rectification, bubble-grid sampling, best-effort name hints
// read from the sheet header, and a pipeline that runs them per photo or over
// a parallel batch.

pub mod image;
pub mod name_hint;
pub mod pipeline;
pub mod scan;

// Re-export the primary structs so callers can use `smartgrader_omr::OmrPipeline` etc.
pub use self::image::{PreparedImage, Preprocessor};
pub use name_hint::{NameHintExtractor, TextRecognizer, parse_name_hint};
pub use pipeline::{OmrPipeline, SheetScan, process_answer_sheet};
pub use scan::{DocumentLocator, GridSampler, Quadrilateral, RectifiedSheet};

#[cfg(feature = "ocr")]
pub use scan::ocr::{OcrConfig, OcrEngine};
