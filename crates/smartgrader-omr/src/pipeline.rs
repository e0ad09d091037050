// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end answer-sheet processing: preprocess, locate, rectify, sample the
// bubble grid, and (optionally) read a name hint. Batches fan out over the
// rayon pool.

use image::GrayImage;
use rayon::prelude::*;
use smartgrader_core::error::Result;
use smartgrader_core::{AnswerGrid, DetectedAnswer, NameHint, OmrConfig, OmrResult};
use tracing::{info, instrument, warn};

use crate::image::Preprocessor;
use crate::name_hint::{NameHintExtractor, TextRecognizer};
use crate::scan::{DocumentLocator, GridSampler, Quadrilateral};

/// Everything learned from one sheet, including intermediates useful for
/// debugging a bad photo.
#[derive(Debug, Clone)]
pub struct SheetScan {
    pub answers: Vec<DetectedAnswer>,
    /// `None` when no text recognizer is configured.
    pub name_hint: Option<NameHint>,
    /// The perspective-corrected sheet at the output resolution.
    pub rectified: GrayImage,
    /// Sheet corners in working-resolution coordinates.
    pub corners: Quadrilateral,
}

/// The configured answer-sheet reader.
///
/// Holds only immutable configuration (plus an optional shared recognizer),
/// so one pipeline can serve any number of threads by reference.
///
/// # Example
///
/// ```rust,no_run
/// use smartgrader_omr::OmrPipeline;
/// use smartgrader_core::OmrConfig;
///
/// let pipeline = OmrPipeline::new(OmrConfig::default()).unwrap();
/// let bytes = std::fs::read("sheet.jpg").unwrap();
/// let result = pipeline.process_answer_sheet(&bytes, 20, 5);
/// println!("{}", serde_json::to_string(&result).unwrap());
/// ```
#[derive(Debug)]
pub struct OmrPipeline {
    config: OmrConfig,
    preprocessor: Preprocessor,
    locator: DocumentLocator,
    sampler: GridSampler,
    name_hints: Option<NameHintExtractor>,
}

impl OmrPipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(config: OmrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            preprocessor: Preprocessor::new(&config),
            locator: DocumentLocator::new(&config),
            sampler: GridSampler::new(config.binarize_threshold, config.sheet_margin),
            name_hints: None,
            config,
        })
    }

    /// Enable name hints using `recognizer` to read the sheet header.
    pub fn with_name_hints(mut self, recognizer: impl TextRecognizer + 'static) -> Self {
        self.name_hints = Some(NameHintExtractor::new(recognizer, &self.config));
        self
    }

    pub fn config(&self) -> &OmrConfig {
        &self.config
    }

    // -- Single sheet ---------------------------------------------------------

    /// Run every stage on one photo, surfacing the first error.
    #[instrument(skip_all, fields(
        bytes = data.len(),
        questions = grid.num_questions,
        options = grid.num_options,
    ))]
    pub fn scan(&self, data: &[u8], grid: &AnswerGrid) -> Result<SheetScan> {
        grid.check_fits(self.config.output_width, self.config.output_height)?;
        let prepared = self.preprocessor.prepare(data)?;
        let sheet = self.locator.locate(&prepared.edges, &prepared.gray)?;
        let answers = self.sampler.detect(&sheet.image, grid);
        let name_hint = self
            .name_hints
            .as_ref()
            .map(|extractor| extractor.extract(&prepared.gray));

        Ok(SheetScan {
            answers,
            name_hint,
            rectified: sheet.image,
            corners: sheet.corners,
        })
    }

    /// Read one sheet. Never fails: errors become [`OmrResult::Failure`].
    pub fn process_answer_sheet(
        &self,
        data: &[u8],
        num_questions: u32,
        num_options: u32,
    ) -> OmrResult {
        let outcome = AnswerGrid::new(num_questions, num_options)
            .and_then(|grid| self.scan(data, &grid));

        match outcome {
            Ok(scan) => OmrResult::Success {
                answers: scan.answers,
                name_hint: scan.name_hint,
            },
            Err(err) => {
                warn!(error = %err, "Answer sheet could not be read");
                OmrResult::failure(&err)
            }
        }
    }

    // -- Batch ----------------------------------------------------------------

    /// Read many sheets in parallel. The result at index `i` belongs to
    /// `images[i]`; one bad photo never affects the others.
    #[instrument(skip_all, fields(count = images.len()))]
    pub fn process_batch<B>(
        &self,
        images: &[B],
        num_questions: u32,
        num_options: u32,
    ) -> Vec<OmrResult>
    where
        B: AsRef<[u8]> + Sync,
    {
        let results: Vec<OmrResult> = images
            .par_iter()
            .map(|data| self.process_answer_sheet(data.as_ref(), num_questions, num_options))
            .collect();

        info!(
            succeeded = results.iter().filter(|r| r.is_success()).count(),
            total = results.len(),
            "Batch complete"
        );
        results
    }
}

/// Read one sheet with the default configuration and no name hints.
pub fn process_answer_sheet(data: &[u8], num_questions: u32, num_options: u32) -> OmrResult {
    match OmrPipeline::new(OmrConfig::default()) {
        Ok(pipeline) => pipeline.process_answer_sheet(data, num_questions, num_options),
        Err(err) => OmrResult::failure(&err),
    }
}
