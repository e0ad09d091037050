// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-file report printed as JSON.

use std::path::Path;

use serde::Serialize;
use smartgrader_core::human_errors::{HumanError, humanize_failure};
use smartgrader_core::{GradingResult, OmrResult, grade_submission};

use crate::answer_key::AnswerKey;

/// One entry of the output array.
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub file: String,
    pub result: OmrResult,
    /// Present when an answer key was given and the sheet was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradingResult>,
    /// Plain-language explanation of a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<HumanError>,
}

impl SheetReport {
    pub fn new(path: &Path, result: OmrResult, key: Option<&AnswerKey>) -> Self {
        let grade = match (&result, key) {
            (OmrResult::Success { answers, .. }, Some(key)) => {
                Some(grade_submission(answers, &key.0))
            }
            _ => None,
        };
        let problem = match &result {
            OmrResult::Failure { reason, message } => Some(humanize_failure(*reason, message)),
            OmrResult::Success { .. } => None,
        };

        Self {
            file: path.display().to_string(),
            result,
            grade,
            problem,
        }
    }
}
