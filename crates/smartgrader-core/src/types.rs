// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for SmartGrader.

use serde::{Deserialize, Serialize};

use crate::error::{OmrError, Result};

/// The option marked for one question: `Some(index)` with
/// `index < num_options`, or `None` when nothing was confidently marked.
pub type DetectedAnswer = Option<usize>;

/// Logical layout of the answer grid printed on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerGrid {
    /// One row per question.
    pub num_questions: u32,
    /// One column per option.
    pub num_options: u32,
}

impl AnswerGrid {
    /// Options are labelled `A` to `Z`.
    pub const MAX_OPTIONS: u32 = 26;

    /// Build a grid, rejecting empty dimensions and more options than
    /// there are letters.
    pub fn new(num_questions: u32, num_options: u32) -> Result<Self> {
        if num_questions == 0 || num_options == 0 {
            return Err(OmrError::InvalidGrid(format!(
                "grid needs at least one question and one option, got {num_questions}x{num_options}"
            )));
        }
        if num_options > Self::MAX_OPTIONS {
            return Err(OmrError::InvalidGrid(format!(
                "at most {} options per question are supported, got {num_options}",
                Self::MAX_OPTIONS
            )));
        }
        Ok(Self {
            num_questions,
            num_options,
        })
    }

    /// Width and height the image must have so every cell is the same size:
    /// the nearest multiple of the option and question counts, never smaller
    /// than one pixel per cell.
    pub fn aligned_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (
            nearest_multiple(width, self.num_options),
            nearest_multiple(height, self.num_questions),
        )
    }

    /// Every cell of the grid must get at least one pixel of a `width` x
    /// `height` sheet.
    pub fn check_fits(&self, width: u32, height: u32) -> Result<()> {
        if self.num_questions > height || self.num_options > width {
            return Err(OmrError::InvalidGrid(format!(
                "a {}x{} grid does not fit a {width}x{height} sheet",
                self.num_questions, self.num_options
            )));
        }
        Ok(())
    }

    /// Whether `width` x `height` already splits into equal cells.
    pub fn divides(&self, width: u32, height: u32) -> bool {
        width % self.num_options == 0 && height % self.num_questions == 0
    }
}

fn nearest_multiple(value: u32, divisor: u32) -> u32 {
    let (value, divisor) = (u64::from(value), u64::from(divisor));
    let cells = ((value + divisor / 2) / divisor).max(1);
    u32::try_from(cells * divisor).unwrap_or(u32::MAX)
}

/// Student name proposed from the sheet header by text recognition.
///
/// Best effort only: either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameHint {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NameHint {
    /// A hint with neither field set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }

    /// Both first and last name were found.
    pub fn is_complete(&self) -> bool {
        self.first_name.is_some() && self.last_name.is_some()
    }

    /// Number of populated fields (0..=2), used to rank partial hints.
    pub fn completeness(&self) -> usize {
        usize::from(self.first_name.is_some()) + usize::from(self.last_name.is_some())
    }

    /// Display name for a submission: "First Last", whichever half exists,
    /// or "Unknown".
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => "Unknown".to_string(),
        }
    }
}

/// Stable, serializable reason code for a failed sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The bytes are not a readable image.
    Decode,
    /// No significant four-sided boundary in the photo.
    NoDocumentFound,
    /// The requested grid or configuration cannot be used.
    InvalidInput,
    /// The file could not be read by the caller.
    Unreadable,
    /// Anything else.
    Internal,
}

impl From<&OmrError> for FailureReason {
    fn from(err: &OmrError) -> Self {
        match err {
            OmrError::Decode(_) => Self::Decode,
            OmrError::NoDocumentFound(_) => Self::NoDocumentFound,
            OmrError::InvalidGrid(_) | OmrError::InvalidConfig(_) => Self::InvalidInput,
            OmrError::Io(_) => Self::Unreadable,
            OmrError::TextRecognition(_) | OmrError::Serialization(_) => Self::Internal,
        }
    }
}

/// Terminal output of processing one answer-sheet photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OmrResult {
    Success {
        /// One entry per question, in question order.
        answers: Vec<DetectedAnswer>,
        name_hint: Option<NameHint>,
    },
    Failure {
        reason: FailureReason,
        message: String,
    },
}

impl OmrResult {
    /// Tag an error as the failed outcome for one image.
    pub fn failure(err: &OmrError) -> Self {
        Self::Failure {
            reason: FailureReason::from(err),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Detected answers, if the sheet was read.
    pub fn answers(&self) -> Option<&[DetectedAnswer]> {
        match self {
            Self::Success { answers, .. } => Some(answers),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(*reason),
        }
    }
}

/// Per-question grading record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingDetail {
    /// Zero-based question index.
    pub index: usize,
    pub detected: DetectedAnswer,
    pub correct: usize,
    pub is_correct: bool,
}

/// Aggregate grade of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub score: usize,
    pub total: usize,
    /// `score / total * 100`, two decimals; `0.0` when `total` is zero.
    pub percentage: f64,
    pub details: Vec<GradingDetail>,
}

/// Letter printed above an option column (`0 -> 'A'`), for up to 26 options.
pub fn option_letter(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
}

/// Inverse of [`option_letter`], case-insensitive.
pub fn option_index(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| usize::from(upper as u8 - b'A'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rejects_zero_dimensions() {
        assert!(AnswerGrid::new(0, 5).is_err());
        assert!(AnswerGrid::new(20, 0).is_err());
        assert!(AnswerGrid::new(20, 5).is_ok());
    }

    #[test]
    fn grid_rejects_more_options_than_letters() {
        assert!(AnswerGrid::new(20, 26).is_ok());
        assert!(matches!(
            AnswerGrid::new(20, 27),
            Err(OmrError::InvalidGrid(_))
        ));
    }

    #[test]
    fn grid_must_fit_the_sheet() {
        let grid = AnswerGrid::new(700, 5).unwrap();
        assert!(grid.check_fits(550, 700).is_ok());
        let grid = AnswerGrid::new(701, 5).unwrap();
        assert!(grid.check_fits(550, 700).is_err());
        let grid = AnswerGrid::new(u32::MAX, 5).unwrap();
        assert!(matches!(
            grid.check_fits(550, 700),
            Err(OmrError::InvalidGrid(_))
        ));
        assert_eq!(grid.aligned_dimensions(550, 700).1, u32::MAX);
    }

    #[test]
    fn aligned_dimensions_round_to_nearest_multiple() {
        let grid = AnswerGrid::new(20, 4).unwrap();
        assert_eq!(grid.aligned_dimensions(550, 700), (552, 700));
        let grid = AnswerGrid::new(30, 7).unwrap();
        assert_eq!(grid.aligned_dimensions(550, 700), (553, 690));
        assert!(grid.divides(553, 690));
        assert!(!grid.divides(550, 700));
    }

    #[test]
    fn aligned_dimensions_never_collapse_below_one_pixel_per_cell() {
        let grid = AnswerGrid::new(100, 26).unwrap();
        assert_eq!(grid.aligned_dimensions(10, 20), (26, 100));
    }

    #[test]
    fn full_name_follows_available_fields() {
        let mut hint = NameHint::empty();
        assert_eq!(hint.full_name(), "Unknown");
        hint.last_name = Some("Popescu".into());
        assert_eq!(hint.full_name(), "Popescu");
        hint.first_name = Some("Ana".into());
        assert_eq!(hint.full_name(), "Ana Popescu");
        assert!(hint.is_complete());
        assert_eq!(hint.completeness(), 2);
    }

    #[test]
    fn option_letters_round_trip_within_alphabet() {
        assert_eq!(option_letter(0), Some('A'));
        assert_eq!(option_letter(25), Some('Z'));
        assert_eq!(option_letter(26), None);
        assert_eq!(option_index('c'), Some(2));
        assert_eq!(option_index('Z'), Some(25));
        assert_eq!(option_index('3'), None);
    }

    #[test]
    fn failure_result_serializes_with_reason_code() {
        let err = OmrError::NoDocumentFound("no quadrilateral".into());
        let result = OmrResult::failure(&err);
        assert_eq!(result.failure_reason(), Some(FailureReason::NoDocumentFound));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "no_document_found");
    }

    #[test]
    fn success_result_serializes_unanswered_as_null() {
        let result = OmrResult::Success {
            answers: vec![Some(1), None],
            name_hint: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["answers"], serde_json::json!([1, null]));
        assert_eq!(result.answers(), Some(&[Some(1), None][..]));
    }
}
