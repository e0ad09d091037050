// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable failure messages for whoever is grading a stack of photos.
//
// Every technical error is mapped to plain English with a clear suggestion,
// usually "take the photo again, like this".

use serde::Serialize;

use crate::error::OmrError;
use crate::types::FailureReason;

/// Severity of a failure from the grader's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Running the same input again may work.
    Transient,
    /// The grader must do something (re-photograph, fix the key).
    ActionRequired,
    /// Cannot be fixed by retrying; the input itself is unusable.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the grader should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same input can help.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert an `OmrError` into a `HumanError`.
pub fn humanize_error(err: &OmrError) -> HumanError {
    match err {
        OmrError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => HumanError {
            message: "The photo couldn't be found.".into(),
            suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        OmrError::Io(io_err) if io_err.kind() == std::io::ErrorKind::PermissionDenied => {
            HumanError {
                message: "We don't have permission to read that photo.".into(),
                suggestion: "Check the file permissions, or copy the photo somewhere else first."
                    .into(),
                retriable: false,
                severity: Severity::ActionRequired,
            }
        }
        OmrError::InvalidConfig(detail) => HumanError {
            message: "The grading settings are not valid.".into(),
            suggestion: format!("Fix the settings file and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        other => humanize_failure(FailureReason::from(other), &other.to_string()),
    }
}

/// Convert a failure reason code (as stored in an `OmrResult`) into a
/// `HumanError`.
pub fn humanize_failure(reason: FailureReason, detail: &str) -> HumanError {
    match reason {
        FailureReason::Decode => HumanError {
            message: "This file isn't a photo we can read.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        FailureReason::NoDocumentFound => HumanError {
            message: "We couldn't find the answer sheet in this photo.".into(),
            suggestion: "Photograph the sheet on a darker surface so all four edges of the answer box are visible, keep it roughly upright, and make sure it fills most of the frame.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FailureReason::InvalidInput => HumanError {
            message: "The test layout doesn't look right.".into(),
            suggestion: format!("Check the number of questions and options for this test. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FailureReason::Unreadable => HumanError {
            message: "There was a problem reading the photo file.".into(),
            suggestion: "Try again. If this keeps happening, copy the photo to a different folder first.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        FailureReason::Internal => HumanError {
            message: "Something went wrong while grading this sheet.".into(),
            suggestion: format!("Try again. If this keeps happening, please report it. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
