// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer-key grading of detected answers.

use crate::types::{DetectedAnswer, GradingDetail, GradingResult};

/// Grade detected answers against the answer key.
///
/// The key drives the question count: `total` is `correct.len()`, and a
/// question with no detected entry (or an unanswered one) is simply wrong.
pub fn grade_submission(detected: &[DetectedAnswer], correct: &[usize]) -> GradingResult {
    let details: Vec<GradingDetail> = correct
        .iter()
        .enumerate()
        .map(|(index, &correct)| {
            let detected = detected.get(index).copied().flatten();
            GradingDetail {
                index,
                detected,
                correct,
                is_correct: detected == Some(correct),
            }
        })
        .collect();

    let score = details.iter().filter(|d| d.is_correct).count();
    let total = correct.len();

    GradingResult {
        score,
        total,
        percentage: percentage(score, total),
        details,
    }
}

/// `score / total * 100` rounded to two decimals, zero for an empty key.
fn percentage(score: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = score as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_score_rounds_to_two_decimals() {
        let result = grade_submission(&[Some(0), Some(1), Some(2)], &[0, 1, 3]);
        assert_eq!(result.score, 2);
        assert_eq!(result.total, 3);
        assert_eq!(result.percentage, 66.67);
        assert_eq!(result.details.len(), 3);
        assert!(result.details[0].is_correct);
        assert!(result.details[1].is_correct);
        assert!(!result.details[2].is_correct);
        assert_eq!(result.details[2].index, 2);
        assert_eq!(result.details[2].detected, Some(2));
        assert_eq!(result.details[2].correct, 3);
    }

    #[test]
    fn empty_key_scores_zero_percent() {
        let result = grade_submission(&[], &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.total, 0);
        assert_eq!(result.percentage, 0.0);
        assert!(result.details.is_empty());
    }

    #[test]
    fn unanswered_never_matches() {
        let result = grade_submission(&[None, Some(1)], &[0, 1]);
        assert_eq!(result.score, 1);
        assert_eq!(result.percentage, 50.0);
        assert!(!result.details[0].is_correct);
        assert_eq!(result.details[0].detected, None);
    }

    #[test]
    fn missing_detections_count_as_unanswered() {
        let result = grade_submission(&[Some(2)], &[2, 0, 1]);
        assert_eq!(result.score, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.percentage, 33.33);
        assert_eq!(result.details[2].detected, None);
    }

    #[test]
    fn perfect_score() {
        let result = grade_submission(&[Some(4), Some(0)], &[4, 0]);
        assert_eq!(result.score, 2);
        assert_eq!(result.percentage, 100.0);
    }
}
