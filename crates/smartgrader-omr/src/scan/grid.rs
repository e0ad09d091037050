// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bubble detection: inverse binarization of the rectified sheet, equal-cell
// grid partitioning, and per-question argmax selection.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::contrast::{ThresholdType, threshold};
use smartgrader_core::types::{AnswerGrid, DetectedAnswer};
use tracing::{debug, info, instrument};

/// Decides which option, if any, is marked on each row of a rectified sheet.
///
/// Marks are darker than the paper, so the sheet is binarized with an
/// inverted threshold: marked pixels become "on" (255) and paper becomes
/// "off" (0). Each row then picks the cell with the most "on" pixels.
///
/// ## Selection rule
///
/// Argmax with a zero floor. The winning cell must have strictly more "on"
/// pixels than every cell to its left, so equal counts resolve to the lowest
/// option index. A row whose best count is zero is unanswered. There is no
/// fill-percentage cutoff: a faint or partly erased mark still wins its row
/// as long as it is the strongest one.
///
/// ## Sheet margin
///
/// The located outline sits on the desk side of the sheet edge, so a thin
/// band of desk survives rectification around the border. A frame
/// `margin` pixels wide is cleared after binarization so that band never
/// counts as ink.
#[derive(Debug, Clone, Copy)]
pub struct GridSampler {
    threshold: u8,
    margin: u32,
}

impl GridSampler {
    pub fn new(threshold: u8, margin: u32) -> Self {
        Self { threshold, margin }
    }

    /// Binarize, partition, and select in one step.
    #[instrument(skip_all, fields(
        width = rectified.width(),
        height = rectified.height(),
        questions = grid.num_questions,
        options = grid.num_options,
    ))]
    pub fn detect(&self, rectified: &GrayImage, grid: &AnswerGrid) -> Vec<DetectedAnswer> {
        let mut binary = self.binarize(rectified);
        self.clear_margin(&mut binary);
        let answers = self.sample(&binary, grid);
        info!(
            answered = answers.iter().filter(|a| a.is_some()).count(),
            total = answers.len(),
            "Bubbles sampled"
        );
        answers
    }

    /// Inverse threshold: pixels at or below the cutoff become 255, the
    /// rest 0.
    pub fn binarize(&self, gray: &GrayImage) -> GrayImage {
        threshold(gray, self.threshold, ThresholdType::BinaryInverted)
    }

    /// Turn the outer `margin` pixels of a binarized sheet "off".
    pub fn clear_margin(&self, binary: &mut GrayImage) {
        let m = self.margin;
        if m == 0 {
            return;
        }
        let (right, bottom) = (
            binary.width().saturating_sub(m),
            binary.height().saturating_sub(m),
        );
        for (x, y, pixel) in binary.enumerate_pixels_mut() {
            if x < m || y < m || x >= right || y >= bottom {
                *pixel = Luma([0u8]);
            }
        }
    }

    /// Select one answer per row of an already-binarized sheet.
    ///
    /// If the image does not split into equal cells it is first resized
    /// (nearest neighbour, so it stays binary) to the nearest dimensions
    /// that do.
    pub fn sample(&self, binary: &GrayImage, grid: &AnswerGrid) -> Vec<DetectedAnswer> {
        let (width, height) = binary.dimensions();
        let counts = if grid.divides(width, height) {
            cell_counts(binary, grid)
        } else {
            let (aligned_w, aligned_h) = grid.aligned_dimensions(width, height);
            debug!(
                width,
                height, aligned_w, aligned_h, "Grid does not divide sheet; resizing"
            );
            let aligned = imageops::resize(binary, aligned_w, aligned_h, FilterType::Nearest);
            cell_counts(&aligned, grid)
        };

        counts.iter().map(|row| select_option(row)).collect()
    }
}

/// Count "on" pixels per cell. The image dimensions must be exact multiples
/// of the grid.
fn cell_counts(binary: &GrayImage, grid: &AnswerGrid) -> Vec<Vec<u32>> {
    let (width, height) = binary.dimensions();
    let cell_w = width / grid.num_options;
    let cell_h = height / grid.num_questions;
    let mut counts = vec![vec![0u32; grid.num_options as usize]; grid.num_questions as usize];

    for (x, y, pixel) in binary.enumerate_pixels() {
        if pixel.0[0] != 0 {
            let row = (y / cell_h) as usize;
            let col = (x / cell_w) as usize;
            counts[row][col] += 1;
        }
    }

    counts
}

/// Index of the first cell holding the row maximum, or `None` when every
/// cell is empty.
fn select_option(row: &[u32]) -> DetectedAnswer {
    let mut selected = None;
    let mut max_count = 0u32;
    for (index, &count) in row.iter().enumerate() {
        if count > max_count {
            max_count = count;
            selected = Some(index);
        }
    }
    selected
}
