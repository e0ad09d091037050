// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OmrError, Result};

/// Immutable settings for one OMR pipeline.
///
/// Every resolution and threshold the pipeline uses lives here, so a pipeline
/// built from one value behaves identically on every call and on every thread.
/// Missing fields in a JSON file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmrConfig {
    /// Width every photo is resized to before edge detection.
    pub working_width: u32,
    /// Height every photo is resized to before edge detection.
    pub working_height: u32,
    /// Width of the rectified answer-sheet image.
    pub output_width: u32,
    /// Height of the rectified answer-sheet image.
    pub output_height: u32,
    /// Gaussian blur sigma applied before Canny.
    pub blur_sigma: f32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Smallest quadrilateral accepted as the sheet, as a fraction of the
    /// working frame area.
    pub min_document_area_ratio: f64,
    /// Inverse binarization cutoff: pixels at or below it count as marked.
    pub binarize_threshold: u8,
    /// Border band of the rectified sheet, in pixels, ignored when counting
    /// marks. Desk or shadow left along the sheet edge would otherwise land
    /// in the first and last row and column.
    pub sheet_margin: u32,
    /// Top fraction of the working image searched for the student's name.
    pub name_header_fraction: f32,
}

impl Default for OmrConfig {
    fn default() -> Self {
        Self {
            working_width: 550,
            working_height: 700,
            output_width: 550,
            output_height: 700,
            blur_sigma: 1.0,
            canny_low: 10.0,
            canny_high: 50.0,
            approx_epsilon_ratio: 0.02,
            min_document_area_ratio: 0.05,
            binarize_threshold: 150,
            sheet_margin: 6,
            name_header_fraction: 0.30,
        }
    }
}

impl OmrConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.working_width == 0 || self.working_height == 0 {
            return Err(OmrError::InvalidConfig(format!(
                "working resolution must be non-zero, got {}x{}",
                self.working_width, self.working_height
            )));
        }
        if self.output_width < 2 || self.output_height < 2 {
            return Err(OmrError::InvalidConfig(format!(
                "output resolution must be at least 2x2, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        if self.sheet_margin.saturating_mul(2) >= self.output_width.min(self.output_height) {
            return Err(OmrError::InvalidConfig(format!(
                "sheet_margin {} leaves nothing of a {}x{} sheet",
                self.sheet_margin, self.output_width, self.output_height
            )));
        }
        if self.blur_sigma.is_nan() || self.blur_sigma <= 0.0 {
            return Err(OmrError::InvalidConfig(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return Err(OmrError::InvalidConfig(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {}/{}",
                self.canny_low, self.canny_high
            )));
        }
        if self.approx_epsilon_ratio.is_nan()
            || self.approx_epsilon_ratio <= 0.0
            || self.approx_epsilon_ratio >= 1.0
        {
            return Err(OmrError::InvalidConfig(format!(
                "approx_epsilon_ratio must be in (0, 1), got {}",
                self.approx_epsilon_ratio
            )));
        }
        if !(0.0..1.0).contains(&self.min_document_area_ratio) {
            return Err(OmrError::InvalidConfig(format!(
                "min_document_area_ratio must be in [0, 1), got {}",
                self.min_document_area_ratio
            )));
        }
        if self.name_header_fraction.is_nan()
            || self.name_header_fraction <= 0.0
            || self.name_header_fraction > 1.0
        {
            return Err(OmrError::InvalidConfig(format!(
                "name_header_fraction must be in (0, 1], got {}",
                self.name_header_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OmrConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.working_width, config.working_height), (550, 700));
        assert_eq!(config.binarize_threshold, 150);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = OmrConfig::from_json_str(r#"{ "binarize_threshold": 120 }"#)
            .expect("partial config should parse");
        assert_eq!(config.binarize_threshold, 120);
        assert_eq!(config.output_height, 700);
    }

    #[test]
    fn inverted_canny_thresholds_rejected() {
        let result = OmrConfig::from_json_str(r#"{ "canny_low": 80.0, "canny_high": 20.0 }"#);
        assert!(matches!(result, Err(OmrError::InvalidConfig(_))));
    }

    #[test]
    fn zero_resolution_rejected() {
        let config = OmrConfig {
            working_width: 0,
            ..OmrConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn margin_must_leave_an_interior() {
        let config = OmrConfig {
            output_width: 40,
            output_height: 40,
            sheet_margin: 20,
            ..OmrConfig::default()
        };
        assert!(matches!(config.validate(), Err(OmrError::InvalidConfig(_))));

        let config = OmrConfig::from_json_str(r#"{ "sheet_margin": 0 }"#).unwrap();
        assert_eq!(config.sheet_margin, 0);
        assert_eq!(OmrConfig::default().sheet_margin, 6);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let result = OmrConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(OmrError::Serialization(_))));
    }
}
