// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SmartGrader: Core types, configuration, grading, and error definitions
// shared across all crates.

pub mod config;
pub mod error;
pub mod grading;
pub mod human_errors;
pub mod types;

pub use config::OmrConfig;
pub use error::OmrError;
pub use grading::grade_submission;
pub use types::*;
