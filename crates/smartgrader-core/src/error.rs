// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for SmartGrader.

use thiserror::Error;

/// Top-level error type for all SmartGrader operations.
#[derive(Debug, Error)]
pub enum OmrError {
    // -- Per-image pipeline failures --
    #[error("failed to decode answer sheet image: {0}")]
    Decode(String),

    #[error("answer sheet not found: {0}")]
    NoDocumentFound(String),

    #[error("invalid answer grid: {0}")]
    InvalidGrid(String),

    // -- Setup --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Only ever logged; name hints degrade to absent fields.
    #[error("text recognition failed: {0}")]
    TextRecognition(String),

    // -- Collaborator-side I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OmrError>;
