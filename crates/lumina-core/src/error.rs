// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lumina.

use thiserror::Error;

/// Top-level error type for all Lumina operations.
#[derive(Debug, Error)]
pub enum LuminaError {
    // -- Intake validation --
    #[error("the selected file is empty")]
    EmptyFile,

    #[error("file is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("request body is too large: {size} bytes (limit {limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    // -- Image errors --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Remote enhancement --
    #[error("enhancement timed out: {0}")]
    NetworkTimeout(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("enhancement service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("enhancement quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("enhancement service is misconfigured: {0}")]
    AuthConfiguration(String),

    #[error("enhancement request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid response from enhancement service: {0}")]
    InvalidResponse(String),

    #[error("enhancement failed: {0}")]
    Unknown(String),

    #[error("operation cancelled")]
    Cancelled,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LuminaError {
    /// Whether this error was raised by intake validation (before any
    /// decoding or network activity).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyFile
                | Self::FileTooLarge { .. }
                | Self::UnsupportedFormat(_)
                | Self::PayloadTooLarge { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LuminaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_errors_count_as_validation() {
        assert!(LuminaError::EmptyFile.is_validation());
        assert!(LuminaError::FileTooLarge { size: 2, limit: 1 }.is_validation());
        assert!(!LuminaError::Decode("truncated".into()).is_validation());
        assert!(!LuminaError::NetworkTimeout("180s".into()).is_validation());
    }
}
