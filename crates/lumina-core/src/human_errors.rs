// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Status codes and transport details never reach the message text.

use crate::error::LuminaError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Busy servers or timeouts; trying again later may work.
    Transient,
    /// The user should pick a different file.
    ActionRequired,
    /// Cannot be fixed by retrying.
    Permanent,
    /// The service itself is misconfigured; not the user's fault.
    Configuration,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a "Try again" button makes sense.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: &str, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert a `LuminaError` into a `HumanError`.
pub fn humanize_error(err: &LuminaError) -> HumanError {
    match err {
        // -- Intake --
        LuminaError::EmptyFile => HumanError::new(
            "The selected file is empty.",
            "Please select a valid image file.",
            false,
            Severity::ActionRequired,
        ),

        LuminaError::FileTooLarge { limit, .. } => HumanError::new(
            "This file is too large.",
            &format!(
                "The maximum size is {}. Try a smaller image or export it at a lower resolution.",
                describe_size(*limit)
            ),
            false,
            Severity::ActionRequired,
        ),

        LuminaError::UnsupportedFormat(_) => HumanError::new(
            "This image format isn't supported.",
            "Please use a JPG, PNG, or WEBP image.",
            false,
            Severity::ActionRequired,
        ),

        LuminaError::PayloadTooLarge { .. } => HumanError::new(
            "This image is too large to send for enhancement.",
            "Please try with a smaller image.",
            false,
            Severity::ActionRequired,
        ),

        // -- Image --
        LuminaError::Decode(_) => HumanError::new(
            "There was an issue with the image file.",
            "The file may be damaged or in an unusual format. Please try a different image.",
            false,
            Severity::ActionRequired,
        ),

        LuminaError::Encode(_) => HumanError::new(
            "The edited image couldn't be saved.",
            "Please try again. If this keeps happening, try a smaller image.",
            true,
            Severity::Permanent,
        ),

        // -- Remote --
        LuminaError::NetworkTimeout(_) => HumanError::new(
            "The request took too long.",
            "Please try with a smaller image.",
            true,
            Severity::Transient,
        ),

        LuminaError::Network(_) => HumanError::new(
            "We couldn't reach the enhancement service.",
            "Check your internet connection, then try again.",
            true,
            Severity::Transient,
        ),

        LuminaError::ServiceUnavailable(_) | LuminaError::InvalidResponse(_) => HumanError::new(
            "Our AI servers are busy.",
            "Please try again in a moment.",
            true,
            Severity::Transient,
        ),

        LuminaError::QuotaExceeded(_) => HumanError::new(
            "Today's enhancement quota has been used up.",
            "Please try again later.",
            true,
            Severity::Transient,
        ),

        LuminaError::AuthConfiguration(_) => HumanError::new(
            "The enhancement service isn't set up correctly.",
            "This is a problem on our side, not with your image. Please try again later.",
            false,
            Severity::Configuration,
        ),

        LuminaError::Rejected { .. } => HumanError::new(
            "The enhancement service couldn't process this image.",
            "Please try a different image.",
            false,
            Severity::Permanent,
        ),

        LuminaError::Unknown(_) => HumanError::new(
            "Enhancement could not be completed.",
            "Please try again.",
            true,
            Severity::Permanent,
        ),

        LuminaError::Cancelled => HumanError::new(
            "The enhancement was cancelled.",
            "Upload an image to start again.",
            false,
            Severity::ActionRequired,
        ),

        // -- Storage --
        LuminaError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError::new(
                    "The file couldn't be found.",
                    "It may have been moved or deleted. Try choosing the file again.",
                    false,
                    Severity::ActionRequired,
                )
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError::new(
                    "The app doesn't have permission to read that file.",
                    "Check the file permissions, or try copying the file to a different location first.",
                    false,
                    Severity::ActionRequired,
                )
            } else {
                HumanError::new(
                    "There was a problem reading or writing a file.",
                    "Try again. If this keeps happening, your device's storage may be full.",
                    true,
                    Severity::Transient,
                )
            }
        }

        LuminaError::Serialization(_) => HumanError::new(
            "The app had an internal data problem.",
            "Try again. If this keeps happening, please report it.",
            true,
            Severity::Transient,
        ),
    }
}

/// File size in the units people expect: whole MB where exact, otherwise
/// one decimal, and KB below a megabyte.
fn describe_size(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes < MB {
        format!("{} KB", bytes.div_ceil(1024))
    } else if bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
