// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry engine with exponential backoff for enhancement requests.
//
// Classifies errors into Transient (auto-retry), UserAction (pick another
// file) and Permanent (give up). Only transient errors trigger retries.

use std::time::Duration;

use lumina_core::AppConfig;
use lumina_core::error::LuminaError;
use lumina_core::types::ErrorClass;
use tracing::{debug, info, warn};

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub initial_delay: Duration,
    /// Growth factor applied to each subsequent wait.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(3000),
            multiplier: 1.5,
        }
    }
}

impl RetryConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: config.initial_retry_delay(),
            ..Self::default()
        }
    }
}

/// Result of evaluating whether to retry.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after this delay.
    RetryAfter(Duration),
    /// Do not retry; the error is permanent or needs the user.
    GiveUp(ErrorClass),
    /// Maximum attempts used up.
    Exhausted,
}

/// Classify a `LuminaError` into an `ErrorClass` for retry decisions.
pub fn classify_error(err: &LuminaError) -> ErrorClass {
    match err {
        // Transient: timeouts, transport, busy or rate-limited service
        LuminaError::NetworkTimeout(_)
        | LuminaError::Network(_)
        | LuminaError::ServiceUnavailable(_)
        | LuminaError::QuotaExceeded(_)
        | LuminaError::InvalidResponse(_) => ErrorClass::Transient,

        // User action needed: a different or smaller image
        LuminaError::EmptyFile
        | LuminaError::FileTooLarge { .. }
        | LuminaError::UnsupportedFormat(_)
        | LuminaError::PayloadTooLarge { .. }
        | LuminaError::Decode(_) => ErrorClass::UserAction,

        // Permanent
        LuminaError::AuthConfiguration(_)
        | LuminaError::Rejected { .. }
        | LuminaError::Encode(_)
        | LuminaError::Unknown(_)
        | LuminaError::Cancelled
        | LuminaError::Serialization(_) => ErrorClass::Permanent,

        LuminaError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::Interrupted => ErrorClass::Transient,
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ErrorClass::UserAction
            }
            _ => ErrorClass::Permanent,
        },
    }
}

/// Decide whether to retry after `attempt` (1-based) failed with `err`.
pub fn should_retry(err: &LuminaError, attempt: u32, config: &RetryConfig) -> RetryDecision {
    match classify_error(err) {
        ErrorClass::Permanent => {
            info!("permanent error, not retrying");
            RetryDecision::GiveUp(ErrorClass::Permanent)
        }
        ErrorClass::UserAction => {
            info!("user action required, not retrying");
            RetryDecision::GiveUp(ErrorClass::UserAction)
        }
        ErrorClass::Transient => {
            if attempt >= config.max_attempts {
                warn!(attempt, max = config.max_attempts, "retry limit exhausted");
                RetryDecision::Exhausted
            } else {
                let delay = compute_delay(attempt, config);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "scheduling retry");
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

/// Wait after failed attempt `attempt` (1-based):
/// `initial_delay * multiplier^(attempt - 1)`.
pub fn compute_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let exponent = attempt.saturating_sub(1).min(64) as i32;
    config.initial_delay.mul_f64(config.multiplier.powi(exponent))
}
