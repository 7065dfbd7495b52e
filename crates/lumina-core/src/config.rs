// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::DeviceClass;
use crate::types::EnhancementStyle;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the enhancement backend (`/api/enhance` is appended).
    pub endpoint: String,
    /// Wall-clock limit for one enhancement attempt.
    pub request_timeout_secs: u64,
    /// Total attempts per enhancement, including the first.
    pub max_attempts: u32,
    /// Wait before the first retry; later waits grow by 1.5x.
    pub initial_retry_delay_ms: u64,
    /// Absolute pixel ceiling applied before any device-specific downscale.
    pub upload_pixel_ceiling: u64,
    /// Largest file accepted at intake.
    pub max_file_bytes: u64,
    /// Largest serialized request body sent to the backend.
    pub max_request_bytes: usize,
    /// Settle window before the slow detail pass runs.
    pub slow_pass_settle_ms: u64,
    /// Timeout for the health check.
    pub health_timeout_secs: u64,
    /// Style used when none is given.
    pub default_style: EnhancementStyle,
    /// Force a device class instead of detecting one.
    pub device: Option<DeviceClass>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001".into(),
            request_timeout_secs: 180,
            max_attempts: 5,
            initial_retry_delay_ms: 3000,
            upload_pixel_ceiling: 4_000_000,
            max_file_bytes: 15 * 1024 * 1024,
            max_request_bytes: 25 * 1024 * 1024,
            slow_pass_settle_ms: 300,
            health_timeout_secs: 5,
            default_style: EnhancementStyle::Balanced,
            device: None,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn initial_retry_delay(&self) -> Duration {
        Duration::from_millis(self.initial_retry_delay_ms)
    }

    pub fn slow_pass_settle(&self) -> Duration {
        Duration::from_millis(self.slow_pass_settle_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}
