// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lumina — Core types and error definitions shared across all crates.

pub mod adjustment;
pub mod config;
pub mod device;
pub mod error;
pub mod human_errors;
pub mod progress;
pub mod types;

pub use adjustment::{AdjustmentState, AspectRatio, Slider};
pub use config::AppConfig;
pub use device::{DeviceClass, DeviceProfile, DeviceSignals};
pub use error::LuminaError;
pub use progress::{ProgressSink, ProgressStage, ProgressState, ProgressTracker};
pub use types::*;
