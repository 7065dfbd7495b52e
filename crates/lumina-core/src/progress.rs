// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Staged progress reporting for enhancement operations.

use serde::{Deserialize, Serialize};

/// Stage of an enhancement operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Reading,
    Uploading,
    Processing,
    Downloading,
    Finalizing,
}

impl ProgressStage {
    /// Status line shown next to the progress bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reading => "Preparing your image...",
            Self::Uploading => "Connecting to AI...",
            Self::Processing => "AI enhancement in progress...",
            Self::Downloading => "Downloading result...",
            Self::Finalizing => "Finalizing enhanced image...",
        }
    }
}

/// A progress snapshot: stage plus percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub stage: ProgressStage,
    pub percent: f32,
}

impl ProgressState {
    pub fn new(stage: ProgressStage, percent: f32) -> Self {
        Self {
            stage,
            percent: if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) },
        }
    }

    /// Map this progress into the sub-range `[start, start + span]` of an
    /// outer progress bar.
    pub fn remap(self, start: f32, span: f32) -> Self {
        Self::new(self.stage, start + self.percent * span / 100.0)
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new(ProgressStage::Reading, 0.0)
    }
}

/// Receiver of progress updates.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: ProgressState);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressState) + Send + Sync,
{
    fn report(&self, progress: ProgressState) {
        self(progress)
    }
}

/// Keeps the percentage of one logical operation non-decreasing.
///
/// Retries report lower raw percentages than earlier attempts reached; the
/// tracker holds the bar where it was while letting the stage label change.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    high_water: Option<f32>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp `progress` so it never falls below what was already reported.
    pub fn advance(&mut self, progress: ProgressState) -> ProgressState {
        let percent = match self.high_water {
            Some(previous) => progress.percent.max(previous),
            None => progress.percent,
        };
        self.high_water = Some(percent);
        ProgressState::new(progress.stage, percent)
    }

    /// Forget the previous operation.
    pub fn reset(&mut self) {
        self.high_water = None;
    }

    pub fn current(&self) -> Option<f32> {
        self.high_water
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_never_moves_backwards() {
        let mut tracker = ProgressTracker::new();
        let a = tracker.advance(ProgressState::new(ProgressStage::Processing, 40.0));
        let b = tracker.advance(ProgressState::new(ProgressStage::Uploading, 15.0));
        assert_eq!(a.percent, 40.0);
        assert_eq!(b.percent, 40.0);
        assert_eq!(b.stage, ProgressStage::Uploading);

        tracker.reset();
        let c = tracker.advance(ProgressState::new(ProgressStage::Reading, 5.0));
        assert_eq!(c.percent, 5.0);
    }

    #[test]
    fn remap_places_inner_progress_in_outer_band() {
        let inner = ProgressState::new(ProgressStage::Finalizing, 100.0);
        assert_eq!(inner.remap(25.0, 70.0).percent, 95.0);
        let start = ProgressState::new(ProgressStage::Uploading, 0.0);
        assert_eq!(start.remap(25.0, 70.0).percent, 25.0);
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(ProgressState::new(ProgressStage::Reading, 140.0).percent, 100.0);
        assert_eq!(ProgressState::new(ProgressStage::Reading, -3.0).percent, 0.0);
    }
}
