// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session state — the snapshot the coordinator publishes after every
// transition. Front ends only ever read snapshots.

use lumina_core::human_errors::HumanError;
use lumina_core::{EncodedImage, OperationId, ProgressState};

/// Lifecycle of the current enhancement operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No operation, or the last one was reset.
    Idle,
    /// Validating, uploading or waiting on the service.
    Working,
    /// Result available.
    Complete,
    /// Operation failed; see `error`.
    Failed,
}

/// Everything a front end needs to draw the session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Operation this snapshot belongs to.
    pub operation: Option<OperationId>,
    pub phase: SessionPhase,
    /// Overall progress (0-100), never decreasing within one operation.
    pub progress: ProgressState,
    /// Displayable result once `phase` is `Complete`.
    pub result: Option<EncodedImage>,
    pub error: Option<HumanError>,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            operation: None,
            phase: SessionPhase::Idle,
            progress: ProgressState::default(),
            result: None,
            error: None,
        }
    }

    /// Fresh snapshot for a newly started operation.
    pub fn started(operation: OperationId) -> Self {
        Self {
            operation: Some(operation),
            phase: SessionPhase::Working,
            ..Self::idle()
        }
    }

    /// Status line for the progress bar.
    pub fn status_line(&self) -> String {
        match self.phase {
            SessionPhase::Idle => "Ready".into(),
            SessionPhase::Working => self.progress.stage.label().into(),
            SessionPhase::Complete => "Enhancement complete".into(),
            SessionPhase::Failed => self
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Enhancement failed".into()),
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
