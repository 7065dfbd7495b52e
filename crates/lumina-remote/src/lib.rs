// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lumina Remote — resilient client for the remote enhancement service.
// Sends prepared payloads to `/api/enhance`, retries transient failures with
// backoff, reports staged progress, and probes `/api/health`.

pub mod client;
pub mod health;
pub mod protocol;
pub mod retry;

pub use client::EnhanceClient;
pub use health::ServiceHealth;
pub use protocol::{EnhanceResponse, HealthReport};
pub use retry::RetryConfig;
