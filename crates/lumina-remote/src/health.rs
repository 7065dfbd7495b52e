// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service health probe.
//
// A single short-timeout `GET /api/health`. Never retried and never an
// error: an unreachable or confused backend is itself a health verdict.

use tracing::{info, instrument, warn};

use crate::client::EnhanceClient;
use crate::protocol::{ApiStatus, HEALTH_PATH, HealthReport, HealthStatus};

/// Verdict of one health probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceHealth {
    /// Backend is up, has its key and reaches its provider.
    Ready(HealthReport),
    /// Backend answered but reported a problem.
    Degraded(HealthReport),
    /// Backend could not be reached or answered nonsense.
    Unreachable(String),
}

impl ServiceHealth {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// One-line summary for status displays.
    pub fn summary(&self) -> String {
        match self {
            Self::Ready(report) => format!(
                "ready ({})",
                report.provider.as_deref().unwrap_or("provider unknown")
            ),
            Self::Degraded(report) if !report.has_api_key => {
                "degraded: the service has no API key configured".into()
            }
            Self::Degraded(report) if report.api_status == ApiStatus::Unreachable => {
                "degraded: the AI provider is unreachable".into()
            }
            Self::Degraded(_) => "degraded".into(),
            Self::Unreachable(reason) => format!("unreachable: {reason}"),
        }
    }
}

impl From<HealthReport> for ServiceHealth {
    fn from(report: HealthReport) -> Self {
        let ready = report.status == HealthStatus::Ok
            && report.has_api_key
            && report.api_status == ApiStatus::Connected;
        if ready {
            Self::Ready(report)
        } else {
            Self::Degraded(report)
        }
    }
}

impl EnhanceClient {
    /// Probe the backend's health endpoint.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn health(&self) -> ServiceHealth {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = match self.http.get(&url).timeout(self.health_timeout).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "health probe failed");
                return ServiceHealth::Unreachable(err.to_string());
            }
        };

        let status = response.status();
        let health = match response.json::<HealthReport>().await {
            Ok(report) => ServiceHealth::from(report),
            Err(err) => {
                warn!(%status, error = %err, "health response unreadable");
                ServiceHealth::Unreachable(format!("HTTP {status}: unreadable health report"))
            }
        };
        info!(ready = health.is_ready(), "health probe complete");
        health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(status: HealthStatus, has_api_key: bool, api_status: ApiStatus) -> HealthReport {
        HealthReport {
            status,
            has_api_key,
            provider: Some("replicate".into()),
            api_status,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn all_green_is_ready() {
        let health = ServiceHealth::from(report(HealthStatus::Ok, true, ApiStatus::Connected));
        assert!(health.is_ready());
        assert_eq!(health.summary(), "ready (replicate)");
    }

    #[test]
    fn missing_key_is_degraded_even_when_ok() {
        let health = ServiceHealth::from(report(HealthStatus::Ok, false, ApiStatus::Connected));
        assert!(!health.is_ready());
        assert!(health.summary().contains("no API key"));
    }

    #[test]
    fn unreachable_provider_is_reported() {
        let health =
            ServiceHealth::from(report(HealthStatus::Degraded, true, ApiStatus::Unreachable));
        assert!(health.summary().contains("unreachable"));
    }
}
