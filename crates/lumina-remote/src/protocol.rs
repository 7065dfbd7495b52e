// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire contract of the enhancement service: request/response bodies, the
// health report, and the mapping from HTTP outcomes to `LuminaError`.

use chrono::{DateTime, Utc};
use lumina_core::error::{LuminaError, Result};
use lumina_core::{EncodedImage, EnhancementStyle, ImagePayload};
use serde::{Deserialize, Serialize};

pub const ENHANCE_PATH: &str = "/api/enhance";
pub const HEALTH_PATH: &str = "/api/health";

/// Prefix some backends put on messages of failures they want retried.
/// Never shown to users.
pub const RETRY_MARKER: &str = "RETRY:";

// -- Bodies -------------------------------------------------------------------

/// `POST /api/enhance` body.
#[derive(Debug, Serialize)]
pub struct EnhanceRequest<'a> {
    pub image: &'a ImagePayload,
    pub style: EnhancementStyle,
}

/// `POST /api/enhance` response, success or failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Connected,
    Unreachable,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub has_api_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub api_status: ApiStatus,
    pub timestamp: DateTime<Utc>,
}

// -- Outcome mapping ----------------------------------------------------------

/// Remove a leading retry marker (and surrounding whitespace) from a message.
pub fn strip_retry_marker(message: &str) -> &str {
    let trimmed = message.trim();
    trimmed
        .strip_prefix(RETRY_MARKER)
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

/// Interpret one HTTP exchange.
pub fn interpret(status: u16, body: &str) -> Result<EncodedImage> {
    if body.trim().is_empty() {
        return Err(LuminaError::InvalidResponse(format!(
            "empty response body (HTTP {status})"
        )));
    }

    let parsed = serde_json::from_str::<EnhanceResponse>(body);
    if (200..300).contains(&status) {
        let response = parsed.map_err(|err| {
            LuminaError::InvalidResponse(format!("unparsable response body: {err}"))
        })?;
        return match response.enhanced_image {
            Some(url) => EncodedImage::from_data_url(&url),
            None => Err(LuminaError::InvalidResponse(
                response
                    .error
                    .map(|e| strip_retry_marker(&e).to_string())
                    .unwrap_or_else(|| "response carries no enhanced image".into()),
            )),
        };
    }

    let response = match parsed {
        Ok(response) => response,
        Err(_) if status == 429 || status >= 500 => EnhanceResponse::default(),
        Err(err) => {
            return Err(LuminaError::InvalidResponse(format!(
                "unparsable error body (HTTP {status}): {err}"
            )));
        }
    };
    let message = response
        .error
        .as_deref()
        .map(strip_retry_marker)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"));
    Err(failure_for_status(status, message, response.retryable.unwrap_or(false)))
}

fn failure_for_status(status: u16, message: String, flagged_retryable: bool) -> LuminaError {
    match status {
        429 => LuminaError::QuotaExceeded(message),
        504 => LuminaError::NetworkTimeout(message),
        500..=599 => LuminaError::ServiceUnavailable(message),
        401 | 403 => LuminaError::AuthConfiguration(message),
        _ if flagged_retryable => LuminaError::ServiceUnavailable(message),
        400 => LuminaError::Decode(message),
        _ => LuminaError::Rejected { status, message },
    }
}

/// Map a transport-level failure.
pub fn transport_error(err: &reqwest::Error) -> LuminaError {
    if err.is_timeout() {
        LuminaError::NetworkTimeout(err.to_string())
    } else {
        LuminaError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_the_wire_shape() {
        let image = ImagePayload {
            base64: "AAAA".into(),
            mime_type: "image/png".into(),
            width: 3,
            height: 2,
        };
        let body = serde_json::to_value(EnhanceRequest {
            image: &image,
            style: EnhancementStyle::Restoration,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "image": { "base64": "AAAA", "mimeType": "image/png", "width": 3, "height": 2 },
                "style": "restoration"
            })
        );
    }

    #[test]
    fn marker_is_stripped() {
        assert_eq!(strip_retry_marker("RETRY: model overloaded"), "model overloaded");
        assert_eq!(strip_retry_marker("  plain  "), "plain");
    }

    #[test]
    fn success_decodes_the_data_url() {
        let body = r#"{"enhancedImage":"data:image/jpeg;base64,/9j/4A=="}"#;
        let image = interpret(200, body).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn malformed_success_is_an_invalid_response() {
        assert!(matches!(interpret(200, ""), Err(LuminaError::InvalidResponse(_))));
        assert!(matches!(interpret(200, "<html>"), Err(LuminaError::InvalidResponse(_))));
        assert!(matches!(interpret(200, "{}"), Err(LuminaError::InvalidResponse(_))));
    }

    #[test]
    fn statuses_map_to_the_taxonomy() {
        let body = r#"{"error":"RETRY: busy"}"#;
        assert!(matches!(interpret(429, body), Err(LuminaError::QuotaExceeded(m)) if m == "busy"));
        assert!(matches!(interpret(502, body), Err(LuminaError::ServiceUnavailable(_))));
        assert!(matches!(interpret(504, body), Err(LuminaError::NetworkTimeout(_))));
        assert!(matches!(interpret(401, body), Err(LuminaError::AuthConfiguration(_))));
        assert!(matches!(interpret(400, body), Err(LuminaError::Decode(_))));
        assert!(matches!(
            interpret(413, r#"{"error":"too big"}"#),
            Err(LuminaError::Rejected { status: 413, .. })
        ));
        assert!(matches!(
            interpret(409, r#"{"error":"try later","retryable":true}"#),
            Err(LuminaError::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn unparsable_failure_bodies_are_invalid_responses() {
        assert!(matches!(interpret(404, "<html>nope</html>"), Err(LuminaError::InvalidResponse(_))));
        assert!(matches!(interpret(503, "<html>down</html>"), Err(LuminaError::ServiceUnavailable(m)) if m == "HTTP 503"));
    }

    #[test]
    fn health_report_parses() {
        let body = r#"{"status":"degraded","hasApiKey":true,"provider":"replicate",
            "apiStatus":"unreachable","timestamp":"2026-10-19T08:30:00.000Z"}"#;
        let report: HealthReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.api_status, ApiStatus::Unreachable);
        assert!(report.has_api_key);
    }
}
