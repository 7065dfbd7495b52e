// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async client for the remote enhancement service.
//
// One `enhance` call is one logical operation: up to `max_attempts` POSTs to
// `/api/enhance`, each bounded by its own timeout, with backoff between
// transient failures. Progress is reported through a `ProgressSink` and never
// moves backwards within the operation.

use std::time::Duration;

use lumina_core::error::{LuminaError, Result};
use lumina_core::{
    AppConfig, DeviceProfile, EncodedImage, EnhancementStyle, ImagePayload, ProgressSink,
    ProgressStage, ProgressState, ProgressTracker,
};
use lumina_imaging::AdaptiveResizer;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::protocol::{self, ENHANCE_PATH, EnhanceRequest};
use crate::retry::{RetryConfig, RetryDecision, should_retry};

/// Upload-stage percentage shown before `attempt` (1-based).
fn upload_percent(attempt: u32) -> f32 {
    (10 + attempt.saturating_sub(1) * 5).min(30) as f32
}

/// Processing-stage percentage shown while waiting to retry after `attempt`.
fn retry_wait_percent(attempt: u32) -> f32 {
    (15 + attempt * 10).min(50) as f32
}

/// Pairs a sink with the tracker that keeps its percentages monotonic.
struct Reporter<'a> {
    sink: &'a dyn ProgressSink,
    tracker: ProgressTracker,
}

impl Reporter<'_> {
    fn report(&mut self, stage: ProgressStage, percent: f32) {
        let state = self.tracker.advance(ProgressState::new(stage, percent));
        self.sink.report(state);
    }
}

/// Client bound to one enhancement endpoint and one device profile.
#[derive(Debug, Clone)]
pub struct EnhanceClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) health_timeout: Duration,
    retry: RetryConfig,
    attempt_timeout: Duration,
    max_request_bytes: usize,
    resizer: AdaptiveResizer,
    profile: DeviceProfile,
}

impl EnhanceClient {
    /// Build a client from application settings.
    pub fn new(config: &AppConfig, profile: DeviceProfile) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lumina/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LuminaError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            health_timeout: config.health_timeout(),
            retry: RetryConfig::from_config(config),
            attempt_timeout: config.request_timeout(),
            max_request_bytes: config.max_request_bytes,
            resizer: AdaptiveResizer::from_config(config),
            profile,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the per-attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Enhance `payload` with `style`.
    ///
    /// Returns the result after the display resize, or the last error once
    /// retries are exhausted. Cancelling `cancel` aborts the in-flight request
    /// or backoff wait and yields [`LuminaError::Cancelled`].
    #[instrument(skip_all, fields(style = %style, width = payload.width, height = payload.height, base64_len = payload.encoded_len()))]
    pub async fn enhance(
        &self,
        payload: &ImagePayload,
        style: EnhancementStyle,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<EncodedImage> {
        let body = serde_json::to_vec(&EnhanceRequest {
            image: payload,
            style,
        })?;
        if body.len() > self.max_request_bytes {
            warn!(size = body.len(), limit = self.max_request_bytes, "request body over limit");
            return Err(LuminaError::PayloadTooLarge {
                size: body.len(),
                limit: self.max_request_bytes,
            });
        }

        let url = format!("{}{}", self.base_url, ENHANCE_PATH);
        let mut reporter = Reporter {
            sink: progress,
            tracker: ProgressTracker::new(),
        };
        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts {
            if cancel.is_cancelled() {
                return Err(LuminaError::Cancelled);
            }
            let base = upload_percent(attempt);
            reporter.report(ProgressStage::Uploading, base);
            debug!(attempt, bytes = body.len(), "sending enhancement request");

            let exchange = async {
                let response = self
                    .http
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone())
                    .send()
                    .await
                    .map_err(|e| protocol::transport_error(&e))?;
                reporter.report(ProgressStage::Processing, base + 30.0);
                let status = response.status().as_u16();
                reporter.report(ProgressStage::Downloading, base + 35.0);
                let text = response
                    .text()
                    .await
                    .map_err(|e| protocol::transport_error(&e))?;
                protocol::interpret(status, &text)
            };

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LuminaError::Cancelled),
                timed = tokio::time::timeout(self.attempt_timeout, exchange) => match timed {
                    Ok(result) => result,
                    Err(_) => Err(LuminaError::NetworkTimeout(format!(
                        "no response within {}s",
                        self.attempt_timeout.as_secs_f32()
                    ))),
                },
            };

            let err = match outcome {
                Ok(encoded) => {
                    info!(attempt, bytes = encoded.len(), mime = %encoded.mime_type, "enhancement succeeded");
                    reporter.report(ProgressStage::Finalizing, 85.0);
                    let displayable = self.finalize(encoded).await;
                    reporter.report(ProgressStage::Finalizing, 100.0);
                    return Ok(displayable);
                }
                Err(err) => err,
            };

            match should_retry(&err, attempt, &self.retry) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(attempt, error = %err, delay_ms = delay.as_millis() as u64, "attempt failed, backing off");
                    reporter.report(ProgressStage::Processing, retry_wait_percent(attempt));
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(LuminaError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    last_error = Some(err);
                }
                RetryDecision::GiveUp(class) => {
                    warn!(attempt, ?class, error = %err, "enhancement failed");
                    return Err(err);
                }
                RetryDecision::Exhausted => {
                    warn!(attempt, error = %err, "enhancement failed after all attempts");
                    return Err(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LuminaError::Unknown("no attempts were made".into())))
    }

    /// Run the display resize off the async executor.
    async fn finalize(&self, encoded: EncodedImage) -> EncodedImage {
        let resizer = self.resizer;
        let profile = self.profile;
        let fallback = encoded.clone();
        match tokio::task::spawn_blocking(move || resizer.prepare_for_display(encoded, &profile))
            .await
        {
            Ok(displayable) => displayable,
            Err(err) => {
                warn!(error = %err, "display resize task failed, using result as-is");
                fallback
            }
        }
    }
}
