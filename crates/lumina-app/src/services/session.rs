// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement session coordinator.
//
// Sequences one user-visible operation: validate, decode, compress for
// upload, call the remote client, finalize. Progress from the client
// (0-100) is mapped into 25-95 of the overall bar. Starting a new operation
// or resetting cancels the previous one; anything a cancelled operation
// produces afterwards is dropped without touching the published snapshot.

use std::sync::{Mutex, PoisonError};

use lumina_core::error::{LuminaError, Result};
use lumina_core::human_errors::humanize_error;
use lumina_core::{
    AppConfig, DeviceProfile, EncodedImage, EnhancementStyle, OperationId, ProgressStage,
    ProgressState,
};
use lumina_imaging::{AdaptiveResizer, RasterImage, SourceFile, intake};
use lumina_remote::EnhanceClient;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::state::{SessionPhase, SessionSnapshot};

/// Share of the overall bar taken by the network phase, and where it starts.
const NETWORK_START: f32 = 25.0;
const NETWORK_SPAN: f32 = 70.0;

/// Coordinator for one user's enhancement operations.
#[derive(Debug)]
pub struct EnhanceSession {
    client: EnhanceClient,
    resizer: AdaptiveResizer,
    profile: DeviceProfile,
    max_file_bytes: u64,
    snapshots: watch::Sender<SessionSnapshot>,
    active: Mutex<Option<(OperationId, CancellationToken)>>,
}

impl EnhanceSession {
    pub fn new(config: &AppConfig, profile: DeviceProfile) -> Result<Self> {
        let client = EnhanceClient::new(config, profile)?;
        Ok(Self::with_client(config, client))
    }

    /// Use a preconfigured client (custom retry policy etc.).
    pub fn with_client(config: &AppConfig, client: EnhanceClient) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::idle());
        Self {
            profile: *client.profile(),
            client,
            resizer: AdaptiveResizer::from_config(config),
            max_file_bytes: config.max_file_bytes,
            snapshots,
            active: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Cancel whatever is running and return to idle.
    pub fn reset(&self) {
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((operation, token)) = previous {
            info!(%operation, "session reset, cancelling operation");
            token.cancel();
        }
        self.snapshots.send_replace(SessionSnapshot::idle());
    }

    /// Run one enhancement of `file`.
    ///
    /// Returns [`LuminaError::Cancelled`] when the operation was reset or
    /// superseded; in that case the published snapshot is left alone.
    #[instrument(skip_all, fields(file = %file.name, style = %style))]
    pub async fn enhance(&self, file: SourceFile, style: EnhancementStyle) -> Result<EncodedImage> {
        let (operation, cancel) = self.begin();
        let outcome = self.run(operation, &cancel, file, style).await;

        if !self.is_current(operation) {
            debug!(%operation, "operation superseded, discarding outcome");
            return Err(LuminaError::Cancelled);
        }

        match &outcome {
            Ok(result) => {
                self.publish(operation, |snap| {
                    snap.phase = SessionPhase::Complete;
                    snap.progress = ProgressState::new(ProgressStage::Finalizing, 100.0);
                    snap.result = Some(result.clone());
                });
                info!(%operation, bytes = result.len(), "enhancement complete");
            }
            Err(LuminaError::Cancelled) => {}
            Err(err) => {
                let human = humanize_error(err);
                if err.is_validation() {
                    info!(%operation, error = %err, "file rejected at intake");
                } else {
                    warn!(%operation, error = %err, "enhancement failed");
                }
                self.publish(operation, |snap| {
                    snap.phase = SessionPhase::Failed;
                    snap.error = Some(human);
                });
            }
        }
        self.finish(operation);
        outcome
    }

    async fn run(
        &self,
        operation: OperationId,
        cancel: &CancellationToken,
        file: SourceFile,
        style: EnhancementStyle,
    ) -> Result<EncodedImage> {
        intake::validate(&file, self.max_file_bytes)?;
        self.advance(operation, ProgressState::new(ProgressStage::Reading, 5.0));

        let decoded = self
            .blocking(cancel, move || RasterImage::decode(&file.bytes))
            .await?;
        self.advance(operation, ProgressState::new(ProgressStage::Reading, 15.0));

        let resizer = self.resizer;
        let profile = self.profile;
        let payload = self
            .blocking(cancel, move || resizer.prepare_for_upload(&decoded, &profile))
            .await?;
        self.advance(operation, ProgressState::new(ProgressStage::Uploading, NETWORK_START));

        let sink = |progress: ProgressState| {
            self.advance(operation, progress.remap(NETWORK_START, NETWORK_SPAN));
        };
        self.client.enhance(&payload, style, &sink, cancel).await
    }

    /// Run CPU-bound work off the executor, abandoning it on cancellation.
    async fn blocking<T, F>(&self, cancel: &CancellationToken, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LuminaError::Cancelled),
            joined = tokio::task::spawn_blocking(work) => joined
                .map_err(|e| LuminaError::Unknown(format!("worker task failed: {e}")))?,
        }
    }

    fn begin(&self) -> (OperationId, CancellationToken) {
        let operation = OperationId::new();
        let cancel = CancellationToken::new();
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((operation, cancel.clone()));
        if let Some((old, token)) = previous {
            info!(%old, "new operation supersedes running one");
            token.cancel();
        }
        self.snapshots.send_replace(SessionSnapshot::started(operation));
        (operation, cancel)
    }

    fn finish(&self, operation: OperationId) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(|(id, _)| *id == operation) {
            *active = None;
        }
    }

    fn is_current(&self, operation: OperationId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|(id, token)| *id == operation && !token.is_cancelled())
    }

    /// Move the bar forward; lower percentages keep the previous value.
    fn advance(&self, operation: OperationId, progress: ProgressState) {
        self.publish(operation, |snap| {
            let percent = progress.percent.max(snap.progress.percent);
            snap.progress = ProgressState::new(progress.stage, percent);
        });
    }

    /// Apply `update` if `operation` still owns the snapshot.
    fn publish(&self, operation: OperationId, update: impl FnOnce(&mut SessionSnapshot)) {
        self.snapshots.send_if_modified(|snap| {
            if snap.operation != Some(operation) || snap.phase != SessionPhase::Working {
                return false;
            }
            update(snap);
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use image::{Rgba, RgbaImage};
    use lumina_remote::RetryConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jpeg_file(width: u32, height: u32) -> SourceFile {
        let raster =
            RasterImage::from_buffer(RgbaImage::from_pixel(width, height, Rgba([160, 110, 70, 255])));
        SourceFile::new("photo.jpg", "image/jpeg", raster.to_jpeg_bytes(90).unwrap())
    }

    fn result_jpeg(width: u32, height: u32) -> EncodedImage {
        let raster =
            RasterImage::from_buffer(RgbaImage::from_pixel(width, height, Rgba([200, 150, 90, 255])));
        EncodedImage::new("image/jpeg", raster.to_jpeg_bytes(90).unwrap())
    }

    async fn mock_success(server: &MockServer, image: &EncodedImage, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/api/enhance"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "enhancedImage": image.to_data_url() }))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }

    fn session(server: &MockServer, profile: DeviceProfile) -> EnhanceSession {
        let config = AppConfig {
            endpoint: server.uri(),
            ..Default::default()
        };
        let client = EnhanceClient::new(&config, profile)
            .unwrap()
            .with_retry(RetryConfig {
                initial_delay: Duration::from_millis(5),
                ..Default::default()
            });
        EnhanceSession::with_client(&config, client)
    }

    #[tokio::test]
    async fn mobile_round_trip_downscales_then_upscales() {
        let server = MockServer::start().await;
        mock_success(&server, &result_jpeg(800, 600), Duration::ZERO).await;
        let session = session(&server, DeviceProfile::mobile());

        let result = session
            .enhance(jpeg_file(3000, 2000), EnhancementStyle::Balanced)
            .await
            .unwrap();

        // The upload was shrunk below both the 4 MP ceiling and the mobile budget.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let (w, h) = (
            body["image"]["width"].as_u64().unwrap(),
            body["image"]["height"].as_u64().unwrap(),
        );
        assert!(w * h <= 1200 * 1200, "{w}x{h}");
        assert!(w < 3000 && h < 2000);
        let uploaded = STANDARD
            .decode(body["image"]["base64"].as_str().unwrap())
            .unwrap();
        assert_eq!(RasterImage::decode(&uploaded).unwrap().dimensions(), (w as u32, h as u32));

        // The small result came back upscaled to the 2048 px mobile target.
        assert_eq!(result.mime_type, "image/jpeg");
        assert_eq!(RasterImage::decode(&result.bytes).unwrap().dimensions(), (2048, 1536));

        let snap = session.snapshot();
        assert_eq!(snap.phase, SessionPhase::Complete);
        assert_eq!(snap.progress.percent, 100.0);
        assert_eq!(snap.result.as_ref(), Some(&result));
    }

    #[tokio::test]
    async fn invalid_files_fail_before_any_request() {
        let server = MockServer::start().await;
        let session = session(&server, DeviceProfile::desktop());

        let err = session
            .enhance(SourceFile::new("empty.png", "image/png", Vec::new()), EnhancementStyle::Creative)
            .await
            .unwrap_err();

        assert!(matches!(err, LuminaError::EmptyFile));
        assert!(server.received_requests().await.unwrap().is_empty());
        let snap = session.snapshot();
        assert_eq!(snap.phase, SessionPhase::Failed);
        assert_eq!(snap.error.unwrap().message, "The selected file is empty.");
    }

    #[tokio::test]
    async fn progress_never_moves_backwards() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/enhance"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({ "error": "busy" })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        mock_success(&server, &result_jpeg(2048, 16), Duration::ZERO).await;
        let session = Arc::new(session(&server, DeviceProfile::mobile()));

        let mut rx = session.subscribe();
        let watcher = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let snap = rx.borrow_and_update().clone();
                seen.push(snap.progress.percent);
                if snap.phase != SessionPhase::Working {
                    break;
                }
            }
            seen
        });

        session
            .enhance(jpeg_file(64, 48), EnhancementStyle::Balanced)
            .await
            .unwrap();
        let seen = watcher.await.unwrap();
        assert!(seen.windows(2).all(|pair| pair[1] >= pair[0]), "{seen:?}");
        assert_eq!(seen.last(), Some(&100.0));
    }

    #[tokio::test]
    async fn reset_discards_a_late_result() {
        let server = MockServer::start().await;
        mock_success(&server, &result_jpeg(2048, 16), Duration::from_millis(500)).await;
        let session = Arc::new(session(&server, DeviceProfile::mobile()));

        let running = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .enhance(jpeg_file(64, 48), EnhancementStyle::Balanced)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(150)).await;
        session.reset();

        let outcome = running.await.unwrap();
        assert!(matches!(outcome, Err(LuminaError::Cancelled)));
        let snap = session.snapshot();
        assert_eq!(snap.phase, SessionPhase::Idle);
        assert!(snap.result.is_none());
    }

    #[tokio::test]
    async fn newer_operation_wins() {
        let server = MockServer::start().await;
        mock_success(&server, &result_jpeg(2048, 16), Duration::from_millis(300)).await;
        let session = Arc::new(session(&server, DeviceProfile::mobile()));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .enhance(jpeg_file(64, 48), EnhancementStyle::Balanced)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = session
            .enhance(jpeg_file(32, 24), EnhancementStyle::Creative)
            .await;

        assert!(matches!(first.await.unwrap(), Err(LuminaError::Cancelled)));
        assert!(second.is_ok());
        assert_eq!(session.snapshot().phase, SessionPhase::Complete);
    }
}
