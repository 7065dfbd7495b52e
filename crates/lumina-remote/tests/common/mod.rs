// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mock enhancement backend for client tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use lumina_core::{AppConfig, DeviceProfile, EncodedImage, ProgressState};
use lumina_imaging::RasterImage;
use lumina_remote::{EnhanceClient, RetryConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wrapper around wiremock MockServer speaking the enhancement API.
pub struct MockEnhanceService {
    pub server: MockServer,
}

impl MockEnhanceService {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Answer every enhance request with `image`.
    pub async fn mock_success(&self, image: &EncodedImage) {
        Mock::given(method("POST"))
            .and(path("/api/enhance"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "enhancedImage": image.to_data_url() })),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer the next `times` enhance requests with a failure.
    pub async fn mock_failure(&self, status: u16, body: serde_json::Value, times: u64) {
        Mock::given(method("POST"))
            .and(path("/api/enhance"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .up_to_n_times(times)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer every enhance request after `delay`.
    pub async fn mock_slow(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/api/enhance"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "enhancedImage": "data:image/png;base64,AA==" }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_health(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every enhance request received so far.
    pub async fn enhance_requests(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path() == "/api/enhance")
            .filter_map(|req| serde_json::from_slice(&req.body).ok())
            .collect()
    }
}

/// Client with millisecond backoff so retry tests run quickly.
pub fn fast_client(base_url: &str, profile: DeviceProfile) -> EnhanceClient {
    let config = AppConfig {
        endpoint: base_url.to_string(),
        ..Default::default()
    };
    EnhanceClient::new(&config, profile)
        .expect("client builds")
        .with_retry(RetryConfig {
            initial_delay: Duration::from_millis(5),
            ..Default::default()
        })
}

/// Solid-colour PNG.
pub fn png(width: u32, height: u32) -> EncodedImage {
    let raster = RasterImage::from_buffer(RgbaImage::from_pixel(width, height, Rgba([30, 140, 200, 255])));
    EncodedImage::new("image/png", raster.to_png_bytes().expect("png encodes"))
}

/// Progress sink that records every update.
#[derive(Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Vec<ProgressState>>>);

impl Recorder {
    pub fn sink(&self) -> impl Fn(ProgressState) + Send + Sync + 'static {
        let events = Arc::clone(&self.0);
        move |state| events.lock().expect("recorder lock").push(state)
    }

    pub fn events(&self) -> Vec<ProgressState> {
        self.0.lock().expect("recorder lock").clone()
    }

    pub fn assert_monotonic(&self) {
        let events = self.events();
        for pair in events.windows(2) {
            assert!(
                pair[1].percent >= pair[0].percent,
                "progress went backwards: {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}
