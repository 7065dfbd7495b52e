// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live editing preview.
//
// Every adjustment publishes a frame straight away. When detail sliders are
// set that frame is a fast-pass preview, and the full render follows once the
// settle window passes quietly. Frames carry a generation number; a full
// render that finishes after a newer adjustment is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lumina_core::error::{LuminaError, Result};
use lumina_core::{AdjustmentState, EncodedImage};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::engine::render;
use crate::export::export_png;
use crate::raster::RasterImage;
use crate::scheduler::Debouncer;

/// One published render.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: Arc<RasterImage>,
    pub state: AdjustmentState,
    pub generation: u64,
    /// `false` while a deferred detail pass is still outstanding.
    pub complete: bool,
}

/// Interactive editor over one source image.
#[derive(Debug)]
pub struct LivePreview {
    source: Arc<RasterImage>,
    state: AdjustmentState,
    frames: Arc<watch::Sender<Frame>>,
    generation: Arc<AtomicU64>,
    slow_passes: Arc<AtomicU64>,
    debouncer: Debouncer,
}

impl LivePreview {
    /// Start an editing session. Must be called inside a Tokio runtime.
    pub fn new(source: RasterImage, settle: Duration) -> Self {
        let source = Arc::new(source);
        let state = AdjustmentState::default();
        let first = Frame {
            image: Arc::new(render(&source, &state, true)),
            state,
            generation: 0,
            complete: true,
        };
        let (frames, _) = watch::channel(first);
        Self {
            source,
            state,
            frames: Arc::new(frames),
            generation: Arc::new(AtomicU64::new(0)),
            slow_passes: Arc::new(AtomicU64::new(0)),
            debouncer: Debouncer::new(settle),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Frame> {
        self.frames.subscribe()
    }

    pub fn source(&self) -> &RasterImage {
        &self.source
    }

    pub fn state(&self) -> AdjustmentState {
        self.state
    }

    /// The most recently published frame.
    pub fn current(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Replace the adjustment state and publish the immediate frame.
    #[instrument(skip(self, state), fields(generation = tracing::field::Empty))]
    pub fn apply(&mut self, state: AdjustmentState) -> Frame {
        let state = state.normalized();
        self.state = state;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::Span::current().record("generation", generation);

        if !state.has_detail_adjustments() {
            self.debouncer.cancel();
            let frame = Frame {
                image: Arc::new(render(&self.source, &state, true)),
                state,
                generation,
                complete: true,
            };
            self.frames.send_replace(frame.clone());
            return frame;
        }

        let frame = Frame {
            image: Arc::new(render(&self.source, &state, false)),
            state,
            generation,
            complete: false,
        };
        self.frames.send_replace(frame.clone());

        let source = Arc::clone(&self.source);
        let frames = Arc::clone(&self.frames);
        let latest = Arc::clone(&self.generation);
        let slow_passes = Arc::clone(&self.slow_passes);
        self.debouncer.schedule(async move {
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }
            let rendered =
                tokio::task::spawn_blocking(move || render(&source, &state, true)).await;
            let image = match rendered {
                Ok(image) => Arc::new(image),
                Err(err) => {
                    warn!(generation, error = %err, "detail render task failed");
                    return;
                }
            };
            slow_passes.fetch_add(1, Ordering::SeqCst);

            let published = frames.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation || current.generation != generation
                {
                    return false;
                }
                *current = Frame {
                    image,
                    state,
                    generation,
                    complete: true,
                };
                true
            });
            if !published {
                debug!(generation, "discarding stale detail render");
            }
        });
        frame
    }

    /// Whether a deferred detail pass is still outstanding.
    pub fn is_settling(&self) -> bool {
        !self.frames.borrow().complete
    }

    /// Wait for the complete frame of the latest adjustment.
    pub async fn settled(&self) -> Result<Frame> {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut rx = self.frames.subscribe();
        let frame = rx
            .wait_for(|frame| frame.generation == generation && frame.complete)
            .await
            .map_err(|_| LuminaError::Cancelled)?;
        Ok(frame.clone())
    }

    /// Number of detail renders computed so far.
    pub fn slow_pass_count(&self) -> u64 {
        self.slow_passes.load(Ordering::SeqCst)
    }

    /// Full-quality render of the current state, encoded losslessly.
    pub fn export(&self) -> Result<EncodedImage> {
        export_png(&render(&self.source, &self.state, true))
    }
}
