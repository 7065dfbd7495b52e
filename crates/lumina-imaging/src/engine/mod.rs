// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transform & adjustment engine.
//
// Pipeline order is fixed: geometry, then the fast tonal pass, then (for full
// renders with detail sliders set) the slow detail pass.

pub mod detail;
pub mod geometry;
pub mod tonal;

use lumina_core::AdjustmentState;
use tracing::{debug, instrument};

use crate::raster::RasterImage;

pub use detail::DetailPass;
pub use geometry::{apply_geometry, canvas_dimensions, crop_dimensions, rotated_dimensions};
pub use tonal::FastPass;

/// Render `image` under `state` into a new raster.
///
/// With `full_process == false` only the fast pass runs; this is the preview
/// shown while detail sliders are still moving.
#[instrument(skip(image, state), fields(width = image.width(), height = image.height()))]
pub fn render(image: &RasterImage, state: &AdjustmentState, full_process: bool) -> RasterImage {
    let state = state.normalized();
    let mut out = apply_geometry(image, &state);
    let (width, height) = out.dimensions();

    FastPass::from_state(&state).apply(out.as_raw_mut());

    let detail = DetailPass::from_state(&state);
    if full_process && !detail.is_noop() {
        detail.apply(out.as_raw_mut(), width, height);
    }

    debug!(
        out_w = width,
        out_h = height,
        detail = full_process && !detail.is_noop(),
        "Render complete"
    );
    out
}
