// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lumina-imaging: raster I/O, file intake, adaptive resizing and the
// transform & adjustment engine.
//
// Provides the `RasterImage` buffer, the upload/display resizer, the
// geometry + fast/slow tonal pipeline (`engine::render`), a debounced live
// preview, and lossless export.

pub mod engine;
pub mod export;
pub mod intake;
pub mod preview;
pub mod raster;
pub mod resize;
pub mod scheduler;

// Re-export the primary types so callers can use `lumina_imaging::RasterImage` etc.
pub use engine::render;
pub use export::{export_filename, export_png};
pub use intake::SourceFile;
pub use preview::{Frame, LivePreview};
pub use raster::RasterImage;
pub use resize::AdaptiveResizer;
pub use scheduler::Debouncer;
