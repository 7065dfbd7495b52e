// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export of edited renders: lossless PNG plus a generated download name.

use chrono::{DateTime, Utc};
use lumina_core::error::Result;
use lumina_core::{EncodedImage, EnhancementStyle, ImageMime};
use tracing::info;

use crate::raster::RasterImage;

/// Encode a render losslessly at maximum compression.
pub fn export_png(image: &RasterImage) -> Result<EncodedImage> {
    let bytes = image.to_png_bytes_best()?;
    info!(
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "Render exported"
    );
    Ok(EncodedImage::new(ImageMime::Png.mime_type(), bytes))
}

/// `lumina-enhanced-<style>-<unix-millis>.<ext>`
pub fn export_filename(style: EnhancementStyle, at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "lumina-enhanced-{}-{}.{}",
        style.as_str(),
        at.timestamp_millis(),
        extension.trim_start_matches('.')
    )
}
