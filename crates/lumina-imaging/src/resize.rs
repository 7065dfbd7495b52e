// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive resizer/compressor.
//
// Upload path: shrink to the absolute pixel ceiling, then to the device's
// upload budget, and encode losslessly as PNG.
// Display path: upscale a returned result towards the device's target long
// edge. The display path never fails; any problem passes the original bytes
// through unchanged.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use lumina_core::error::Result;
use lumina_core::{AppConfig, DeviceProfile, EncodedImage, ImageMime, ImagePayload};
use tracing::{debug, info, instrument, warn};

use crate::raster::RasterImage;

/// Dimensions after shrinking `width` x `height` to at most `budget` pixels,
/// or `None` when already within budget. Aspect ratio is preserved.
pub fn fit_pixel_budget(width: u32, height: u32, budget: u64) -> Option<(u32, u32)> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels <= budget || pixels == 0 {
        return None;
    }
    let scale = (budget as f64 / pixels as f64).sqrt();
    let w = ((f64::from(width) * scale).floor() as u32).max(1);
    let h = ((f64::from(height) * scale).floor() as u32).max(1);
    Some((w, h))
}

/// Upscale target for a result of `width` x `height` on `profile`, or `None`
/// when the result should be left as it is.
pub fn display_target(width: u32, height: u32, profile: &DeviceProfile) -> Option<(u32, u32)> {
    let pixels = u64::from(width) * u64::from(height);
    let long_edge = width.max(height);
    if pixels == 0 || pixels > profile.max_safe_pixel_count || long_edge >= profile.target_long_edge
    {
        return None;
    }

    let scale = f64::from(profile.target_long_edge) / f64::from(long_edge);
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    if u64::from(w) * u64::from(h) > profile.max_safe_pixel_count {
        return None;
    }
    Some((w, h))
}

/// Resizes images on their way to and from the enhancement service.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveResizer {
    /// Device-independent ceiling applied before anything else.
    pub upload_pixel_ceiling: u64,
}

impl AdaptiveResizer {
    pub fn new(upload_pixel_ceiling: u64) -> Self {
        Self {
            upload_pixel_ceiling,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.upload_pixel_ceiling)
    }

    /// Downscale `image` for transmission and encode it as PNG.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height(), pixels = image.pixel_count(), device = %profile.class))]
    pub fn prepare_for_upload(
        &self,
        image: &RasterImage,
        profile: &DeviceProfile,
    ) -> Result<ImagePayload> {
        let mut working = None;

        if let Some((w, h)) = fit_pixel_budget(image.width(), image.height(), self.upload_pixel_ceiling)
        {
            info!(
                from_w = image.width(),
                from_h = image.height(),
                to_w = w,
                to_h = h,
                ceiling = self.upload_pixel_ceiling,
                "Downscaling to absolute pixel ceiling"
            );
            working = Some(image.resized(w, h));
        }

        let current = working.as_ref().unwrap_or(image);
        if let Some((w, h)) =
            fit_pixel_budget(current.width(), current.height(), profile.upload_max_pixels)
        {
            info!(
                from_w = current.width(),
                from_h = current.height(),
                to_w = w,
                to_h = h,
                budget = profile.upload_max_pixels,
                "Downscaling to device upload budget"
            );
            working = Some(current.resized(w, h));
        }

        let prepared = working.as_ref().unwrap_or(image);
        let png = prepared.to_png_bytes()?;
        debug!(bytes = png.len(), "Upload payload encoded");

        Ok(ImagePayload {
            base64: STANDARD.encode(&png),
            mime_type: ImageMime::Png.mime_type().to_string(),
            width: prepared.width(),
            height: prepared.height(),
        })
    }

    /// Upscale a returned result for display/export. Never fails.
    #[instrument(skip(self, encoded), fields(len = encoded.len(), device = %profile.class))]
    pub fn prepare_for_display(&self, encoded: EncodedImage, profile: &DeviceProfile) -> EncodedImage {
        let decoded = match RasterImage::decode(&encoded.bytes) {
            Ok(raster) => raster,
            Err(err) => {
                warn!(error = %err, "result could not be decoded, passing through");
                return encoded;
            }
        };

        let Some((w, h)) = display_target(decoded.width(), decoded.height(), profile) else {
            debug!(
                long_edge = decoded.long_edge(),
                pixels = decoded.pixel_count(),
                "result already at or beyond display target"
            );
            return encoded;
        };

        let upscaled = decoded.resized(w, h);
        match upscaled.to_jpeg_bytes(profile.jpeg_quality) {
            Ok(bytes) => {
                info!(
                    from_w = decoded.width(),
                    from_h = decoded.height(),
                    to_w = w,
                    to_h = h,
                    quality = profile.jpeg_quality,
                    "Result upscaled for display"
                );
                EncodedImage::new(ImageMime::Jpeg.mime_type(), bytes)
            }
            Err(err) => {
                warn!(error = %err, "result could not be re-encoded, passing through");
                encoded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32) -> RasterImage {
        RasterImage::from_buffer(RgbaImage::from_pixel(width, height, Rgba([90, 120, 150, 255])))
    }

    fn jpeg(width: u32, height: u32) -> EncodedImage {
        EncodedImage::new("image/jpeg", solid(width, height).to_jpeg_bytes(92).unwrap())
    }

    #[test]
    fn pixel_budget_preserves_aspect_ratio() {
        let (w, h) = fit_pixel_budget(3000, 2000, 4_000_000).unwrap();
        assert_eq!((w, h), (2449, 1632));
        assert!(u64::from(w) * u64::from(h) <= 4_000_000);
        assert_eq!(fit_pixel_budget(2000, 2000, 4_000_000), None);
    }

    #[test]
    fn upload_applies_ceiling_before_device_budget() {
        let resizer = AdaptiveResizer::new(1_000);
        let payload = resizer
            .prepare_for_upload(&solid(100, 50), &DeviceProfile::desktop())
            .unwrap();
        assert_eq!((payload.width, payload.height), (44, 22));
        assert_eq!(payload.mime_type, "image/png");

        let bytes = STANDARD.decode(&payload.base64).unwrap();
        assert_eq!(RasterImage::decode(&bytes).unwrap().dimensions(), (44, 22));
    }

    #[test]
    fn small_uploads_are_only_reencoded() {
        let resizer = AdaptiveResizer::new(4_000_000);
        let source = solid(40, 30);
        let payload = resizer.prepare_for_upload(&source, &DeviceProfile::mobile()).unwrap();
        assert_eq!((payload.width, payload.height), (40, 30));
        let bytes = STANDARD.decode(&payload.base64).unwrap();
        assert_eq!(RasterImage::decode(&bytes).unwrap(), source);
    }

    #[test]
    fn display_target_respects_safety_ceiling() {
        let mobile = DeviceProfile::mobile();
        assert_eq!(display_target(1024, 683, &mobile), Some((2048, 1366)));
        // Already at the target long edge.
        assert_eq!(display_target(2048, 1000, &mobile), None);
        // Square upscale would exceed 4 MP.
        assert_eq!(display_target(1500, 1500, &mobile), None);
    }

    #[test]
    fn display_path_upscales_small_results_on_mobile() {
        let resizer = AdaptiveResizer::new(4_000_000);
        let out = resizer.prepare_for_display(jpeg(512, 256), &DeviceProfile::mobile());
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(RasterImage::decode(&out.bytes).unwrap().dimensions(), (2048, 1024));
    }

    #[test]
    fn display_path_leaves_large_results_alone() {
        let resizer = AdaptiveResizer::new(4_000_000);
        let original = jpeg(2100, 40);
        let out = resizer.prepare_for_display(original.clone(), &DeviceProfile::mobile());
        assert_eq!(out, original);
    }

    #[test]
    fn display_path_passes_garbage_through() {
        let resizer = AdaptiveResizer::new(4_000_000);
        let garbage = EncodedImage::new("image/jpeg", vec![1, 2, 3, 4]);
        let out = resizer.prepare_for_display(garbage.clone(), &DeviceProfile::desktop());
        assert_eq!(out, garbage);
    }
}
