// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// RasterImage — an addressable RGBA pixel buffer plus the codecs that move
// images in and out of it.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use lumina_core::error::{LuminaError, Result};
use tracing::{debug, instrument};

/// Row-major RGBA buffer, 4 bytes per pixel.
///
/// A raster is owned by whichever component currently holds it; renders
/// produce a new raster instead of patching an existing one.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    buffer: RgbaImage,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Wrap raw RGBA bytes. Fails if the length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        let buffer = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            LuminaError::Decode(format!(
                "pixel buffer holds {actual} bytes, {width}x{height} needs {expected}"
            ))
        })?;
        Ok(Self { buffer })
    }

    /// Wrap an existing `image` buffer.
    pub fn from_buffer(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Decode encoded bytes (JPEG, PNG, WEBP, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| LuminaError::Decode(format!("failed to decode image: {err}")))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self {
            buffer: img.into_rgba8(),
        })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn long_edge(&self) -> u32 {
        self.width().max(self.height())
    }

    /// RGBA value at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn as_buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    // -- Resampling -----------------------------------------------------------

    /// Resample to exactly `width` x `height` with Lanczos3 filtering.
    #[instrument(skip(self), fields(from_w = self.width(), from_h = self.height()))]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let resized = image::imageops::resize(&self.buffer, width, height, FilterType::Lanczos3);
        debug!(new_w = width, new_h = height, "Resize complete");
        Self { buffer: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as PNG with default settings.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(self.buffer.clone())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| LuminaError::Encode(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Encode as PNG with the strongest compression (still lossless).
    pub fn to_png_bytes_best(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive);
        self.buffer
            .write_with_encoder(encoder)
            .map_err(|err| LuminaError::Encode(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Encode as JPEG with the given quality (1-100). Alpha is dropped.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = DynamicImage::ImageRgba8(self.buffer.clone()).to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| LuminaError::Encode(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }
}
