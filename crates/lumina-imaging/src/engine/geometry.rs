// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry stage: quarter-turn rotation, horizontal flip and centered
// aspect-ratio crop.

use image::imageops;
use lumina_core::{AdjustmentState, AspectRatio};
use tracing::debug;

use crate::raster::RasterImage;

/// Canvas size after rotating a `width` x `height` image by `rotation` degrees.
pub fn rotated_dimensions(width: u32, height: u32, rotation: u16) -> (u32, u32) {
    if rotation % 180 == 0 {
        (width, height)
    } else {
        (height, width)
    }
}

/// Largest rectangle of the given ratio that fits inside `width` x `height`.
///
/// When the frame is wider than the target ratio, height is the constraining
/// dimension; otherwise width is. Integer arithmetic keeps exact ratios exact.
pub fn crop_dimensions(width: u32, height: u32, aspect: AspectRatio) -> (u32, u32) {
    let Some((num, den)) = aspect.terms() else {
        return (width, height);
    };
    let (w, h) = (u64::from(width), u64::from(height));
    let (num, den) = (u64::from(num), u64::from(den));

    let (tw, th) = if w * den > h * num {
        (h * num / den, h)
    } else {
        (w, w * den / num)
    };
    ((tw as u32).clamp(1, width.max(1)), (th as u32).clamp(1, height.max(1)))
}

/// Final canvas size for `state` applied to a `width` x `height` source.
pub fn canvas_dimensions(width: u32, height: u32, state: &AdjustmentState) -> (u32, u32) {
    let (rw, rh) = rotated_dimensions(width, height, state.rotation);
    crop_dimensions(rw, rh, state.aspect_ratio)
}

/// Mirror the source, rotate the mirrored image about its center, then crop
/// centrally. For quarter turns this is the same as a vertical flip of the
/// rotated frame.
pub fn apply_geometry(image: &RasterImage, state: &AdjustmentState) -> RasterImage {
    let mirrored;
    let source = if state.flip_horizontal {
        mirrored = imageops::flip_horizontal(image.as_buffer());
        &mirrored
    } else {
        image.as_buffer()
    };
    let rotated = match state.rotation {
        90 => imageops::rotate90(source),
        180 => imageops::rotate180(source),
        270 => imageops::rotate270(source),
        _ => source.clone(),
    };

    let (rw, rh) = rotated.dimensions();
    let (tw, th) = crop_dimensions(rw, rh, state.aspect_ratio);
    if (tw, th) == (rw, rh) {
        return RasterImage::from_buffer(rotated);
    }

    let x = (rw - tw) / 2;
    let y = (rh - th) / 2;
    debug!(x, y, width = tw, height = th, ratio = %state.aspect_ratio, "Cropping to aspect ratio");
    RasterImage::from_buffer(imageops::crop_imm(&rotated, x, y, tw, th).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Each pixel encodes its own coordinates so transforms can be traced.
    fn coordinates(width: u32, height: u32) -> RasterImage {
        RasterImage::from_buffer(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, 0, 255])
        }))
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        let image = coordinates(6, 4);
        for rotation in [0u16, 90, 180, 270] {
            let state = AdjustmentState::default().with_rotation(i32::from(rotation));
            let out = apply_geometry(&image, &state);
            let expected = if rotation % 180 == 0 { (6, 4) } else { (4, 6) };
            assert_eq!(out.dimensions(), expected, "rotation {rotation}");
            assert_eq!(canvas_dimensions(6, 4, &state), expected);
        }
    }

    #[test]
    fn rotation_is_clockwise() {
        let image = coordinates(3, 2);
        let out = apply_geometry(&image, &AdjustmentState::default().rotate_right());
        // The bottom-left source pixel lands in the top-left corner.
        assert_eq!(out.pixel(0, 0), [0, 1, 0, 255]);
        assert_eq!(out.pixel(1, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn flip_mirrors_the_source_before_rotating() {
        let image = coordinates(3, 2);
        let state = AdjustmentState::default().rotate_right().with_flip(true);
        let out = apply_geometry(&image, &state);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.pixel(0, 0), [2, 1, 0, 255]);
        assert_eq!(out.pixel(1, 0), [2, 0, 0, 255]);
    }

    #[test]
    fn flip_with_rotation_matches_rotating_the_mirror_image() {
        let image = coordinates(5, 3);
        for rotation in [0i32, 90, 180, 270] {
            let state = AdjustmentState::default().with_rotation(rotation).with_flip(true);
            let mirrored = imageops::flip_horizontal(image.as_buffer());
            let expected = match rotation {
                90 => imageops::rotate90(&mirrored),
                180 => imageops::rotate180(&mirrored),
                270 => imageops::rotate270(&mirrored),
                _ => mirrored,
            };
            let out = apply_geometry(&image, &state);
            assert_eq!(out.as_buffer(), &expected, "rotation {rotation}");
        }
    }

    #[test]
    fn crop_picks_the_constraining_dimension() {
        assert_eq!(crop_dimensions(1600, 900, AspectRatio::Square), (900, 900));
        assert_eq!(crop_dimensions(900, 1600, AspectRatio::Wide), (900, 506));
        assert_eq!(crop_dimensions(1200, 900, AspectRatio::Standard), (1200, 900));
        assert_eq!(crop_dimensions(3000, 1000, AspectRatio::Classic), (1500, 1000));
        assert_eq!(crop_dimensions(640, 480, AspectRatio::Original), (640, 480));
    }

    #[test]
    fn crop_is_centered() {
        let image = coordinates(10, 4);
        let state = AdjustmentState::default().with_aspect_ratio(AspectRatio::Square);
        let out = apply_geometry(&image, &state);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.pixel(0, 0), [3, 0, 0, 255]);
        assert_eq!(out.pixel(3, 3), [6, 3, 0, 255]);
    }

    #[test]
    fn crop_never_collapses_tiny_frames() {
        assert_eq!(crop_dimensions(1, 1, AspectRatio::Wide), (1, 1));
    }
}
