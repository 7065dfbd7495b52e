// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Slow detail pass: sharpen, highlights and clarity in one scan.
//
// The constants are heuristic and kept as-is for output compatibility.

use lumina_core::AdjustmentState;

/// Rec. 601 luma weights.
const LUMA: [f32; 3] = [0.299, 0.587, 0.114];
const MID_GRAY: f32 = 128.0;
/// Maximum highlights boost, reached at full luminance and |highlights| = 100.
const HIGHLIGHT_BOOST: f32 = 50.0;
const CLARITY_GAIN: f32 = 0.5;

/// Per-pixel detail parameters extracted from an adjustment state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailPass {
    sharpen: f32,
    highlights: f32,
    clarity: f32,
}

impl DetailPass {
    pub fn from_state(state: &AdjustmentState) -> Self {
        Self {
            sharpen: state.sharpness.max(0.0) / 100.0,
            highlights: state.highlights / 100.0,
            clarity: state.clarity / 100.0,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.sharpen == 0.0 && self.highlights == 0.0 && self.clarity == 0.0
    }

    /// Apply in place to a `width` x `height` RGBA buffer.
    ///
    /// Sharpening reads neighbours from a snapshot of the incoming buffer and
    /// only touches interior pixels. Alpha is left alone.
    pub fn apply(&self, rgba: &mut [u8], width: u32, height: u32) {
        if self.is_noop() {
            return;
        }
        let (w, h) = (width as usize, height as usize);
        let stride = w * 4;
        let snapshot = (self.sharpen > 0.0).then(|| rgba.to_vec());

        for y in 0..h {
            for x in 0..w {
                let idx = y * stride + x * 4;
                let mut rgb = [
                    f32::from(rgba[idx]),
                    f32::from(rgba[idx + 1]),
                    f32::from(rgba[idx + 2]),
                ];

                let interior = x > 0 && y > 0 && x + 1 < w && y + 1 < h;
                if let (Some(src), true) = (snapshot.as_deref(), interior) {
                    for (c, value) in rgb.iter_mut().enumerate() {
                        let i = idx + c;
                        let edge = 4.0 * f32::from(src[i])
                            - f32::from(src[i - stride])
                            - f32::from(src[i + stride])
                            - f32::from(src[i - 4])
                            - f32::from(src[i + 4]);
                        *value += edge * self.sharpen;
                    }
                }

                if self.highlights != 0.0 {
                    let luminance = LUMA[0] * rgb[0] + LUMA[1] * rgb[1] + LUMA[2] * rgb[2];
                    if luminance > MID_GRAY {
                        let boost = self.highlights * HIGHLIGHT_BOOST * (luminance - MID_GRAY)
                            / 127.0;
                        rgb = rgb.map(|v| v + boost);
                    }
                }

                if self.clarity != 0.0 {
                    rgb = rgb.map(|v| v + (v - MID_GRAY) * self.clarity * CLARITY_GAIN);
                }

                for (c, value) in rgb.into_iter().enumerate() {
                    rgba[idx + c] = value.clamp(0.0, 255.0).round_ties_even() as u8;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::Slider;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| {
                let v = ((i * 53) % 256) as u8;
                [v, v.wrapping_add(40), v.wrapping_mul(3), 200]
            })
            .collect()
    }

    fn pass(slider: Slider, value: f32) -> DetailPass {
        DetailPass::from_state(&AdjustmentState::default().with(slider, value))
    }

    #[test]
    fn zero_sharpness_is_noop() {
        let original = gradient(6, 5);
        let mut buf = original.clone();
        pass(Slider::Sharpness, 0.0).apply(&mut buf, 6, 5);
        assert_eq!(buf, original);
    }

    #[test]
    fn sharpen_leaves_borders_untouched() {
        let (w, h) = (7u32, 6u32);
        let original = gradient(w, h);
        let mut buf = original.clone();
        pass(Slider::Sharpness, 80.0).apply(&mut buf, w, h);

        for y in 0..h {
            for x in 0..w {
                let border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
                let idx = ((y * w + x) * 4) as usize;
                if border {
                    assert_eq!(buf[idx..idx + 4], original[idx..idx + 4], "({x},{y})");
                }
                assert_eq!(buf[idx + 3], 200);
            }
        }
        assert_ne!(buf, original);
    }

    #[test]
    fn sharpen_ignores_flat_regions() {
        let original: Vec<u8> = [90u8, 90, 90, 255].repeat(25);
        let mut buf = original.clone();
        pass(Slider::Sharpness, 100.0).apply(&mut buf, 5, 5);
        assert_eq!(buf, original);
    }

    #[test]
    fn sharpen_reads_the_unsharpened_snapshot() {
        // A single bright dot in the middle of a 3x3 field.
        let mut buf = [10u8, 10, 10, 255].repeat(9);
        buf[16..19].copy_from_slice(&[50, 50, 50]);
        pass(Slider::Sharpness, 50.0).apply(&mut buf, 3, 3);
        // 50 + (4*50 - 4*10) * 0.5 = 130
        assert_eq!(&buf[16..19], &[130, 130, 130]);
    }

    #[test]
    fn highlights_skip_shadows_and_midtones() {
        let mut buf = vec![128, 128, 128, 255, 40, 60, 20, 255];
        let original = buf.clone();
        pass(Slider::Highlights, 100.0).apply(&mut buf, 2, 1);
        assert_eq!(buf, original);
    }

    #[test]
    fn clarity_pushes_away_from_mid_gray() {
        let mut buf = vec![200, 128, 56, 255];
        pass(Slider::Clarity, 100.0).apply(&mut buf, 1, 1);
        assert_eq!(buf, vec![236, 128, 20, 255]);
    }

    proptest! {
        #[test]
        fn highlights_brighten_monotonically(
            rgb in prop::array::uniform3(0u8..=255),
            low in 0.0f32..100.0,
            delta in 0.0f32..100.0,
        ) {
            let high = (low + delta).min(100.0);
            let px = vec![rgb[0], rgb[1], rgb[2], 255];

            let mut a = px.clone();
            pass(Slider::Highlights, low).apply(&mut a, 1, 1);
            let mut b = px.clone();
            pass(Slider::Highlights, high).apply(&mut b, 1, 1);

            let luminance = LUMA[0] * f32::from(rgb[0])
                + LUMA[1] * f32::from(rgb[1])
                + LUMA[2] * f32::from(rgb[2]);
            for c in 0..3 {
                prop_assert!(a[c] <= b[c]);
                if luminance <= MID_GRAY {
                    prop_assert_eq!(b[c], px[c]);
                } else {
                    prop_assert!(b[c] >= px[c]);
                }
            }
        }
    }
}
