// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fast tonal pass: brightness (scaled by exposure), contrast, saturation and
// the warmth approximation (sepia blend plus a slight hue shift).
//
// Stages follow the filter-effects colour matrices and run in a fixed order,
// clamping to [0, 255] between stages. Stages at their neutral value are
// skipped entirely, so defaults leave every pixel untouched.

use lumina_core::AdjustmentState;

type Matrix = [[f32; 3]; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    /// `c * slope + intercept` per channel.
    Linear { slope: f32, intercept: f32 },
    /// 3x3 colour matrix over RGB.
    Matrix(Matrix),
}

impl Stage {
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match self {
            Stage::Linear { slope, intercept } => rgb.map(|c| c * slope + intercept),
            Stage::Matrix(m) => [0, 1, 2]
                .map(|row| m[row][0] * rgb[0] + m[row][1] * rgb[1] + m[row][2] * rgb[2]),
        };
        out.map(|c| c.clamp(0.0, 255.0))
    }
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let inv = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * inv, 0.769 - 0.769 * inv, 0.189 - 0.189 * inv],
        [0.349 - 0.349 * inv, 0.686 + 0.314 * inv, 0.168 - 0.168 * inv],
        [0.272 - 0.272 * inv, 0.534 - 0.534 * inv, 0.131 + 0.869 * inv],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Compiled fast-pass stages for one adjustment state.
#[derive(Debug, Clone, PartialEq)]
pub struct FastPass {
    stages: Vec<Stage>,
}

impl FastPass {
    pub fn from_state(state: &AdjustmentState) -> Self {
        let mut stages = Vec::with_capacity(5);

        let brightness = state.brightness * state.exposure / 10_000.0;
        if brightness != 1.0 {
            stages.push(Stage::Linear {
                slope: brightness,
                intercept: 0.0,
            });
        }

        let contrast = state.contrast / 100.0;
        if contrast != 1.0 {
            stages.push(Stage::Linear {
                slope: contrast,
                intercept: (0.5 - 0.5 * contrast) * 255.0,
            });
        }

        let saturation = state.saturation / 100.0;
        if saturation != 1.0 {
            stages.push(Stage::Matrix(saturate_matrix(saturation)));
        }

        if state.warmth != 0.0 {
            stages.push(Stage::Matrix(sepia_matrix(state.warmth * 0.5 / 100.0)));
            stages.push(Stage::Matrix(hue_rotate_matrix(-state.warmth * 0.1)));
        }

        Self { stages }
    }

    pub fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply in place to an RGBA buffer. Alpha is left alone.
    pub fn apply(&self, rgba: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        for px in rgba.chunks_exact_mut(4) {
            let mut rgb = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];
            for stage in &self.stages {
                rgb = stage.apply(rgb);
            }
            for (channel, value) in px.iter_mut().zip(rgb) {
                *channel = value.round_ties_even() as u8;
            }
        }
    }
}
