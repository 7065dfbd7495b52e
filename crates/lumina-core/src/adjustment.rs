// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adjustment state — the full set of user-controllable geometry and tonal
// parameters for one render.
//
// `AdjustmentState` is `Copy`: every user action produces a new value that
// replaces the previous one wholesale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Crop aspect ratio applied after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Keep the rotated frame as-is.
    #[default]
    Original,
    /// 1:1.
    Square,
    /// 16:9.
    Wide,
    /// 4:3.
    Standard,
    /// 3:2.
    Classic,
}

impl AspectRatio {
    /// `(width, height)` terms of the ratio, or `None` for
    /// [`AspectRatio::Original`].
    pub fn terms(&self) -> Option<(u32, u32)> {
        match self {
            Self::Original => None,
            Self::Square => Some((1, 1)),
            Self::Wide => Some((16, 9)),
            Self::Standard => Some((4, 3)),
            Self::Classic => Some((3, 2)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Square => "1:1",
            Self::Wide => "16:9",
            Self::Standard => "4:3",
            Self::Classic => "3:2",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "1:1" | "square" => Ok(Self::Square),
            "16:9" => Ok(Self::Wide),
            "4:3" => Ok(Self::Standard),
            "3:2" => Ok(Self::Classic),
            other => Err(format!(
                "unknown aspect ratio '{other}' (expected original, 1:1, 16:9, 4:3 or 3:2)"
            )),
        }
    }
}

/// The eight numeric sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Brightness,
    Contrast,
    Saturation,
    Exposure,
    Warmth,
    Sharpness,
    Clarity,
    Highlights,
}

impl Slider {
    pub const ALL: [Slider; 8] = [
        Slider::Brightness,
        Slider::Contrast,
        Slider::Saturation,
        Slider::Exposure,
        Slider::Warmth,
        Slider::Sharpness,
        Slider::Clarity,
        Slider::Highlights,
    ];

    /// Inclusive range accepted by the editor.
    pub fn range(&self) -> (f32, f32) {
        match self {
            Self::Brightness | Self::Contrast | Self::Exposure => (50.0, 150.0),
            Self::Saturation => (0.0, 200.0),
            Self::Warmth | Self::Sharpness | Self::Clarity => (0.0, 100.0),
            Self::Highlights => (-100.0, 100.0),
        }
    }

    pub fn default_value(&self) -> f32 {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation | Self::Exposure => 100.0,
            Self::Warmth | Self::Sharpness | Self::Clarity | Self::Highlights => 0.0,
        }
    }

    /// Whether the slider feeds the per-pixel detail pass.
    pub fn is_detail(&self) -> bool {
        matches!(self, Self::Sharpness | Self::Clarity | Self::Highlights)
    }

    fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let (lo, hi) = self.range();
        value.clamp(lo, hi)
    }
}

/// Geometry and tonal parameters for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdjustmentState {
    /// Clockwise rotation in degrees; always one of 0, 90, 180, 270.
    pub rotation: u16,
    pub flip_horizontal: bool,
    pub aspect_ratio: AspectRatio,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub exposure: f32,
    pub warmth: f32,
    pub sharpness: f32,
    pub clarity: f32,
    pub highlights: f32,
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self {
            rotation: 0,
            flip_horizontal: false,
            aspect_ratio: AspectRatio::Original,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            exposure: 100.0,
            warmth: 0.0,
            sharpness: 0.0,
            clarity: 0.0,
            highlights: 0.0,
        }
    }
}

impl AdjustmentState {
    /// Snap `degrees` to the nearest multiple of 90 and reduce mod 360.
    pub fn with_rotation(self, degrees: i32) -> Self {
        let snapped = ((degrees as f64 / 90.0).round() as i32) * 90;
        Self {
            rotation: snapped.rem_euclid(360) as u16,
            ..self
        }
    }

    pub fn rotate_right(self) -> Self {
        self.with_rotation(i32::from(self.rotation) + 90)
    }

    pub fn rotate_left(self) -> Self {
        self.with_rotation(i32::from(self.rotation) - 90)
    }

    pub fn with_flip(self, flip_horizontal: bool) -> Self {
        Self {
            flip_horizontal,
            ..self
        }
    }

    pub fn with_aspect_ratio(self, aspect_ratio: AspectRatio) -> Self {
        Self {
            aspect_ratio,
            ..self
        }
    }

    /// Read a slider value.
    pub fn get(&self, slider: Slider) -> f32 {
        match slider {
            Slider::Brightness => self.brightness,
            Slider::Contrast => self.contrast,
            Slider::Saturation => self.saturation,
            Slider::Exposure => self.exposure,
            Slider::Warmth => self.warmth,
            Slider::Sharpness => self.sharpness,
            Slider::Clarity => self.clarity,
            Slider::Highlights => self.highlights,
        }
    }

    /// Return a copy with one slider set (clamped to its range).
    pub fn with(self, slider: Slider, value: f32) -> Self {
        let value = slider.clamp(value);
        let mut next = self;
        match slider {
            Slider::Brightness => next.brightness = value,
            Slider::Contrast => next.contrast = value,
            Slider::Saturation => next.saturation = value,
            Slider::Exposure => next.exposure = value,
            Slider::Warmth => next.warmth = value,
            Slider::Sharpness => next.sharpness = value,
            Slider::Clarity => next.clarity = value,
            Slider::Highlights => next.highlights = value,
        }
        next
    }

    /// Clamp every slider into range and snap the rotation.
    pub fn normalized(self) -> Self {
        let rotated = self.with_rotation(i32::from(self.rotation));
        Slider::ALL
            .iter()
            .fold(rotated, |state, slider| state.with(*slider, state.get(*slider)))
    }

    /// Restore every tonal slider to its default, keeping geometry.
    pub fn reset_adjustments(self) -> Self {
        Self {
            rotation: self.rotation,
            flip_horizontal: self.flip_horizontal,
            aspect_ratio: self.aspect_ratio,
            ..Self::default()
        }
    }

    /// Whether the per-pixel detail pass has any work to do.
    pub fn has_detail_adjustments(&self) -> bool {
        self.sharpness > 0.0 || self.clarity != 0.0 || self.highlights != 0.0
    }
}
