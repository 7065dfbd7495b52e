// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device capability profiles.
//
// A profile is derived once per session and injected into the resizer, which
// keeps the resizer free of environment sniffing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Viewports narrower than this are treated as mobile.
const MOBILE_VIEWPORT_WIDTH: u32 = 768;

/// User-agent tokens that identify a mobile device.
const MOBILE_UA_TOKENS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Device class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    #[default]
    Desktop,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "desktop" => Ok(Self::Desktop),
            other => Err(format!("unknown device class '{other}' (expected mobile or desktop)")),
        }
    }
}

/// Environment signals a profile is derived from.
#[derive(Debug, Clone, Default)]
pub struct DeviceSignals {
    pub user_agent: Option<String>,
    pub viewport_width: Option<u32>,
}

/// Safety ceilings and quality tiers for one device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub class: DeviceClass,
    /// Results larger than this are never re-encoded for display.
    pub max_safe_pixel_count: u64,
    /// Long edge results are upscaled to for display.
    pub target_long_edge: u32,
    /// JPEG quality (1-100) for the display re-encode.
    pub jpeg_quality: u8,
    /// Pixel budget for the upload payload after the absolute ceiling.
    pub upload_max_pixels: u64,
}

impl DeviceProfile {
    pub const fn mobile() -> Self {
        Self {
            class: DeviceClass::Mobile,
            max_safe_pixel_count: 4_000_000,
            target_long_edge: 2048,
            jpeg_quality: 85,
            upload_max_pixels: 1200 * 1200,
        }
    }

    pub const fn desktop() -> Self {
        Self {
            class: DeviceClass::Desktop,
            max_safe_pixel_count: 25_000_000,
            target_long_edge: 4096,
            jpeg_quality: 95,
            upload_max_pixels: 2000 * 2000,
        }
    }

    pub const fn for_class(class: DeviceClass) -> Self {
        match class {
            DeviceClass::Mobile => Self::mobile(),
            DeviceClass::Desktop => Self::desktop(),
        }
    }

    /// Pick a profile from form-factor signals.
    pub fn detect(signals: &DeviceSignals) -> Self {
        let ua_mobile = signals.user_agent.as_deref().is_some_and(|ua| {
            let lower = ua.to_ascii_lowercase();
            MOBILE_UA_TOKENS.iter().any(|token| lower.contains(token))
        });
        let narrow = signals
            .viewport_width
            .is_some_and(|width| width < MOBILE_VIEWPORT_WIDTH);

        if ua_mobile || narrow {
            Self::mobile()
        } else {
            Self::desktop()
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::desktop()
    }
}
