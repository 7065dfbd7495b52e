// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the imaging, remote and app crates.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LuminaError;

/// Unique identifier for one user-visible enhancement operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enhancement style requested from the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementStyle {
    #[default]
    Balanced,
    Creative,
    Restoration,
}

impl EnhancementStyle {
    /// Wire keyword, also used in exported filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Creative => "creative",
            Self::Restoration => "restoration",
        }
    }
}

impl fmt::Display for EnhancementStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnhancementStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Self::Balanced),
            "creative" => Ok(Self::Creative),
            "restoration" => Ok(Self::Restoration),
            other => Err(format!(
                "unknown style '{other}' (expected balanced, creative or restoration)"
            )),
        }
    }
}

/// Image formats accepted at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    Jpeg,
    Png,
    Webp,
}

impl ImageMime {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Parse a declared MIME type. `image/jpg` is accepted as an alias.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Classification of errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Timeout, transport failure or a busy service. Safe to retry.
    Transient,
    /// The user must pick a different file or fix their input.
    UserAction,
    /// Retrying cannot help.
    Permanent,
}

/// Image portion of an enhancement request body.
///
/// Serializes as `{ base64, mimeType, width, height }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Base64 (standard alphabet, no data-URL prefix) of the encoded image.
    pub base64: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl ImagePayload {
    /// Length of the base64 text in bytes.
    pub fn encoded_len(&self) -> usize {
        self.base64.len()
    }
}

/// An encoded image (JPEG/PNG/...) together with its MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl EncodedImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, LuminaError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| LuminaError::InvalidResponse("image is not a data URL".into()))?;
        let (mime, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| LuminaError::InvalidResponse("data URL is not base64".into()))?;
        if !mime.starts_with("image/") {
            return Err(LuminaError::InvalidResponse(format!(
                "data URL has non-image type '{mime}'"
            )));
        }
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| LuminaError::InvalidResponse(format!("base64 decoding failed: {e}")))?;
        if bytes.is_empty() {
            return Err(LuminaError::InvalidResponse("data URL carries no image".into()));
        }
        Ok(Self::new(mime, bytes))
    }

    /// Render as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
