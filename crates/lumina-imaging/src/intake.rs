// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File intake — validation of user-selected files before any decoding or
// network activity.

use std::path::Path;

use lumina_core::ImageMime;
use lumina_core::error::{LuminaError, Result};
use tracing::{debug, instrument, warn};

use crate::raster::RasterImage;

/// A user-selected file: name, declared MIME type and raw bytes.
#[derive(Clone)]
pub struct SourceFile {
    pub name: String,
    pub declared_mime: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("declared_mime", &self.declared_mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SourceFile {
    pub fn new(name: impl Into<String>, declared_mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_mime: declared_mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension.
    ///
    /// Files over `max_bytes` are rejected from their metadata, before any
    /// content is read.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            warn!(size, limit = max_bytes, "rejecting oversize file before reading");
            return Err(LuminaError::FileTooLarge {
                size,
                limit: max_bytes,
            });
        }
        let bytes = std::fs::read(path)?;
        let declared_mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageMime::from_extension)
            .map(|mime| mime.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(len = bytes.len(), mime = %declared_mime, "source file read");
        Ok(Self::new(name, declared_mime, bytes))
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Check a file against the intake rules: non-empty, at most `max_bytes`, and
/// one of JPEG, PNG or WEBP.
pub fn validate(file: &SourceFile, max_bytes: u64) -> Result<ImageMime> {
    if file.is_empty() {
        warn!(name = %file.name, "rejecting empty file");
        return Err(LuminaError::EmptyFile);
    }
    if file.len() > max_bytes {
        warn!(name = %file.name, size = file.len(), limit = max_bytes, "rejecting oversize file");
        return Err(LuminaError::FileTooLarge {
            size: file.len(),
            limit: max_bytes,
        });
    }
    ImageMime::from_mime_type(&file.declared_mime).ok_or_else(|| {
        let declared = if file.declared_mime.is_empty() {
            "unknown".to_string()
        } else {
            file.declared_mime.clone()
        };
        warn!(name = %file.name, mime = %declared, "rejecting unsupported format");
        LuminaError::UnsupportedFormat(declared)
    })
}

/// Validate then decode a file into a raster.
pub fn load(file: &SourceFile, max_bytes: u64) -> Result<RasterImage> {
    validate(file, max_bytes)?;
    RasterImage::decode(&file.bytes)
}
