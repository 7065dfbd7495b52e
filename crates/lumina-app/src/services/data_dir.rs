// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config directory resolution.

use std::path::PathBuf;

/// Return the application config directory, creating it if needed.
///
/// `LUMINA_CONFIG_DIR` wins; otherwise the XDG config home (or
/// `~/.config`) gets a `lumina` subdirectory.
pub fn config_dir() -> PathBuf {
    let dir = match std::env::var_os("LUMINA_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => base_dir().join("lumina"),
    };
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn base_dir() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    std::env::temp_dir()
}
