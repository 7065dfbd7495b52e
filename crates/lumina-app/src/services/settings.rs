// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings persistence: `AppConfig` stored as pretty JSON in the config
// directory, with environment overrides applied on load.

use std::path::{Path, PathBuf};

use lumina_core::AppConfig;
use lumina_core::error::Result;
use tracing::{debug, info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Overrides `AppConfig::endpoint` when set.
pub const ENDPOINT_ENV: &str = "LUMINA_ENDPOINT";

/// Handle on the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
}

impl Settings {
    /// Settings stored in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(CONFIG_FILE),
        }
    }

    /// Settings in the platform config directory.
    pub fn default_location() -> Self {
        Self::in_dir(&data_dir::config_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted settings, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(&self) -> AppConfig {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "no saved settings, using defaults");
                return AppConfig::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "settings file is corrupt, using defaults");
                AppConfig::default()
            }
        }
    }

    /// Load settings and apply environment overrides.
    pub fn load_effective(&self) -> AppConfig {
        apply_env_overrides(self.load(), std::env::var(ENDPOINT_ENV).ok())
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;
        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Overwrite the saved settings with defaults.
    pub fn reset(&self) -> Result<AppConfig> {
        let config = AppConfig::default();
        self.save(&config)?;
        Ok(config)
    }
}

/// Apply an endpoint override (from `LUMINA_ENDPOINT`).
pub fn apply_env_overrides(mut config: AppConfig, endpoint: Option<String>) -> AppConfig {
    if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
        debug!(%endpoint, "endpoint overridden from environment");
        config.endpoint = endpoint.trim().to_string();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::{DeviceClass, EnhancementStyle};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::in_dir(dir.path()).load(), AppConfig::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::in_dir(dir.path());
        let config = AppConfig {
            endpoint: "https://enhance.example.org".into(),
            default_style: EnhancementStyle::Restoration,
            device: Some(DeviceClass::Mobile),
            ..Default::default()
        };
        settings.save(&config).unwrap();
        assert_eq!(settings.load(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"max_attempts": 2}"#).unwrap();
        let config = Settings::in_dir(dir.path()).load();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.request_timeout_secs, 180);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        assert_eq!(Settings::in_dir(dir.path()).load(), AppConfig::default());
    }

    #[test]
    fn reset_restores_defaults_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::in_dir(dir.path());
        settings
            .save(&AppConfig {
                max_attempts: 9,
                ..Default::default()
            })
            .unwrap();
        settings.reset().unwrap();
        assert_eq!(settings.load().max_attempts, 5);
    }

    #[test]
    fn endpoint_override_ignores_blank_values() {
        let base = AppConfig::default();
        let overridden = apply_env_overrides(base.clone(), Some(" http://10.0.0.2:3001 ".into()));
        assert_eq!(overridden.endpoint, "http://10.0.0.2:3001");
        assert_eq!(apply_env_overrides(base.clone(), Some("  ".into())), base);
    }
}
