// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! Stored as JSON under the user config directory. Missing or unreadable
//! config falls back to defaults; a parse failure is logged, not fatal.

use crate::constants::{
    DEFAULT_CAPTURE_TIMEOUT, DEFAULT_JPEG_QUALITY, DEFAULT_SAVE_FOLDER, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH,
};
use crate::crop::ViewportSpec;
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Folder name for saved photos under the Pictures directory
    pub save_folder: String,
    /// Output format for saved photos
    pub output_format: OutputFormat,
    /// JPEG encoding quality (0-100)
    pub jpeg_quality: u8,
    /// Viewport the saved photo is cropped to fill
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Deadline in seconds for a one-shot capture
    pub capture_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_folder: DEFAULT_SAVE_FOLDER.to_string(),
            output_format: OutputFormat::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            capture_timeout_secs: DEFAULT_CAPTURE_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Path of the config file under the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snapcam").join("config.json"))
    }

    /// Load the config from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load a config file, falling back to defaults if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Config(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| AppError::Config(e.to_string()))?;
        Ok(())
    }

    /// Viewport described by this config
    pub fn viewport(&self) -> ViewportSpec {
        ViewportSpec::new(self.viewport_width, self.viewport_height)
    }

    /// Capture deadline described by this config
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }
}
