//! Engine tuning knobs and persisted host settings.
//!
//! Settings live as JSON in the OS config directory. Every field carries a
//! default so a partial file is valid; a missing file is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::ZoomLevel;

/// Errors that can occur when loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not determine the config directory")]
    NoConfigDir,
}

/// Geometry and timing constants for the timeline engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub column_width: f64,
    pub visible_columns: usize,
    /// Extra columns generated on each side of the viewport.
    pub column_buffer: usize,
    /// Pointer distance from a bar edge that selects a resize gesture.
    pub edge_handle_px: f64,
    /// Minimum bar width as a fraction of one column.
    pub min_bar_fraction: f64,
    pub override_ttl_ms: u64,
    pub sweep_interval_ms: u64,
    pub zoom_animation_ms: u64,
    pub autoscroll_margin_px: f64,
    pub autoscroll_min_speed: f64,
    pub autoscroll_max_speed: f64,
    pub frame_interval_ms: u64,
    /// Columns moved by the prev/next commands.
    pub nav_step_columns: usize,
    pub initial_zoom: ZoomLevel,
    pub show_completed: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            column_width: 120.0,
            visible_columns: 12,
            column_buffer: 10,
            edge_handle_px: 6.0,
            min_bar_fraction: 0.25,
            override_ttl_ms: 2000,
            sweep_interval_ms: 500,
            zoom_animation_ms: 300,
            autoscroll_margin_px: 64.0,
            autoscroll_min_speed: 2.0,
            autoscroll_max_speed: 10.0,
            frame_interval_ms: 16,
            nav_step_columns: 3,
            initial_zoom: ZoomLevel::Week,
            show_completed: false,
        }
    }
}

impl EngineConfig {
    pub fn override_ttl(&self) -> Duration {
        Duration::from_millis(self.override_ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn zoom_animation(&self) -> Duration {
        Duration::from_millis(self.zoom_animation_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn min_bar_width(&self) -> f64 {
        self.column_width * self.min_bar_fraction
    }

    /// Adopt the current view as the startup view. Returns true when anything changed.
    pub fn remember_view(&mut self, zoom: ZoomLevel, show_completed: bool) -> bool {
        if self.initial_zoom == zoom && self.show_completed == show_completed {
            return false;
        }
        self.initial_zoom = zoom;
        self.show_completed = show_completed;
        true
    }
}

/// Persisted host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub engine: EngineConfig,
    pub log_level: String,
    /// Delay before the demo host applies a requested mutation to its store.
    pub simulated_latency_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            log_level: "info".into(),
            simulated_latency_ms: 600,
        }
    }
}

impl AppSettings {
    /// Location of `settings.json` in the OS config directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        directories::ProjectDirs::from("", "", "GanttTimeline")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "engine": { "column_width": 80.0, "initial_zoom": "month" } }"#)
            .unwrap();
        let settings = AppSettings::load(&path).unwrap();
        assert_eq!(settings.engine.column_width, 80.0);
        assert_eq!(settings.engine.initial_zoom, ZoomLevel::Month);
        assert_eq!(settings.engine.visible_columns, 12);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppSettings::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = AppSettings::default();
        settings.engine.override_ttl_ms = 3500;
        settings.save(&path).unwrap();
        assert_eq!(AppSettings::load(&path).unwrap().engine.override_ttl_ms, 3500);
    }

    #[test]
    fn remembered_view_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = AppSettings::default();
        assert!(!settings.engine.remember_view(ZoomLevel::Week, false));
        assert!(settings.engine.remember_view(ZoomLevel::Month, true));
        settings.save(&path).unwrap();

        let loaded = AppSettings::load(&path).unwrap();
        assert_eq!(loaded.engine.initial_zoom, ZoomLevel::Month);
        assert!(loaded.engine.show_completed);
    }
}
