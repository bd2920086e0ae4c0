//! Editor settings
//!
//! Snapping, zoom, history depth and export defaults, stored as JSON in
//! `{config_dir}/sniply/settings.json` or any file given explicitly. Loading
//! never fails: unreadable or out-of-range values fall back to defaults.
//! Saves are atomic and serialized through an advisory lock file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{
    fs::write_json_atomic, interaction::min_clip_duration, render::ExportPreset, CoreError,
    CoreResult, TimeSec,
};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "settings.json.lock";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub editor: EditorSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            editor: EditorSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl AppSettings {
    /// Normalizes and clamps settings so persisted state is always valid.
    ///
    /// Corrects bad values instead of failing, so an old or hand-edited file
    /// still loads.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        let editor = &mut self.editor;
        editor.snap_epsilon_sec = clamp_f64(editor.snap_epsilon_sec, 0.0, 5.0);
        editor.pixels_per_second = clamp_f64(editor.pixels_per_second, 1.0, 10_000.0);
        editor.zoom = clamp_f64(editor.zoom, 0.1, 10.0);
        editor.min_clip_width_px = clamp_f64(editor.min_clip_width_px, 1.0, 1_000.0);
        editor.max_history = editor.max_history.clamp(1, 10_000);
        editor.default_image_duration_sec = clamp_f64(editor.default_image_duration_sec, 0.1, 3_600.0);
        editor.default_text_duration_sec = clamp_f64(editor.default_text_duration_sec, 0.1, 3_600.0);
    }
}

fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

/// Timeline editor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    /// Snapping enabled
    #[serde(default = "default_true")]
    pub snapping_enabled: bool,

    /// Snap distance in seconds
    #[serde(default = "default_snap_epsilon")]
    pub snap_epsilon_sec: TimeSec,

    /// Timeline scale at zoom 1.0
    #[serde(default = "default_pixels_per_second")]
    pub pixels_per_second: f64,

    /// Timeline zoom level (1.0 = 100%)
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Narrowest a clip may be drawn, which bounds resize
    #[serde(default = "default_min_clip_width")]
    pub min_clip_width_px: f64,

    /// Undo depth
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Duration given to still images on placement
    #[serde(default = "default_image_duration")]
    pub default_image_duration_sec: TimeSec,

    /// Duration given to new text clips
    #[serde(default = "default_text_duration")]
    pub default_text_duration_sec: TimeSec,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            snapping_enabled: true,
            snap_epsilon_sec: default_snap_epsilon(),
            pixels_per_second: default_pixels_per_second(),
            zoom: default_zoom(),
            min_clip_width_px: default_min_clip_width(),
            max_history: default_max_history(),
            default_image_duration_sec: default_image_duration(),
            default_text_duration_sec: default_text_duration(),
        }
    }
}

impl EditorSettings {
    /// Shortest duration a resize may produce at the current zoom
    pub fn min_duration_sec(&self) -> TimeSec {
        min_clip_duration(self.min_clip_width_px, self.pixels_per_second, self.zoom)
    }
}

fn default_true() -> bool {
    true
}

fn default_snap_epsilon() -> TimeSec {
    0.1
}

fn default_pixels_per_second() -> f64 {
    100.0
}

fn default_zoom() -> f64 {
    1.0
}

fn default_min_clip_width() -> f64 {
    40.0
}

fn default_max_history() -> usize {
    100
}

fn default_image_duration() -> TimeSec {
    5.0
}

fn default_text_duration() -> TimeSec {
    3.0
}

/// Export settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    #[serde(default)]
    pub default_preset: ExportPreset,

    /// Default export location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_export_location: Option<String>,
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Settings manager for loading, saving, and resetting settings
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager rooted at the given directory
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            settings_path: config_dir.join(SETTINGS_FILE),
        }
    }

    /// Manager for an explicit settings file
    pub fn at_path(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }

    /// Manager for the per-user config directory, if the platform has one
    pub fn for_user() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("sniply")))
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    fn with_lock<T>(&self, exclusive: bool, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        // The lock file lives next to the settings file.
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)?;
        } else {
            fs2::FileExt::lock_shared(&lock_file)?;
        }

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("Failed to unlock settings lock file: {}", e);
        }

        result
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or unreadable
    pub fn load(&self) -> AppSettings {
        let result = self.with_lock(false, || {
            if !self.settings_path.exists() {
                info!("Settings file not found, using defaults");
                return Ok(AppSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings = serde_json::from_str::<AppSettings>(&content)?;

            if settings.version < SETTINGS_VERSION {
                info!(
                    "Migrating settings from version {} to {}",
                    settings.version, SETTINGS_VERSION
                );
            }
            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Save settings to disk atomically, returning the normalized copy written
    pub fn save(&self, settings: &AppSettings) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            write_json_atomic(&self.settings_path, &normalized)?;

            info!("Settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path).map_err(|e| {
                    CoreError::Internal(format!("Failed to delete settings file: {}", e))
                })?;
                info!("Settings file deleted");
            }
            Ok(AppSettings::default())
        })
    }
}
