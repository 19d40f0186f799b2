//! Effect settings types and persistence
//!
//! This module handles loading and saving the playback settings that shape
//! the reveal: volume, per-channel enable flags and animation speed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const APP_DATA_FOLDER: &str = "rollreveal";
const SETTINGS_FILE: &str = "settings.json";

pub const MIN_ANIMATION_SPEED: f32 = 0.5;
pub const MAX_ANIMATION_SPEED: f32 = 2.0;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not determine a settings directory")]
    NoSettingsDir,
}

/// Playback settings for roll effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Master volume in `[0, 1]`.
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    #[serde(default = "default_true")]
    pub vibration_enabled: bool,

    #[serde(default = "default_true")]
    pub particles_enabled: bool,

    /// Visual timing multiplier in `[0.5, 2]`. Never affects roll totals.
    #[serde(default = "default_animation_speed")]
    pub animation_speed: f32,

    /// Shake the dice (and play the shake cue) when a roll starts.
    #[serde(default = "default_true")]
    pub shake_on_roll: bool,
}

fn default_volume() -> f32 {
    0.8
}

fn default_animation_speed() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            sound_enabled: true,
            vibration_enabled: true,
            particles_enabled: true,
            animation_speed: default_animation_speed(),
            shake_on_roll: true,
        }
    }
}

impl EffectSettings {
    /// Copy with every scalar clamped into its legal range (NaN falls back to the default).
    pub fn sanitized(&self) -> Self {
        let volume = if self.volume.is_nan() {
            default_volume()
        } else {
            self.volume.clamp(0.0, 1.0)
        };
        Self {
            volume,
            animation_speed: clamp_animation_speed(self.animation_speed),
            ..self.clone()
        }
    }

    /// Per-platform settings location, e.g. `~/.config/rollreveal/settings.json`.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        #[cfg(target_os = "windows")]
        {
            if let Ok(local_app_data) = std::env::var("LOCALAPPDATA") {
                return Ok(PathBuf::from(local_app_data)
                    .join(APP_DATA_FOLDER)
                    .join(SETTINGS_FILE));
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Ok(home) = std::env::var("HOME") {
                return Ok(PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DATA_FOLDER)
                    .join(SETTINGS_FILE));
            }
        }

        if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
            if !config_home.is_empty() {
                return Ok(PathBuf::from(config_home)
                    .join(APP_DATA_FOLDER)
                    .join(SETTINGS_FILE));
            }
        }
        if let Ok(home) = std::env::var("HOME") {
            return Ok(PathBuf::from(home)
                .join(".config")
                .join(APP_DATA_FOLDER)
                .join(SETTINGS_FILE));
        }

        Err(SettingsError::NoSettingsDir)
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                warn!("Could not read settings from {}: {err}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<EffectSettings>(&text) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(err) => {
                warn!("Ignoring malformed settings in {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.sanitized())?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn clamp_animation_speed(speed: f32) -> f32 {
    if speed.is_nan() {
        return default_animation_speed();
    }
    speed.clamp(MIN_ANIMATION_SPEED, MAX_ANIMATION_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EffectSettings::default();
        assert_eq!(settings.volume, 0.8);
        assert_eq!(settings.animation_speed, 1.0);
        assert!(settings.sound_enabled && settings.vibration_enabled && settings.particles_enabled);
    }

    #[test]
    fn test_sanitized_clamps() {
        let settings = EffectSettings {
            volume: 3.0,
            animation_speed: 10.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.animation_speed, MAX_ANIMATION_SPEED);

        let settings = EffectSettings {
            volume: f32::NAN,
            animation_speed: 0.1,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.volume, 0.8);
        assert_eq!(settings.animation_speed, MIN_ANIMATION_SPEED);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: EffectSettings = serde_json::from_str(r#"{"volume": 0.25}"#).unwrap();
        assert_eq!(settings.volume, 0.25);
        assert!(settings.particles_enabled);
        assert_eq!(settings.animation_speed, 1.0);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let path = std::env::temp_dir().join("rollreveal-missing-dir/none.json");
        assert_eq!(EffectSettings::load_from(&path), EffectSettings::default());
    }
}
