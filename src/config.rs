// config.rs - Highlight Settings
//
// Compile-time constants are the defaults. A settings.json in the platform
// config directory can override them; anything missing or invalid falls back
// to the defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{colors, frame, names, repaint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    /// Frame fill color (r, g, b)
    pub highlight_color: [u8; 3],
    /// Color treated as fully transparent on the surfaces
    pub transparency_key: [u8; 3],
    /// Frame thickness in pixels
    pub thickness: i32,
    /// Layered window alpha
    pub alpha: u8,
    /// Forced redraw period
    pub repaint_period_ms: u64,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            highlight_color: colors::HIGHLIGHT,
            transparency_key: colors::TRANSPARENCY_KEY,
            thickness: frame::THICKNESS,
            alpha: frame::ALPHA,
            repaint_period_ms: repaint::PERIOD_MS,
        }
    }
}

impl HighlightSettings {
    /// `<config_dir>/FocusHighlight/settings.json`, if the platform has a config dir
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(names::CONFIG_DIR).join(names::SETTINGS_FILE))
    }

    /// Load from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory on this platform, using default settings");
                Self::default()
            }
        }
    }

    /// Load from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {:?}, using defaults", path);
            return Self::default();
        }

        let settings = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    error!("Failed to parse settings: {}", e);
                    return Self::default();
                }
            },
            Err(e) => {
                error!("Failed to read settings file: {}", e);
                return Self::default();
            }
        };

        match settings.validate() {
            Ok(()) => {
                info!("Settings loaded from {:?}", path);
                settings
            }
            Err(e) => {
                error!("Ignoring invalid settings in {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.transparency_key == self.highlight_color {
            bail!("transparency key must differ from the highlight color");
        }
        if !(0..=frame::MAX_THICKNESS).contains(&self.thickness) {
            bail!(
                "thickness {} outside 0..={}",
                self.thickness,
                frame::MAX_THICKNESS
            );
        }
        if self.repaint_period_ms == 0 {
            bail!("repaint period must be positive");
        }
        Ok(())
    }

    pub fn repaint_period(&self) -> Duration {
        Duration::from_millis(self.repaint_period_ms)
    }

    pub fn highlight_colorref(&self) -> u32 {
        colorref(self.highlight_color)
    }

    pub fn transparency_colorref(&self) -> u32 {
        colorref(self.transparency_key)
    }
}

/// Pack (r, g, b) into the 0x00BBGGRR layout GDI uses
pub fn colorref([r, g, b]: [u8; 3]) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("focus-highlight-{}-{}", name, std::process::id()))
            .join(names::SETTINGS_FILE)
    }

    #[test]
    fn defaults_match_the_overlay_constants() {
        let settings = HighlightSettings::default();
        assert_eq!(settings.highlight_colorref(), 0x0000FF);
        assert_eq!(settings.transparency_colorref(), 0xFFFFFF);
        assert_eq!(settings.thickness, 4);
        assert_eq!(settings.alpha, 192);
        assert_eq!(settings.repaint_period(), Duration::from_millis(300));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let settings: HighlightSettings =
            serde_json::from_str(r#"{ "thickness": 6, "highlight_color": [0, 128, 255] }"#)
                .unwrap();
        assert_eq!(settings.thickness, 6);
        assert_eq!(settings.highlight_colorref(), 0xFF8000);
        assert_eq!(settings.alpha, frame::ALPHA);
        assert_eq!(settings.transparency_key, colors::TRANSPARENCY_KEY);
    }

    #[test]
    fn key_equal_to_highlight_is_rejected() {
        let settings = HighlightSettings {
            transparency_key: colors::HIGHLIGHT,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let negative = HighlightSettings { thickness: -1, ..Default::default() };
        assert!(negative.validate().is_err());

        let no_period = HighlightSettings { repaint_period_ms: 0, ..Default::default() };
        assert!(no_period.validate().is_err());
    }

    #[test]
    fn overrides_are_read_from_disk() {
        let path = temp_settings_path("roundtrip");
        let settings = HighlightSettings { thickness: 8, alpha: 128, ..Default::default() };
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();

        assert_eq!(HighlightSettings::load_from(&path), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn broken_or_invalid_files_fall_back_to_defaults() {
        let path = temp_settings_path("broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(HighlightSettings::load_from(&path), HighlightSettings::default());

        fs::write(&path, r#"{ "transparency_key": [255, 0, 0] }"#).unwrap();
        assert_eq!(HighlightSettings::load_from(&path), HighlightSettings::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = temp_settings_path("missing");
        assert_eq!(HighlightSettings::load_from(&path), HighlightSettings::default());
    }
}
