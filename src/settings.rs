use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::coords::OriginMode;
use crate::pdf::{DEFAULT_CACHE_SIZE, ServiceConfig, Zoom};
use crate::units::{Unit, UnitSet};
use crate::viewer::ViewOptions;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pdf_inspector";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub origin: OriginMode,

    #[serde(default)]
    pub units: UnitSet,

    #[serde(default = "default_ratio")]
    pub device_pixel_ratio: f64,

    #[serde(default = "default_scale")]
    pub default_scale: f64,

    /// Rendered frames kept by the renderer
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_ratio() -> f64 {
    1.0
}

fn default_scale() -> f64 {
    Zoom::DEFAULT
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            origin: OriginMode::default(),
            units: UnitSet::default(),
            device_pixel_ratio: default_ratio(),
            default_scale: default_scale(),
            cache_size: default_cache_size(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

impl Settings {
    /// Load from the default location, writing defaults there when no file exists
    pub fn load() -> Self {
        match default_config_path() {
            Some(path) => Self::load_or_create(&path),
            None => {
                warn!("Could not determine config directory, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            return Self::load_from_path(path);
        }

        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Self::default();
        if let Err(e) = settings.save_to_path(path) {
            error!("Failed to save settings to {path:?}: {e}");
        }
        settings
    }

    /// Read settings from `path`. Unreadable or unparseable files fall
    /// back to defaults.
    pub fn load_from_path(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to read settings file {path:?}: {e}");
                return Self::default();
            }
        };

        match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    settings.migrate();
                    if let Err(e) = settings.save_to_path(path) {
                        error!("Failed to save migrated settings to {path:?}: {e}");
                    }
                }

                settings
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                Self::default()
            }
        }
    }

    fn migrate(&mut self) {
        info!(
            "Migrating settings from v{} to v{}",
            self.version, CURRENT_VERSION
        );

        self.version = CURRENT_VERSION;
    }

    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, generate_settings_yaml(self))?;
        debug!("Saved settings to {path:?}");
        Ok(())
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            device_pixel_ratio: self.device_pixel_ratio,
            cache_size: self.cache_size,
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            origin: self.origin,
            units: self.units.clone(),
        }
    }

    /// Configured default scale, clamped to the zoom range
    pub fn scale(&self) -> f64 {
        Zoom::clamp_factor(self.default_scale)
    }
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str("# Vertical origin of reported coordinates: top_left or bottom_left\n");
    let origin = match settings.origin {
        OriginMode::TopLeft => "top_left",
        OriginMode::BottomLeft => "bottom_left",
    };
    content.push_str(&format!("origin: {origin}\n"));
    content.push_str(&format!(
        "# Units shown in the coordinate readout: {}\n",
        Unit::ALL.map(Unit::suffix).join(", ")
    ));
    let units: Vec<&str> = settings.units.iter().map(Unit::suffix).collect();
    content.push_str(&format!("units: [{}]\n", units.join(", ")));
    content.push_str(&format!(
        "device_pixel_ratio: {:?}\n",
        settings.device_pixel_ratio
    ));
    content.push_str(&format!("default_scale: {:?}\n", settings.default_scale));
    content.push_str(&format!("cache_size: {}\n", settings.cache_size));

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_path(dir: &TempDir) -> PathBuf {
        dir.path().join(APP_NAME).join(SETTINGS_FILENAME)
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let settings = Settings::load_or_create(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(Settings::load_from_path(&path), Settings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let settings = Settings {
            origin: OriginMode::BottomLeft,
            units: UnitSet::from_units([Unit::Pt, Unit::Mm, Unit::Inch]),
            device_pixel_ratio: 2.0,
            default_scale: 1.5,
            cache_size: 3,
            ..Settings::default()
        };
        settings.save_to_path(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("origin: bottom_left"));
        assert!(content.contains("units: [pt, in, mm]"));
        assert_eq!(Settings::load_from_path(&path), settings);
    }

    #[test]
    fn partial_file_uses_defaults_for_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "units: [cm]\n").unwrap();

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings.units, UnitSet::from_units([Unit::Cm]));
        assert_eq!(settings.origin, OriginMode::TopLeft);
        assert_eq!(settings.cache_size, DEFAULT_CACHE_SIZE);
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "origin: [not, an, origin\n").unwrap();

        assert_eq!(Settings::load_from_path(&path), Settings::default());
    }

    #[test]
    fn old_version_is_migrated_and_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        fs::write(&path, "version: 0\norigin: bottom_left\n").unwrap();

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings.version, CURRENT_VERSION);
        assert_eq!(settings.origin, OriginMode::BottomLeft);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&format!("version: {CURRENT_VERSION}\n")));
    }

    #[test]
    fn scale_is_clamped() {
        let settings = Settings {
            default_scale: 10.0,
            ..Settings::default()
        };
        assert_eq!(settings.scale(), Zoom::MAX_SCALE);
    }
}
