//! Configuration file handling for ~/.flightmap/config.ini.
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! ```ini
//! [render]
//! resolution = 2000
//! projection = mercator
//! foreground = #000000
//! background = #FFFFFF
//! line_width = 1.5
//! split_distance_km = 50
//!
//! [mapbox]
//! access_token = pk.xxx
//! style = dark-v11
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::projection::ProjectionKind;
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::render::{parse_rgba, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, DEFAULT_LINE_WIDTH};
use crate::segment::DEFAULT_SPLIT_DISTANCE_KM;

/// Default longest image edge in pixels.
pub const DEFAULT_RESOLUTION: u32 = 2000;

/// Environment variable overriding `[mapbox] access_token`.
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[render]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub resolution: u32,
    pub projection: ProjectionKind,
    pub foreground: String,
    pub background: String,
    pub line_width: f32,
    pub split_distance_km: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            projection: ProjectionKind::Linear,
            foreground: DEFAULT_FOREGROUND.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            line_width: DEFAULT_LINE_WIDTH,
            split_distance_km: DEFAULT_SPLIT_DISTANCE_KM,
        }
    }
}

/// `[mapbox]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MapboxSettings {
    pub access_token: Option<String>,
    pub style: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MapboxSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            style: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub render: RenderSettings,
    pub mapbox: MapboxSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.flightmap/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    /// Mapbox token, preferring the `MAPBOX_TOKEN` environment variable.
    pub fn mapbox_token(&self) -> Option<String> {
        resolve_token(
            std::env::var(MAPBOX_TOKEN_ENV).ok(),
            self.mapbox.access_token.as_deref(),
        )
    }
}

fn resolve_token(env: Option<String>, file: Option<&str>) -> Option<String> {
    env.filter(|t| !t.trim().is_empty())
        .or_else(|| file.map(str::to_string))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Overlays the values found in `ini` on the defaults.
fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [render] section
    if let Some(section) = ini.section(Some("render")) {
        if let Some(v) = section.get("resolution") {
            config.render.resolution = v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|r| *r > 0)
                .ok_or_else(|| invalid("render", "resolution", v, "must be a positive integer"))?;
        }
        if let Some(v) = section.get("projection") {
            config.render.projection = v
                .parse()
                .map_err(|_| invalid("render", "projection", v, "must be one of: linear, mercator"))?;
        }
        for (key, target) in [
            ("foreground", &mut config.render.foreground),
            ("background", &mut config.render.background),
        ] {
            if let Some(v) = section.get(key) {
                parse_rgba(v).map_err(|_| {
                    invalid("render", key, v, "expected '#rrggbb', '#rgb', '#rrggbbaa' or a color name")
                })?;
                *target = v.trim().to_string();
            }
        }
        if let Some(v) = section.get("line_width") {
            config.render.line_width = v
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|w| w.is_finite() && *w > 0.0)
                .ok_or_else(|| invalid("render", "line_width", v, "must be a positive number"))?;
        }
        if let Some(v) = section.get("split_distance_km") {
            config.render.split_distance_km = v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d > 0.0)
                .ok_or_else(|| {
                    invalid("render", "split_distance_km", v, "must be a positive number")
                })?;
        }
    }

    // [mapbox] section
    if let Some(section) = ini.section(Some("mapbox")) {
        if let Some(v) = section.get("access_token") {
            config.mapbox.access_token = non_empty(v);
        }
        if let Some(v) = section.get("style") {
            config.mapbox.style = non_empty(v);
        }
        if let Some(v) = section.get("timeout_secs") {
            config.mapbox.timeout_secs = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|t| *t > 0)
                .ok_or_else(|| invalid("mapbox", "timeout_secs", v, "must be a positive integer"))?;
        }
    }

    Ok(config)
}

/// Get the path to the config directory (~/.flightmap).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".flightmap")
}

/// Get the path to the config file (~/.flightmap/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
