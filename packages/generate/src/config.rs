//! Map page configuration.
//!
//! Loaded from an optional TOML file. Every key is optional; missing keys
//! fall back to the Antioquia defaults.

use std::path::Path;

use risk_map_loader::DatasetSource;
use risk_map_render::{MarkerStyleConfig, NumberLocale};
use serde::{Deserialize, Serialize};

/// Errors that can occur while loading a [`MapConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`MapConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for the generated map page and marker rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Page title.
    pub title: String,
    /// Initial map center as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
    /// Tile layer URL template.
    pub tile_url: String,
    /// Maximum zoom of the tile layer.
    pub max_zoom: u8,
    /// Tile layer attribution.
    pub attribution: String,
    /// Dataset location (file path or URL) used when none is given on
    /// the command line.
    pub dataset: Option<String>,
    /// Separators used for rent values in popups.
    pub number_locale: NumberLocale,
    /// Fixed marker parameters.
    pub marker: MarkerStyleConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: "Mapa de Riesgo Antioquia".to_string(),
            center: [6.25, -75.57],
            zoom: 11,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            max_zoom: 18,
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            dataset: None,
            number_locale: NumberLocale::default(),
            marker: MarkerStyleConfig::default(),
        }
    }
}

impl MapConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not valid TOML or a
    /// key has the wrong type.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads the config at `path`, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let config = Self::from_toml(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded map config from {}", path.display());
        Ok(config)
    }

    /// Resolves the dataset source: an explicit location wins over the
    /// configured one, which wins over the default path.
    #[must_use]
    pub fn dataset_source(&self, explicit: Option<&str>) -> DatasetSource {
        explicit
            .or(self.dataset.as_deref())
            .map_or_else(DatasetSource::default, DatasetSource::from_location)
    }
}
