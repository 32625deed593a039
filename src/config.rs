use egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compose::{ArtStyle, ModelTier};
use crate::mask::Brush;

pub const APP_DIR_NAME: &str = "archviz_studio";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Errors that can occur while loading settings or preset files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid brush colour '{0}', expected #rrggbb")]
    InvalidColor(String),
}

/// Application settings.
///
/// Missing fields fall back to their defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the generative API, without the `/models/...` suffix
    pub api_base_url: String,
    /// Environment variable consulted when no personal key is stored
    pub api_key_env: Option<String>,
    pub default_tier: ModelTier,
    pub default_art_style: ArtStyle,
    /// Brush diameter in display pixels
    pub brush_size: f32,
    /// Brush colour as `#rrggbb`; purely a visual aid
    pub brush_color: String,
    /// Where the personal key is persisted; defaults to the user config dir
    pub credential_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            api_key_env: Some("API_KEY".to_owned()),
            default_tier: ModelTier::default(),
            default_art_style: ArtStyle::default(),
            brush_size: 20.0,
            brush_color: "#ef4444".to_owned(),
            credential_file: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` when given, otherwise from `settings.json` in the
    /// config directory if it exists, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = config_dir().join("settings.json");
        if default_path.exists() {
            Self::load(default_path)
        } else {
            log::debug!("No settings file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn brush(&self) -> Result<Brush, ConfigError> {
        Ok(Brush {
            size: self.brush_size.max(1.0),
            color: parse_hex_color(&self.brush_color)?,
        })
    }

    pub fn credential_path(&self) -> PathBuf {
        self.credential_file
            .clone()
            .unwrap_or_else(|| config_dir().join("credentials.json"))
    }
}

/// Per-user configuration directory for this application
pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR_NAME);
    path
}

/// Parse `#rrggbb` (leading `#` optional) into an opaque colour
pub fn parse_hex_color(text: &str) -> Result<Color32, ConfigError> {
    let invalid = || ConfigError::InvalidColor(text.to_owned());
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}
