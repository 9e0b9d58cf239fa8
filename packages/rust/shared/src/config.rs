//! Application configuration for Waymark.
//!
//! User config lives at `~/.waymark/waymark.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WaymarkError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "waymark.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".waymark";

const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const MAPTILER_TILE_URL: &str = "https://api.maptiler.com/maps/outdoor-v2/{z}/{x}/{y}.png";

// ---------------------------------------------------------------------------
// Config structs (matching waymark.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Map camera and tile settings.
    #[serde(default)]
    pub map: MapConfig,

    /// Scroll-spy timing.
    #[serde(default)]
    pub scroll_spy: ScrollSpySection,

    /// Marker popup rendering.
    #[serde(default)]
    pub popup: PopupConfig,
}

/// `[map]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Zoom level used when flying to the active step.
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: f64,

    /// Zoom cap when the initial view contains a single marker.
    #[serde(default = "default_single_marker_zoom")]
    pub single_marker_zoom: f64,

    /// Padding around the fitted bounds on first load.
    #[serde(default = "default_fit_padding")]
    pub fit_padding_px: u32,

    /// Minimum spacing between two camera moves.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Name of the env var holding the tile provider key (never store the key itself).
    #[serde(default = "default_tile_api_key_env")]
    pub tile_api_key_env: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            focus_zoom: default_focus_zoom(),
            single_marker_zoom: default_single_marker_zoom(),
            fit_padding_px: default_fit_padding(),
            throttle_ms: default_throttle_ms(),
            tile_api_key_env: default_tile_api_key_env(),
        }
    }
}

fn default_focus_zoom() -> f64 {
    10.0
}
fn default_single_marker_zoom() -> f64 {
    10.0
}
fn default_fit_padding() -> u32 {
    50
}
fn default_throttle_ms() -> u64 {
    100
}
fn default_tile_api_key_env() -> String {
    "MAPTILER_API_KEY".into()
}

/// `[scroll_spy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollSpySection {
    /// How long a clicked step stays pinned before scrolling takes over again.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Scroll offsets below this snap the active step to the first one.
    #[serde(default = "default_top_snap")]
    pub top_snap_px: f64,
}

impl Default for ScrollSpySection {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            top_snap_px: default_top_snap(),
        }
    }
}

fn default_cooldown_ms() -> u64 {
    1000
}
fn default_top_snap() -> f64 {
    100.0
}

/// `[popup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupConfig {
    /// Maximum characters of the description shown in a marker popup.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

fn default_excerpt_chars() -> usize {
    120
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime camera configuration.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub focus_zoom: f64,
    pub single_marker_zoom: f64,
    pub fit_padding_px: u32,
    pub throttle: Duration,
}

impl From<&AppConfig> for CameraConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            focus_zoom: config.map.focus_zoom,
            single_marker_zoom: config.map.single_marker_zoom,
            fit_padding_px: config.map.fit_padding_px,
            throttle: Duration::from_millis(config.map.throttle_ms),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime scroll-spy configuration.
///
/// `top_snap` is expressed in the same unit as the viewport fed to the
/// scroll-spy (CSS pixels for web layouts, rows for terminal layouts).
#[derive(Debug, Clone)]
pub struct ScrollSpyConfig {
    pub cooldown: Duration,
    pub top_snap: f64,
}

impl From<&AppConfig> for ScrollSpyConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            cooldown: Duration::from_millis(config.scroll_spy.cooldown_ms),
            top_snap: config.scroll_spy.top_snap_px,
        }
    }
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tile source
// ---------------------------------------------------------------------------

/// Where map tiles come from. Only affects presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum TileSource {
    OpenStreetMap { url_template: String },
    MapTiler { url_template: String },
}

impl TileSource {
    pub fn url_template(&self) -> &str {
        match self {
            Self::OpenStreetMap { url_template } | Self::MapTiler { url_template } => url_template,
        }
    }
}

/// Pick the tile provider: MapTiler when its key env var is set and
/// non-empty, OpenStreetMap otherwise.
pub fn tile_source(config: &AppConfig) -> TileSource {
    let var_name = &config.map.tile_api_key_env;
    match std::env::var(var_name) {
        Ok(key) if !key.is_empty() => TileSource::MapTiler {
            url_template: format!("{MAPTILER_TILE_URL}?key={key}"),
        },
        _ => {
            tracing::debug!(var_name, "no tile provider key, using OpenStreetMap");
            TileSource::OpenStreetMap {
                url_template: OSM_TILE_URL.into(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.waymark/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| WaymarkError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.waymark/waymark.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WaymarkError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| WaymarkError::config(format!("failed to parse {}: {e}", path.display())))?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject values the controllers cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    for (name, zoom) in [
        ("map.focus_zoom", config.map.focus_zoom),
        ("map.single_marker_zoom", config.map.single_marker_zoom),
    ] {
        if !(0.0..=22.0).contains(&zoom) {
            return Err(WaymarkError::config(format!(
                "{name} must be between 0 and 22, got {zoom}"
            )));
        }
    }
    if !config.scroll_spy.top_snap_px.is_finite() || config.scroll_spy.top_snap_px < 0.0 {
        return Err(WaymarkError::config(
            "scroll_spy.top_snap_px must be a non-negative number",
        ));
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WaymarkError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WaymarkError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WaymarkError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
