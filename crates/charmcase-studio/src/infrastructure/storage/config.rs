//! TOML-based configuration for the customizer.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\Charmcase\config.toml`
//! - Linux:    `~/.config/charmcase/config.toml`
//! - macOS:    `~/Library/Application Support/Charmcase/config.toml`
//!
//! Example:
//!
//! ```toml
//! [customizer]
//! base_price = 19.99
//! rotate_modifier = "alt"
//!
//! [display]
//! currency_symbol = "€"
//! symbol_after = true
//! decimal_separator = ","
//!
//! [catalog]
//! source = "file"
//! path = "catalog.toml"
//! ```
//!
//! # Serde default values
//!
//! Every section and every field has a default, so an empty file, a missing
//! file, and a file from an older release all load.  Raw values are checked
//! when they are turned into domain types ([`AppConfig::session_settings`]).

use std::path::{Path, PathBuf};

use charmcase_core::{PlacementBounds, PlacementError, Price, PriceError, Rect, RotateModifier};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::customize_case::{PreviewGeometry, SessionSettings};
use crate::application::price_format::PriceFormat;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid customizer.base_price: {0}")]
    BasePrice(#[from] PriceError),

    #[error("invalid placement bounds: {0}")]
    Bounds(#[from] PlacementError),

    /// A value parsed but makes no sense.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub customizer: CustomizerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Pricing, placement, and gesture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizerConfig {
    /// Price of the blank case in currency units.
    #[serde(default = "default_base_price")]
    pub base_price: f64,
    /// Lowest normalized coordinate a charm may sit at.
    #[serde(default = "default_min_percent")]
    pub min_percent: f64,
    /// Highest normalized coordinate a charm may sit at.
    #[serde(default = "default_max_percent")]
    pub max_percent: f64,
    /// Modifier that turns a press into a rotate gesture.
    #[serde(default)]
    pub rotate_modifier: RotateModifier,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Locale-dependent price rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Render the symbol after the amount (`19,99 €`).
    #[serde(default)]
    pub symbol_after: bool,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
}

/// Preview layout in preview pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewConfig {
    #[serde(default = "default_case_width")]
    pub case_width: f64,
    #[serde(default = "default_case_height")]
    pub case_height: f64,
    /// Set to `false` to disable drag-to-trash removal.
    #[serde(default = "default_true")]
    pub trash_enabled: bool,
    #[serde(default = "default_trash")]
    pub trash: Rect,
}

/// Where catalog data comes from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// Built-in sample catalog with simulated network delay.
    #[default]
    Mock,
    /// A TOML catalog file at `catalog.path`.
    File,
}

/// Catalog source settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: CatalogSource,
    /// Catalog file; required when `source = "file"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Simulated delay of the mock charm feed.
    #[serde(default = "default_charms_delay_ms")]
    pub charms_delay_ms: u64,
    #[serde(default = "default_phone_models_delay_ms")]
    pub phone_models_delay_ms: u64,
    #[serde(default = "default_colors_delay_ms")]
    pub colors_delay_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_base_price() -> f64 {
    19.99
}
fn default_min_percent() -> f64 {
    10.0
}
fn default_max_percent() -> f64 {
    90.0
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_currency_symbol() -> String {
    "$".to_string()
}
fn default_decimal_separator() -> String {
    ".".to_string()
}
fn default_case_width() -> f64 {
    300.0
}
fn default_case_height() -> f64 {
    600.0
}
fn default_true() -> bool {
    true
}
fn default_trash() -> Rect {
    Rect::new(110.0, 620.0, 80.0, 60.0)
}
fn default_charms_delay_ms() -> u64 {
    800
}
fn default_phone_models_delay_ms() -> u64 {
    600
}
fn default_colors_delay_ms() -> u64 {
    500
}

impl Default for CustomizerConfig {
    fn default() -> Self {
        Self {
            base_price: default_base_price(),
            min_percent: default_min_percent(),
            max_percent: default_max_percent(),
            rotate_modifier: RotateModifier::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            symbol_after: false,
            decimal_separator: default_decimal_separator(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            case_width: default_case_width(),
            case_height: default_case_height(),
            trash_enabled: default_true(),
            trash: default_trash(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::default(),
            path: None,
            charms_delay_ms: default_charms_delay_ms(),
            phone_models_delay_ms: default_phone_models_delay_ms(),
            colors_delay_ms: default_colors_delay_ms(),
        }
    }
}

// ── Conversion into domain settings ───────────────────────────────────────────

impl AppConfig {
    /// Validates the raw values and builds the settings for a new session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BasePrice`], [`ConfigError::Bounds`], or
    /// [`ConfigError::Invalid`] for the first offending value.
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            base_price: Price::from_units(self.customizer.base_price)?,
            bounds: PlacementBounds::new(self.customizer.min_percent, self.customizer.max_percent)?,
            rotate_modifier: self.customizer.rotate_modifier,
            geometry: self.preview.geometry()?,
        })
    }
}

impl PreviewConfig {
    /// Builds the preview geometry with the case anchored at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the case has no area.
    pub fn geometry(&self) -> Result<PreviewGeometry, ConfigError> {
        if !(self.case_width > 0.0 && self.case_height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "preview.case_width/case_height",
                reason: format!("case must have a positive size, got {}x{}", self.case_width, self.case_height),
            });
        }
        Ok(PreviewGeometry {
            case_rect: Rect::new(0.0, 0.0, self.case_width, self.case_height),
            trash_rect: self.trash_enabled.then_some(self.trash),
        })
    }
}

impl DisplayConfig {
    pub fn price_format(&self) -> PriceFormat {
        PriceFormat {
            currency_symbol: self.currency_symbol.clone(),
            symbol_after: self.symbol_after,
            decimal_separator: self.decimal_separator.clone(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from an explicit path.  A missing file yields defaults.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            info!(path = %path.display(), "config loaded");
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file; using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Same as [`save_config`].
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Charmcase"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("charmcase"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("Charmcase"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
