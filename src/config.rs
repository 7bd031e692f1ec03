//! Configuration loading.
//!
//! Handles loading, validating, and merging `config.toml`. Settings are
//! layered, each layer overriding only the keys it sets:
//!
//! ```text
//! stock defaults                        (compiled in)
//!   └─ $XDG_CONFIG_HOME/composure/config.toml   (or --config FILE)
//!        └─ preset file                 (--preset FILE, a bare [style] table)
//!             └─ command-line flags     (applied by the binary)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [style]
//! padding = 120             # pixels on every side
//! radius = 18.0             # corner radius in pixels
//!
//! [style.background]
//! kind = "preset"           # "solid" | "gradient" | "radial" | "preset" | "image"
//! name = "sky"
//!
//! [style.shadow]
//! offset_x = 0
//! offset_y = 18
//! blur = 28.0
//! opacity = 0.35
//! color = "#000000"
//!
//! [style.inset]
//! mode = "auto"             # "auto" | "manual" | "none"
//!
//! [style.output]
//! mode = "auto"             # "auto" | "ratio" | "size" | "platform"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Tagged tables
//!
//! `background`, `inset` and `output` are tagged by `kind` or `mode`. An
//! overlay that switches the tag replaces the whole table instead of merging
//! into it, so switching the background from a preset to a solid colour does
//! not drag the preset's `name` along:
//!
//! ```toml
//! [style.background]
//! kind = "solid"
//! color = "#f9fafb"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::presets;
use crate::style::{
    BackgroundSpec, ColorStop, MAX_CANVAS_SIDE, MAX_RATIO_COMPONENT, OutputShape, StyleConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keys that select the variant of a tagged table.
const TAG_KEYS: &[&str] = &["kind", "mode"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything `config.toml` can hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub style: StyleConfig,
    pub processing: ProcessingConfig,
}

impl Config {
    /// Reject settings that cannot be clamped into something sensible.
    ///
    /// Range values (padding, radius, blur, opacity) are not checked here;
    /// [`StyleConfig::resolve`] clamps those at render time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_background("style.background", &self.style.background)?;
        validate_output(&self.style.output)
    }
}

fn validate_output(output: &OutputShape) -> Result<(), ConfigError> {
    match output {
        OutputShape::Auto => Ok(()),
        OutputShape::Ratio { width, height } => {
            if *width == 0 || *height == 0 {
                return Err(ConfigError::Validation(
                    "style.output ratio values must be non-zero".into(),
                ));
            }
            if *width > MAX_RATIO_COMPONENT || *height > MAX_RATIO_COMPONENT {
                return Err(ConfigError::Validation(format!(
                    "style.output ratio values must be at most {MAX_RATIO_COMPONENT}, got {width}:{height}"
                )));
            }
            Ok(())
        }
        OutputShape::Size { width, height } => {
            let valid = 1..=MAX_CANVAS_SIDE;
            if valid.contains(width) && valid.contains(height) {
                Ok(())
            } else {
                Err(ConfigError::Validation(format!(
                    "style.output size must be 1-{MAX_CANVAS_SIDE} on each side, got {width}x{height}"
                )))
            }
        }
        OutputShape::Platform { name } => {
            if presets::find_platform(name).is_some() {
                Ok(())
            } else {
                let known: Vec<&str> = presets::platforms().iter().map(|p| p.name).collect();
                Err(ConfigError::Validation(format!(
                    "style.output: unknown platform '{name}' (known: {})",
                    known.join(", ")
                )))
            }
        }
    }
}

fn validate_background(key: &str, background: &BackgroundSpec) -> Result<(), ConfigError> {
    match background {
        BackgroundSpec::Solid { .. } => Ok(()),
        BackgroundSpec::Gradient { stops, .. } | BackgroundSpec::Radial { stops } => {
            validate_stops(key, stops)
        }
        BackgroundSpec::Preset { name } => {
            if presets::find(name).is_some() {
                Ok(())
            } else {
                let known: Vec<&str> = presets::all().iter().map(|p| p.name).collect();
                Err(ConfigError::Validation(format!(
                    "{key}: unknown preset '{name}' (known: {})",
                    known.join(", ")
                )))
            }
        }
        BackgroundSpec::Image { path } => {
            if path.is_file() {
                Ok(())
            } else {
                Err(ConfigError::Validation(format!(
                    "{key}: background image {} does not exist",
                    path.display()
                )))
            }
        }
    }
}

fn validate_stops(key: &str, stops: &[ColorStop]) -> Result<(), ConfigError> {
    if stops.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{key}.stops must not be empty"
        )));
    }
    if let Some(bad) = stops
        .iter()
        .find(|s| !(0.0..=1.0).contains(&s.position))
    {
        return Err(ConfigError::Validation(format!(
            "{key}.stops positions must be within 0.0-1.0, got {}",
            bad.position
        )));
    }
    Ok(())
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Loading and merging
// =============================================================================

/// `$XDG_CONFIG_HOME/composure/config.toml`, or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("composure").join("config.toml"))
}

/// The stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - A table whose `kind`/`mode` tag differs from the base's replaces it.
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            let switches_variant = TAG_KEYS.iter().any(|tag| {
                matches!(
                    (base_table.get(*tag), overlay_table.get(*tag)),
                    (Some(old), Some(new)) if old != new
                )
            });
            if switches_variant {
                return toml::Value::Table(overlay_table);
            }
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a TOML file as a raw value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Merge overlays in order onto `base`, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the layered configuration.
///
/// `config_file` overrides the default location; unlike the default file it
/// must exist. `preset_file` holds the contents of a `[style]` table and is
/// applied on top.
pub fn load_config(
    config_file: Option<&Path>,
    preset_file: Option<&Path>,
) -> Result<Config, ConfigError> {
    let mut overlays = Vec::new();

    let user = match config_file {
        Some(path) => Some(read_required(path)?),
        None => match default_config_path() {
            Some(path) => load_raw_config(&path)?,
            None => None,
        },
    };
    overlays.extend(user);

    if let Some(path) = preset_file {
        let style = read_required(path)?;
        let mut table = toml::Table::new();
        table.insert("style".to_string(), style);
        overlays.push(toml::Value::Table(table));
    }

    resolve_config(stock_defaults_value()?, overlays)
}

fn read_required(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Composure Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Default location: $XDG_CONFIG_HOME/composure/config.toml
# (usually ~/.config/composure/config.toml). Override with --config FILE.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Style
# ---------------------------------------------------------------------------
[style]
# Space between the screenshot and the canvas edge, in pixels (0-4096).
padding = 120

# Corner radius in pixels. Capped at half the shorter side of the trimmed
# screenshot, where the corners become a full circle.
radius = 18.0

# Background behind the screenshot. One of:
#   kind = "solid",    color = "#RRGGBB"
#   kind = "gradient", angle = <degrees, 0 = left to right, 90 = top to bottom>,
#                      stops = [{ position = 0.0, color = "#..." }, ...]
#   kind = "radial",   stops = [...]   (centre outwards)
#   kind = "preset",   name = "sky"    (see `composure presets`)
#   kind = "image",    path = "wallpaper.jpg"
#                      (scaled to cover the canvas, centre-cropped;
#                       relative paths resolve from the working directory)
[style.background]
kind = "preset"
name = "sky"

# Drop shadow under the screenshot.
[style.shadow]
offset_x = 0
offset_y = 18
# Blur radius in pixels (0 = hard edge, max 256).
blur = 28.0
# 0.0 = no shadow, 1.0 = full strength.
opacity = 0.35
color = "#000000"

# How the screenshot is trimmed before composing:
#   mode = "auto"    detect and remove uniform borders and transparent margins
#   mode = "manual"  remove fixed margins: left, top, right, bottom
#   mode = "none"    use the screenshot as-is
[style.inset]
mode = "auto"

# Tuning for mode = "auto".
[style.trim]
# Maximum colour variance of a row or column that still counts as border.
variance_threshold = 64.0
# Maximum per-channel distance from the outermost row's colour.
tolerance = 16.0
# Remove transparent margins (window shadows) first.
strip_transparent = true

# Canvas shape:
#   mode = "auto"                              screenshot plus padding
#   mode = "ratio", width = 16, height = 9     grow the canvas to this ratio
#                                              (each value 1-100)
#   mode = "size", width = 1920, height = 1080 fixed canvas in pixels (max 16384)
#   mode = "platform", name = "twitter"        fixed canvas for a social platform
#                                              (see `composure presets`)
# Fixed canvases centre the screenshot, shrinking it to fit inside the
# padding when needed.
[style.output]
mode = "auto"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers for `composure batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
