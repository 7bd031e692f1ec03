//! Style types consumed by the composition pipeline.
//!
//! A [`StyleConfig`] describes *what* the final image should look like:
//! padding, corner radius, background, shadow, how the source is trimmed and
//! the shape of the output canvas. It is plain data, deserialized from the
//! `[style]` section of `config.toml` (see [`config`](crate::config)) or built
//! directly by callers.
//!
//! ## Sum types, not optional fields
//!
//! The background ([`BackgroundSpec`]), inset mode ([`InsetMode`]) and output
//! shape ([`OutputShape`]) are tagged enums. Every consuming stage matches on
//! them exhaustively, so adding a variant is a compile error everywhere it
//! needs handling.
//!
//! ## Clamping
//!
//! Range values are stored as the user gave them. [`StyleConfig::resolve`]
//! clamps them against the *trimmed* content size right before rendering. A
//! cosmetic tool should never refuse to render because a slider went one
//! pixel too far.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound for padding on each side, in pixels.
pub const MAX_PADDING: u32 = 4096;

/// Upper bound for the shadow blur radius, in pixels.
pub const MAX_BLUR: f32 = 256.0;

/// Upper bound for either side of an [`OutputShape::Size`] canvas, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 16384;

/// Upper bound for either component of an [`OutputShape::Ratio`].
pub const MAX_RATIO_COMPONENT: u32 = 100;

/// An 8-bit straight-alpha RGBA color.
///
/// Serialized as a hex string: `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    /// Same color with alpha forced to 255.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color '{0}': expected #RGB, #RRGGBB or #RRGGBBAA")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        match hex.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

/// A gradient color stop. `position` runs from 0.0 (start) to 1.0 (end).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorStop {
    pub position: f32,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Spread `colors` evenly over 0..1.
pub fn evenly_spaced(colors: &[Color]) -> Vec<ColorStop> {
    let last = colors.len().saturating_sub(1).max(1) as f32;
    colors
        .iter()
        .enumerate()
        .map(|(i, &color)| ColorStop::new(i as f32 / last, color))
        .collect()
}

/// Background layer description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum BackgroundSpec {
    /// Flat fill; alpha is forced to 255.
    Solid { color: Color },
    /// Linear gradient. `angle` is in degrees: 0 runs left to right and the
    /// angle increases clockwise, so 90 runs top to bottom.
    Gradient { stops: Vec<ColorStop>, angle: f32 },
    /// Radial gradient from the canvas centre outwards.
    Radial { stops: Vec<ColorStop> },
    /// One of the built-in presets in [`presets`](crate::presets).
    Preset { name: String },
    /// An image file scaled to cover the canvas and centre-cropped.
    Image { path: PathBuf },
}

impl BackgroundSpec {
    pub fn solid(color: Color) -> Self {
        Self::Solid { color }
    }

    pub fn preset(name: &str) -> Self {
        Self::Preset {
            name: name.to_string(),
        }
    }
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self::preset("sky")
    }
}

/// Drop shadow description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowSpec {
    /// Horizontal offset in pixels (positive = right).
    pub offset_x: i32,
    /// Vertical offset in pixels (positive = down).
    pub offset_y: i32,
    /// Blur radius in pixels. 0 gives a hard edge.
    pub blur: f32,
    /// 0.0 (invisible) to 1.0.
    pub opacity: f32,
    pub color: Color,
}

impl Default for ShadowSpec {
    fn default() -> Self {
        Self {
            offset_x: 0,
            offset_y: 18,
            blur: 28.0,
            opacity: 0.35,
            color: Color::BLACK,
        }
    }
}

/// Per-edge margins, in source pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margins {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Margins {
    pub fn uniform(px: u32) -> Self {
        Self {
            left: px,
            top: px,
            right: px,
            bottom: px,
        }
    }
}

/// How the source image is trimmed before composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InsetMode {
    /// Detect and remove uniform borders.
    #[default]
    Auto,
    /// Remove fixed margins.
    Manual(Margins),
    /// Use the source as-is.
    None,
}

/// Policy constants for [`InsetMode::Auto`].
///
/// The scan algorithm is fixed; these numbers are tuned against the kind of
/// chrome found around real screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimPolicy {
    /// Maximum colour variance (sum over RGBA channels) of a row that still
    /// counts as uniform.
    pub variance_threshold: f32,
    /// Maximum per-channel distance between a row's mean colour and the
    /// outermost row's mean colour.
    pub tolerance: f32,
    /// Remove transparent margins (window shadows) before the colour scan.
    pub strip_transparent: bool,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            variance_threshold: 64.0,
            tolerance: 16.0,
            strip_transparent: true,
        }
    }
}

/// Shape of the output canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
pub enum OutputShape {
    /// Content plus padding on every side.
    #[default]
    Auto,
    /// Grow the canvas until it matches `width:height`; content is centred.
    Ratio { width: u32, height: u32 },
    /// Fixed canvas in pixels. Content that does not fit inside the padding
    /// is scaled down; content is centred.
    Size { width: u32, height: u32 },
    /// Fixed canvas of a social platform's image size, see
    /// [`presets::platforms`](crate::presets::platforms).
    Platform { name: String },
}

/// Everything the pipeline needs to know about how to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Space between the content and the canvas edge, in pixels.
    pub padding: i32,
    /// Corner radius of the content, in pixels.
    pub radius: f32,
    pub background: BackgroundSpec,
    pub shadow: ShadowSpec,
    pub inset: InsetMode,
    pub trim: TrimPolicy,
    pub output: OutputShape,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            padding: 120,
            radius: 18.0,
            background: BackgroundSpec::default(),
            shadow: ShadowSpec::default(),
            inset: InsetMode::default(),
            trim: TrimPolicy::default(),
            output: OutputShape::default(),
        }
    }
}

/// Shadow parameters after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedShadow {
    pub offset_x: i32,
    pub offset_y: i32,
    pub blur: f32,
    pub opacity: f32,
    pub color: Color,
}

impl ResolvedShadow {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && self.color.a > 0
    }
}

/// The numeric part of a [`StyleConfig`] clamped against a content size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub padding: u32,
    pub radius: f32,
    pub shadow: ResolvedShadow,
}

/// `NaN` and infinities become `fallback`, everything else is clamped.
fn finite_clamp(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl StyleConfig {
    /// Clamp padding, radius, blur and opacity for content of the given
    /// (trimmed) size.
    pub fn resolve(&self, content: (u32, u32)) -> ResolvedStyle {
        let padding = self.padding.clamp(0, MAX_PADDING as i32) as u32;
        let max_radius = content.0.min(content.1) as f32 / 2.0;
        ResolvedStyle {
            padding,
            radius: finite_clamp(self.radius, 0.0, max_radius, 0.0),
            shadow: ResolvedShadow {
                offset_x: self.shadow.offset_x,
                offset_y: self.shadow.offset_y,
                blur: finite_clamp(self.shadow.blur, 0.0, MAX_BLUR, 0.0),
                opacity: finite_clamp(self.shadow.opacity, 0.0, 1.0, 0.0),
                color: self.shadow.color,
            },
        }
    }
}
