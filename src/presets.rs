//! Built-in background presets.
//!
//! | Name | Kind | Colors |
//! |---|---|---|
//! | `sky` | linear, 135° | `#4A90D9` → `#1E3A5F` |
//! | `sunset` | radial | `#FF6B6B` → `#4A154B` |
//! | `ocean` | linear, 135° | `#00A99D` → `#1A4068` |
//! | `forest` | linear, 180° | `#2D5016` → `#0F2027` |
//! | `lavender` | linear, 135° | `#667EEA` → `#764BA2` |
//! | `midnight` | linear, 180° | `#0F2027` → `#203A43` |
//! | `slate` | solid | `#374151` |
//! | `snow` | solid | `#F9FAFB` |
//!
//! Also the canvas sizes behind [`OutputShape::Platform`](crate::style::OutputShape::Platform):
//!
//! | Name | Size |
//! |---|---|
//! | `twitter` | 1200×675 |
//! | `facebook` | 1200×630 |
//! | `instagram` | 1080×1080 |
//! | `linkedin` | 1200×627 |
//! | `youtube` | 1280×720 |
//! | `pinterest` | 1000×1500 |
//! | `reddit` | 1200×628 |
//! | `snapchat` | 1080×1920 |

use crate::style::{BackgroundSpec, Color, evenly_spaced};

/// Preset used when a name is unknown.
pub const FALLBACK_PRESET: &str = "sky";

/// A named background preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub label: &'static str,
    kind: PresetKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PresetKind {
    Solid(Color),
    Linear { from: Color, to: Color, angle: f32 },
    Radial { inner: Color, outer: Color },
}

const PRESETS: &[Preset] = &[
    Preset {
        name: "sky",
        label: "Sky",
        kind: PresetKind::Linear {
            from: Color::rgb(0x4a, 0x90, 0xd9),
            to: Color::rgb(0x1e, 0x3a, 0x5f),
            angle: 135.0,
        },
    },
    Preset {
        name: "sunset",
        label: "Sunset",
        kind: PresetKind::Radial {
            inner: Color::rgb(0xff, 0x6b, 0x6b),
            outer: Color::rgb(0x4a, 0x15, 0x4b),
        },
    },
    Preset {
        name: "ocean",
        label: "Ocean",
        kind: PresetKind::Linear {
            from: Color::rgb(0x00, 0xa9, 0x9d),
            to: Color::rgb(0x1a, 0x40, 0x68),
            angle: 135.0,
        },
    },
    Preset {
        name: "forest",
        label: "Forest",
        kind: PresetKind::Linear {
            from: Color::rgb(0x2d, 0x50, 0x16),
            to: Color::rgb(0x0f, 0x20, 0x27),
            angle: 180.0,
        },
    },
    Preset {
        name: "lavender",
        label: "Lavender",
        kind: PresetKind::Linear {
            from: Color::rgb(0x66, 0x7e, 0xea),
            to: Color::rgb(0x76, 0x4b, 0xa2),
            angle: 135.0,
        },
    },
    Preset {
        name: "midnight",
        label: "Midnight",
        kind: PresetKind::Linear {
            from: Color::rgb(0x0f, 0x20, 0x27),
            to: Color::rgb(0x20, 0x3a, 0x43),
            angle: 180.0,
        },
    },
    Preset {
        name: "slate",
        label: "Slate",
        kind: PresetKind::Solid(Color::rgb(0x37, 0x41, 0x51)),
    },
    Preset {
        name: "snow",
        label: "Snow",
        kind: PresetKind::Solid(Color::rgb(0xf9, 0xfa, 0xfb)),
    },
];

impl Preset {
    /// The concrete background this preset stands for.
    pub fn background(&self) -> BackgroundSpec {
        match self.kind {
            PresetKind::Solid(color) => BackgroundSpec::Solid { color },
            PresetKind::Linear { from, to, angle } => BackgroundSpec::Gradient {
                stops: evenly_spaced(&[from, to]),
                angle,
            },
            PresetKind::Radial { inner, outer } => BackgroundSpec::Radial {
                stops: evenly_spaced(&[inner, outer]),
            },
        }
    }

    /// Short human description, e.g. `linear 135° #4a90d9 → #1e3a5f`.
    pub fn describe(&self) -> String {
        match self.kind {
            PresetKind::Solid(color) => format!("solid {color}"),
            PresetKind::Linear { from, to, angle } => {
                format!("linear {angle}° {from} → {to}")
            }
            PresetKind::Radial { inner, outer } => format!("radial {inner} → {outer}"),
        }
    }
}

/// All presets, in display order.
pub fn all() -> &'static [Preset] {
    PRESETS
}

/// Look up a preset by name (case-insensitive).
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// A named output canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub name: &'static str,
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

const PLATFORMS: &[Platform] = &[
    Platform {
        name: "twitter",
        label: "Twitter",
        width: 1200,
        height: 675,
    },
    Platform {
        name: "facebook",
        label: "Facebook",
        width: 1200,
        height: 630,
    },
    Platform {
        name: "instagram",
        label: "Instagram",
        width: 1080,
        height: 1080,
    },
    Platform {
        name: "linkedin",
        label: "LinkedIn",
        width: 1200,
        height: 627,
    },
    Platform {
        name: "youtube",
        label: "YouTube",
        width: 1280,
        height: 720,
    },
    Platform {
        name: "pinterest",
        label: "Pinterest",
        width: 1000,
        height: 1500,
    },
    Platform {
        name: "reddit",
        label: "Reddit",
        width: 1200,
        height: 628,
    },
    Platform {
        name: "snapchat",
        label: "Snapchat",
        width: 1080,
        height: 1920,
    },
];

/// All platform sizes, in display order.
pub fn platforms() -> &'static [Platform] {
    PLATFORMS
}

/// Look up a platform size by name (case-insensitive).
pub fn find_platform(name: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
