//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every screenshot is shown by its file name first, with the decisions the
//! pipeline took (trim box, canvas, cache status) as indented context lines.
//! Paths are shown as file names; the full path only appears where the user
//! has to act on it.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! shot.png (1920x1080)
//!     Trim: 20,20 → 1880x1040
//!     Canvas: 2120x1280, content at 120,120
//!     Output: shot-composed.png
//! ```
//!
//! ## Batch
//!
//! ```text
//! Rendering 3 screenshots
//! 001 a.png → a-composed.png (cached)
//! 002 b.png → b-composed.png (rendered)
//! 003 c.png: failed
//!     Error: Failed to decode c.png: ...
//!
//! 2 composed, 1 failed
//! Cache: 1 cached, 1 rendered (2 total)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::batch::{BatchEvent, BatchResult, RenderStatus};
use crate::compose::Rendered;
use crate::config::Config;
use crate::presets;
use crate::style::{BackgroundSpec, InsetMode, OutputShape};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Render
// ============================================================================

/// Format the result of a single render.
///
/// `destination` is `None` when the PNG went to stdout.
pub fn format_render_output(
    source: &Path,
    source_size: (u32, u32),
    rendered: &Rendered,
    destination: Option<&Path>,
) -> Vec<String> {
    let (w, h) = source_size;
    let mut lines = vec![format!("{} ({}x{})", file_name(source), w, h)];

    if rendered.trim.is_full(w, h) {
        lines.push("    Trim: none".to_string());
    } else {
        lines.push(format!(
            "    Trim: {},{} \u{2192} {}x{}",
            rendered.trim.left,
            rendered.trim.top,
            rendered.trim.width(),
            rendered.trim.height()
        ));
    }

    let (ox, oy) = rendered.layout.content_origin;
    lines.push(format!(
        "    Canvas: {}x{}, content at {},{}",
        rendered.layout.width, rendered.layout.height, ox, oy
    ));

    let output = match destination {
        Some(path) => file_name(path),
        None => "(stdout)".to_string(),
    };
    lines.push(format!("    Output: {output}"));
    lines
}

/// Print render output to stderr, leaving stdout free for piped image data.
pub fn print_render_output(
    source: &Path,
    source_size: (u32, u32),
    rendered: &Rendered,
    destination: Option<&Path>,
) {
    for line in format_render_output(source, source_size, rendered, destination) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { image_count } => {
            vec![format!("Rendering {}", plural(*image_count, "screenshot"))]
        }
        BatchEvent::ImageDone {
            index,
            source,
            output,
            status,
        } => {
            let status = match status {
                RenderStatus::Cached => "cached",
                RenderStatus::Copied => "copied",
                RenderStatus::Rendered => "rendered",
            };
            vec![format!(
                "{} {} \u{2192} {} ({})",
                format_index(*index),
                file_name(source),
                file_name(output),
                status
            )]
        }
        BatchEvent::ImageFailed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}: failed", format_index(*index), file_name(source)),
            format!("    Error: {error}"),
        ],
    }
}

/// Format the closing summary of a batch run.
pub fn format_batch_summary(result: &BatchResult) -> Vec<String> {
    let mut summary = format!("{} composed", result.outputs.len());
    if !result.failures.is_empty() {
        summary.push_str(&format!(", {} failed", result.failures.len()));
    }
    vec![
        String::new(),
        summary,
        format!("Cache: {}", result.cache_stats),
    ]
}

pub fn print_batch_summary(result: &BatchResult) {
    for line in format_batch_summary(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets and config
// ============================================================================

/// One line per built-in background preset, then one per platform size.
///
/// ```text
/// sky        Sky        linear 135° #4a90d9 → #1e3a5f
/// ...
///
/// Platforms
/// twitter    Twitter    1200x675
/// ```
pub fn format_presets() -> Vec<String> {
    let mut lines: Vec<String> = presets::all()
        .iter()
        .map(|p| format!("{:<10} {:<10} {}", p.name, p.label, p.describe()))
        .collect();
    lines.push(String::new());
    lines.push("Platforms".to_string());
    lines.extend(
        presets::platforms()
            .iter()
            .map(|p| format!("{:<10} {:<10} {}x{}", p.name, p.label, p.width, p.height)),
    );
    lines
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

fn describe_background(background: &BackgroundSpec) -> String {
    match background {
        BackgroundSpec::Solid { color } => format!("solid {color}"),
        BackgroundSpec::Gradient { stops, angle } => {
            format!("gradient {angle}°, {}", plural(stops.len(), "stop"))
        }
        BackgroundSpec::Radial { stops } => format!("radial, {}", plural(stops.len(), "stop")),
        BackgroundSpec::Preset { name } => format!("preset {name}"),
        BackgroundSpec::Image { path } => format!("image {}", path.display()),
    }
}

/// Summary of an effective configuration, for `check-config`.
pub fn format_config_summary(config: &Config) -> Vec<String> {
    let style = &config.style;
    let inset = match style.inset {
        InsetMode::Auto => "auto".to_string(),
        InsetMode::Manual(m) => format!("manual {},{},{},{}", m.left, m.top, m.right, m.bottom),
        InsetMode::None => "none".to_string(),
    };
    let output = match &style.output {
        OutputShape::Auto => "auto".to_string(),
        OutputShape::Ratio { width, height } => format!("ratio {width}:{height}"),
        OutputShape::Size { width, height } => format!("{width}x{height}"),
        OutputShape::Platform { name } => format!("platform {name}"),
    };
    let threads = match config.processing.max_processes {
        Some(n) => n.to_string(),
        None => "auto".to_string(),
    };
    vec![
        "Style".to_string(),
        format!("    Padding: {}px", style.padding),
        format!("    Radius: {}px", style.radius),
        format!("    Background: {}", describe_background(&style.background)),
        format!(
            "    Shadow: offset {},{}, blur {}px, opacity {}, {}",
            style.shadow.offset_x,
            style.shadow.offset_y,
            style.shadow.blur,
            style.shadow.opacity,
            style.shadow.color
        ),
        format!("    Inset: {inset}"),
        format!("    Output: {output}"),
        "Processing".to_string(),
        format!("    Max processes: {threads}"),
    ]
}

pub fn print_config_summary(config: &Config) {
    for line in format_config_summary(config) {
        println!("{}", line);
    }
}
