//! Background layer rendering.
//!
//! The background is always fully opaque and canvas-sized. Gradients are
//! evaluated per pixel centre; rows are filled in parallel, each pixel
//! depending only on its own coordinates, so the output is identical to a
//! sequential fill.
//!
//! Image backgrounds are scaled to cover the canvas, centre-cropped and
//! flattened onto [`IMAGE_FALLBACK`]. An image that cannot be read renders as
//! that colour alone.

use super::composite::blend_over;
use crate::presets;
use crate::style::{BackgroundSpec, Color, ColorStop};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::warn;
use rayon::prelude::*;
use std::path::Path;

/// Stops closer than this are treated as a hard colour boundary.
pub const STOP_EPSILON: f32 = 1e-4;

/// Radius of a radial gradient as a fraction of the canvas' longer side.
const RADIAL_EXTENT: f32 = 0.7;

/// Shown behind translucent image backgrounds and in place of unreadable ones.
pub const IMAGE_FALLBACK: Color = Color::rgb(51, 51, 56);

/// Render `spec` at `width`×`height`.
pub fn render_background(width: u32, height: u32, spec: &BackgroundSpec) -> RgbaImage {
    match spec {
        BackgroundSpec::Solid { color } => {
            RgbaImage::from_pixel(width, height, color.opaque().to_rgba())
        }
        BackgroundSpec::Gradient { stops, angle } => {
            let stops = sorted(stops);
            if let [only] = stops.as_slice() {
                return RgbaImage::from_pixel(width, height, only.color.opaque().to_rgba());
            }
            let axis = LinearAxis::new(width, height, *angle);
            fill(width, height, |x, y| sample_stops(&stops, axis.t(x, y)))
        }
        BackgroundSpec::Radial { stops } => {
            let stops = sorted(stops);
            if let [only] = stops.as_slice() {
                return RgbaImage::from_pixel(width, height, only.color.opaque().to_rgba());
            }
            let cx = width as f32 / 2.0;
            let cy = height as f32 / 2.0;
            let extent = width.max(height) as f32 * RADIAL_EXTENT;
            fill(width, height, |x, y| {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let t = if extent > 0.0 {
                    (dx * dx + dy * dy).sqrt() / extent
                } else {
                    0.0
                };
                sample_stops(&stops, t)
            })
        }
        BackgroundSpec::Preset { name } => {
            render_background(width, height, &preset_background(name))
        }
        BackgroundSpec::Image { path } => image_background(width, height, path),
    }
}

fn image_background(width: u32, height: u32, path: &Path) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, IMAGE_FALLBACK.to_rgba());
    if width == 0 || height == 0 {
        return canvas;
    }
    let source = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            warn!("Cannot read background image {}: {e}", path.display());
            return canvas;
        }
    };
    let Some(cover) = cover_fill(&source, width, height) else {
        warn!("Background image {} is empty", path.display());
        return canvas;
    };
    for (dst, src) in canvas.pixels_mut().zip(cover.pixels()) {
        let mut px = blend_over(*dst, *src);
        px[3] = 255;
        *dst = px;
    }
    canvas
}

/// Scale `source` to cover `width`×`height` and crop the overflow evenly.
fn cover_fill(source: &RgbaImage, width: u32, height: u32) -> Option<RgbaImage> {
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 {
        return None;
    }
    let scale = (width as f64 / sw as f64).max(height as f64 / sh as f64);
    let scaled_w = ((sw as f64 * scale).ceil() as u32).max(width);
    let scaled_h = ((sh as f64 * scale).ceil() as u32).max(height);
    let scaled = if (scaled_w, scaled_h) == (sw, sh) {
        source.clone()
    } else {
        imageops::resize(source, scaled_w, scaled_h, FilterType::Lanczos3)
    };
    let x = (scaled_w - width) / 2;
    let y = (scaled_h - height) / 2;
    Some(imageops::crop_imm(&scaled, x, y, width, height).to_image())
}

/// Expand a preset name, falling back to the default preset.
fn preset_background(name: &str) -> BackgroundSpec {
    match presets::find(name) {
        Some(preset) => preset.background(),
        None => {
            warn!(
                "Unknown background preset '{name}', using '{}'",
                presets::FALLBACK_PRESET
            );
            presets::find(presets::FALLBACK_PRESET)
                .map(|p| p.background())
                .unwrap_or(BackgroundSpec::Solid {
                    color: Color::BLACK,
                })
        }
    }
}

/// Colour of a gradient at position `t` (0.0 = first stop, 1.0 = last).
///
/// Stops may be given in any order.
pub fn gradient_color_at(stops: &[ColorStop], t: f32) -> Color {
    sample_stops(&sorted(stops), t)
}

fn sorted(stops: &[ColorStop]) -> Vec<ColorStop> {
    let mut stops = stops.to_vec();
    stops.sort_by(|a, b| {
        a.position
            .partial_cmp(&b.position)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stops
}

/// Interpolate between the stops bracketing `t`. `stops` must be sorted.
fn sample_stops(stops: &[ColorStop], t: f32) -> Color {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Color::BLACK,
    };
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t <= first.position {
        return first.color;
    }
    if t >= last.position {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t > b.position {
            continue;
        }
        let span = b.position - a.position;
        if span < STOP_EPSILON {
            return b.color;
        }
        return lerp(a.color, b.color, (t - a.position) / span);
    }
    last.color
}

fn lerp(a: Color, b: Color, t: f32) -> Color {
    let mix = |from: u8, to: u8| {
        (from as f32 + (to as f32 - from as f32) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Color::rgba(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

/// Projection of pixel centres onto a gradient axis through the canvas centre.
struct LinearAxis {
    cx: f32,
    cy: f32,
    dx: f32,
    dy: f32,
    extent: f32,
}

impl LinearAxis {
    fn new(width: u32, height: u32, angle_deg: f32) -> Self {
        let angle = if angle_deg.is_finite() {
            angle_deg.to_radians()
        } else {
            0.0
        };
        // Image y grows downwards, so a positive angle turns clockwise.
        let (dy, dx) = angle.sin_cos();
        let (w, h) = (width as f32, height as f32);
        Self {
            cx: w / 2.0,
            cy: h / 2.0,
            dx,
            dy,
            extent: (w * dx).abs() + (h * dy).abs(),
        }
    }

    fn t(&self, x: u32, y: u32) -> f32 {
        if self.extent <= 0.0 {
            return 0.0;
        }
        let px = x as f32 + 0.5 - self.cx;
        let py = y as f32 + 0.5 - self.cy;
        (px * self.dx + py * self.dy) / self.extent + 0.5
    }
}

/// Fill a new opaque image row by row.
fn fill(width: u32, height: u32, color: impl Fn(u32, u32) -> Color + Sync) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return img;
    }
    let row_len = width as usize * 4;
    let raw: &mut [u8] = &mut img;
    raw.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let c = color(x as u32, y as u32);
                px.copy_from_slice(&[c.r, c.g, c.b, 255]);
            }
        });
    img
}
