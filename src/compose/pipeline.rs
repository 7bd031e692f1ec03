//! The full render: trim, lay out, mask, shadow, background, composite.

use super::background::render_background;
use super::canvas::{CanvasLayout, layout};
use super::composite::{ComposeError, compose};
use super::mask::{apply_corner_mask, corner_mask};
use super::shadow::render_shadow;
use super::trim::{TrimResult, trim};
use crate::style::{ResolvedStyle, StyleConfig};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};
use log::debug;

/// A finished render plus the decisions that produced it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: RgbaImage,
    /// Content box in source coordinates.
    pub trim: TrimResult,
    pub layout: CanvasLayout,
    /// Style values after clamping against the trimmed content.
    pub style: ResolvedStyle,
}

/// Render `source` with `style`.
///
/// Deterministic: the same inputs always give byte-identical output.
pub fn render(source: &RgbaImage, style: &StyleConfig) -> Result<RgbaImage, ComposeError> {
    render_detailed(source, style).map(|r| r.image)
}

/// Like [`render`], also reporting the trim box, layout and resolved style.
pub fn render_detailed(source: &RgbaImage, style: &StyleConfig) -> Result<Rendered, ComposeError> {
    let (src_w, src_h) = source.dimensions();
    let trim = trim(source, &style.inset, &style.trim);
    debug!(
        "trim {}x{} -> [{}, {}, {}, {}]",
        src_w, src_h, trim.left, trim.top, trim.right, trim.bottom
    );

    let content = if trim.is_full(src_w, src_h) {
        source.clone()
    } else {
        imageops::crop_imm(source, trim.left, trim.top, trim.width(), trim.height()).to_image()
    };
    let trimmed = content.dimensions();

    let padding = style.resolve(trimmed).padding;
    let layout = layout(trimmed, padding, &style.output);
    let content = if layout.content_size == trimmed {
        content
    } else {
        let (w, h) = layout.content_size;
        debug!("scaling content {:?} -> {}x{}", trimmed, w, h);
        imageops::resize(&content, w, h, FilterType::Lanczos3)
    };
    let (content_w, content_h) = layout.content_size;

    // Radius is capped against the size the content is drawn at.
    let resolved = style.resolve(layout.content_size);
    debug!(
        "canvas {}x{}, content at {:?}, radius {}",
        layout.width, layout.height, layout.content_origin, resolved.radius
    );

    let mask = corner_mask(content_w, content_h, resolved.radius);
    let content = apply_corner_mask(&content, &mask);
    let silhouette = GrayImage::from_fn(content_w, content_h, |x, y| {
        Luma([content.get_pixel(x, y)[3]])
    });

    let origin = (
        layout.content_origin.0 as i64,
        layout.content_origin.1 as i64,
    );
    let (background, shadow) = rayon::join(
        || render_background(layout.width, layout.height, &style.background),
        || render_shadow(&silhouette, origin, &resolved.shadow, layout.dimensions()),
    );
    debug!("layers ready, compositing");

    let image = compose(&shadow, &background, &content, layout.content_origin)?;
    Ok(Rendered {
        image,
        trim,
        layout,
        style: resolved,
    })
}
