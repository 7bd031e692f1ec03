//! Rounded-corner alpha mask.
//!
//! Coverage of each pixel is estimated from the distance between its centre
//! and the corner circle's centre: `clamp(radius - d + 0.5, 0, 1)`. That is a
//! one-pixel linear ramp across the arc, enough to hide the staircase without
//! supersampling.

use image::{GrayImage, Luma, RgbaImage};

/// Build a `width`×`height` coverage mask with corners rounded to `radius`.
///
/// 255 is fully inside, 0 fully outside. The radius is clamped to half the
/// shorter side; a radius of 0 yields an all-255 mask.
pub fn corner_mask(width: u32, height: u32, radius: f32) -> GrayImage {
    let max_radius = width.min(height) as f32 / 2.0;
    let radius = if radius.is_finite() {
        radius.clamp(0.0, max_radius)
    } else {
        0.0
    };
    let mut mask = GrayImage::from_pixel(width, height, Luma([255]));
    if radius <= 0.0 {
        return mask;
    }

    // Only pixels within `radius` of a corner can be affected.
    let band = radius.ceil() as u32;
    let (w, h) = (width as f32, height as f32);
    for y in 0..height {
        let in_row_band = y < band || y >= height.saturating_sub(band);
        if !in_row_band {
            continue;
        }
        for x in (0..width).filter(|&x| x < band || x >= width.saturating_sub(band)) {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            // Nearest corner circle centre.
            let cx = if px < w / 2.0 { radius } else { w - radius };
            let cy = if py < h / 2.0 { radius } else { h - radius };
            let outside_x = if px < w / 2.0 { px < cx } else { px > cx };
            let outside_y = if py < h / 2.0 { py < cy } else { py > cy };
            if !(outside_x && outside_y) {
                continue;
            }
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
            mask.put_pixel(x, y, Luma([(coverage * 255.0).round() as u8]));
        }
    }
    mask
}

/// Multiply `content`'s alpha by `mask`. Colour channels are untouched.
///
/// Both images must have the same dimensions; extra pixels on either side are
/// ignored.
pub fn apply_corner_mask(content: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    let mut out = content.clone();
    for (p, m) in out.pixels_mut().zip(mask.pixels()) {
        p[3] = ((p[3] as u32 * m[0] as u32 + 127) / 255) as u8;
    }
    out
}
