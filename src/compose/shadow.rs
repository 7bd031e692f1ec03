//! Drop shadow layer.
//!
//! The shadow is the content's silhouette (its alpha after corner masking),
//! shifted by the shadow offset, blurred with a Gaussian of σ = blur / 2 and
//! tinted with the shadow colour. Anything that falls outside the canvas is
//! dropped before blurring, so the canvas edge behaves as zero alpha.
//!
//! Only the region the blur can reach is processed: the silhouette's box grown
//! by the kernel radius and clipped to the canvas. Everything else is exactly
//! zero either way.

use crate::style::ResolvedShadow;
use image::{GrayImage, Rgba, RgbaImage};
use log::debug;
use rayon::prelude::*;

/// Render the shadow for `silhouette` placed at `origin` on a `canvas`-sized
/// transparent layer.
pub fn render_shadow(
    silhouette: &GrayImage,
    origin: (i64, i64),
    shadow: &ResolvedShadow,
    canvas: (u32, u32),
) -> RgbaImage {
    let (cw, ch) = canvas;
    let mut out = RgbaImage::new(cw, ch);
    if !shadow.is_visible() || cw == 0 || ch == 0 {
        return out;
    }

    let kernel = gaussian_kernel_1d(shadow.blur / 2.0);
    let half = (kernel.len() / 2) as i64;
    let (sw, sh) = silhouette.dimensions();
    let sx = origin.0 + shadow.offset_x as i64;
    let sy = origin.1 + shadow.offset_y as i64;

    let x0 = (sx - half).clamp(0, cw as i64);
    let x1 = (sx + sw as i64 + half).clamp(0, cw as i64);
    let y0 = (sy - half).clamp(0, ch as i64);
    let y1 = (sy + sh as i64 + half).clamp(0, ch as i64);
    if x0 >= x1 || y0 >= y1 {
        debug!("shadow lies entirely outside the canvas");
        return out;
    }
    let (rw, rh) = ((x1 - x0) as usize, (y1 - y0) as usize);

    let mut plane = vec![0.0f32; rw * rh];
    for (x, y, p) in silhouette.enumerate_pixels() {
        let cx = sx + x as i64;
        let cy = sy + y as i64;
        if cx < x0 || cx >= x1 || cy < y0 || cy >= y1 {
            continue;
        }
        plane[(cy - y0) as usize * rw + (cx - x0) as usize] = p[0] as f32 / 255.0;
    }

    let plane = blur_plane(&plane, rw, rh, &kernel);

    let strength = shadow.opacity * shadow.color.a as f32 / 255.0;
    let (r, g, b) = (shadow.color.r, shadow.color.g, shadow.color.b);
    for (i, v) in plane.iter().enumerate() {
        let a = (v * strength * 255.0).round().clamp(0.0, 255.0) as u8;
        if a == 0 {
            continue;
        }
        let x = x0 as u32 + (i % rw) as u32;
        let y = y0 as u32 + (i / rw) as u32;
        out.put_pixel(x, y, Rgba([r, g, b, a]));
    }
    out
}

/// Normalized 1D Gaussian kernel covering ±3σ, always odd length.
///
/// σ ≤ 0 gives the identity kernel `[1.0]`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma.is_nan() || sigma <= 0.0 {
        return vec![1.0];
    }
    let size = ((sigma * 6.0).ceil() as usize) | 1;
    let half = size / 2;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }
    kernel
}

/// Separable blur of a `width`×`height` plane with zero padding.
fn blur_plane(src: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    if kernel.len() == 1 || width == 0 || height == 0 {
        return src.to_vec();
    }
    let half = (kernel.len() / 2) as isize;

    let mut horizontal = vec![0.0f32; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * width..(y + 1) * width];
            for (x, out) in row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = x as isize + k as isize - half;
                    if sx >= 0 && (sx as usize) < width {
                        acc += src_row[sx as usize] * weight;
                    }
                }
                *out = acc;
            }
        });

    let mut vertical = vec![0.0f32; width * height];
    vertical
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (k, weight) in kernel.iter().enumerate() {
                let sy = y as isize + k as isize - half;
                if sy < 0 || sy as usize >= height {
                    continue;
                }
                let src_row = &horizontal[sy as usize * width..(sy as usize + 1) * width];
                for (out, v) in row.iter_mut().zip(src_row) {
                    *out += v * weight;
                }
            }
        });
    vertical
}
