//! Shared test utilities for the composure test suite.
//!
//! Synthetic image builders: flat fills, deterministic noise that no uniform
//! border scan will ever mistake for chrome, and noise wrapped in a flat frame.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let img = framed_image(800, 600, 20, Rgba([128, 128, 128, 255]));
//! let result = trim(&img, &InsetMode::Auto, &TrimPolicy::default());
//! assert_eq!((result.width(), result.height()), (760, 560));
//! ```

use image::{Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Image builders
// =========================================================================

/// A `width`×`height` image filled with `color`.
pub fn solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// Opaque pseudo-random noise, the same for every call with the same size.
///
/// Every row and column has a colour variance far above any trim threshold.
pub fn noise_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let h = mix(x, y);
        Rgba([h as u8, (h >> 8) as u8, (h >> 16) as u8, 255])
    })
}

/// Noise framed by a `border`-pixel band of `color` on every side.
pub fn framed_image(width: u32, height: u32, border: u32, color: Rgba<u8>) -> RgbaImage {
    let mut img = noise_image(width, height);
    for (x, y, p) in img.enumerate_pixels_mut() {
        if x < border || y < border || x >= width - border || y >= height - border {
            *p = color;
        }
    }
    img
}

/// Integer hash of a coordinate pair (splitmix-style finalizer).
fn mix(x: u32, y: u32) -> u32 {
    let mut h = (x as u64) << 32 | y as u64;
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h as u32
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Write `img` as PNG to `dir/name`.
pub fn write_png(dir: &Path, name: &str, img: &RgbaImage) {
    img.save_with_format(dir.join(name), image::ImageFormat::Png)
        .unwrap_or_else(|e| panic!("failed to write fixture {name}: {e}"));
}
