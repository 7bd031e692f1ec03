//! Layer compositing.
//!
//! Straight (non-premultiplied) alpha throughout, Porter-Duff "over":
//!
//! ```text
//! a_out = a_s + a_d (1 - a_s)
//! c_out = (c_s a_s + c_d a_d (1 - a_s)) / a_out
//! ```

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("shadow layer is {found:?} but the canvas is {expected:?}")]
    LayerSizeMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("content of size {size:?} at {origin:?} does not fit a {canvas:?} canvas")]
    ContentOutOfBounds {
        origin: (u32, u32),
        size: (u32, u32),
        canvas: (u32, u32),
    },
}

/// Blend `src` over `dst`.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Stack `background`, then `shadow`, then `content` at `origin`.
///
/// `shadow` must match the background's size and `content` must lie fully
/// inside it.
pub fn compose(
    shadow: &RgbaImage,
    background: &RgbaImage,
    content: &RgbaImage,
    origin: (u32, u32),
) -> Result<RgbaImage, ComposeError> {
    let canvas = background.dimensions();
    if shadow.dimensions() != canvas {
        return Err(ComposeError::LayerSizeMismatch {
            expected: canvas,
            found: shadow.dimensions(),
        });
    }
    let size = content.dimensions();
    let fits_x = origin.0 as u64 + size.0 as u64 <= canvas.0 as u64;
    let fits_y = origin.1 as u64 + size.1 as u64 <= canvas.1 as u64;
    if !(fits_x && fits_y) {
        return Err(ComposeError::ContentOutOfBounds {
            origin,
            size,
            canvas,
        });
    }

    let mut out = background.clone();
    if canvas.0 == 0 || canvas.1 == 0 {
        return Ok(out);
    }

    let raw: &mut [u8] = &mut out;
    let shadow_raw: &[u8] = shadow;
    raw.par_chunks_mut(4)
        .zip(shadow_raw.par_chunks(4))
        .for_each(|(dst, src)| {
            let blended = blend_over(
                Rgba([dst[0], dst[1], dst[2], dst[3]]),
                Rgba([src[0], src[1], src[2], src[3]]),
            );
            dst.copy_from_slice(&blended.0);
        });

    for (x, y, src) in content.enumerate_pixels() {
        let (cx, cy) = (origin.0 + x, origin.1 + y);
        let dst = *out.get_pixel(cx, cy);
        out.put_pixel(cx, cy, blend_over(dst, *src));
    }
    Ok(out)
}
