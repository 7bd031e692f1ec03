//! Canvas dimension math.
//!
//! All functions here are pure and testable without any images.

use crate::presets;
use crate::style::{MAX_CANVAS_SIDE, MAX_RATIO_COMPONENT, OutputShape};
use log::warn;

/// Output canvas size and where the content lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    pub width: u32,
    pub height: u32,
    pub content_origin: (u32, u32),
    /// Size the content is drawn at. Smaller than the trimmed content only
    /// when a fixed canvas forces it to shrink.
    pub content_size: (u32, u32),
}

impl CanvasLayout {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Compute the canvas for content of `content` size.
///
/// With [`OutputShape::Auto`] the canvas is the content plus `padding` on
/// every side:
///
/// ```
/// # use composure::compose::layout;
/// # use composure::style::OutputShape;
/// let canvas = layout((760, 560), 40, &OutputShape::Auto);
/// assert_eq!((canvas.width, canvas.height), (840, 640));
/// assert_eq!(canvas.content_origin, (40, 40));
/// ```
///
/// With [`OutputShape::Ratio`] that canvas is then grown along its short
/// axis until it matches the ratio, and the content is centred. The canvas
/// never shrinks, so the padding is a minimum on every side.
///
/// [`OutputShape::Size`] and [`OutputShape::Platform`] fix the canvas size.
/// Content larger than the canvas minus padding is scaled down to fit,
/// keeping its aspect ratio; smaller content is left as is. Either way it is
/// centred.
pub fn layout(content: (u32, u32), padding: u32, shape: &OutputShape) -> CanvasLayout {
    let (content_w, content_h) = content;
    let auto = (content_w + 2 * padding, content_h + 2 * padding);

    let fixed = match shape {
        OutputShape::Auto => None,
        OutputShape::Ratio {
            width: ratio_w,
            height: ratio_h,
        } => {
            let ratio = (
                (*ratio_w).min(MAX_RATIO_COMPONENT),
                (*ratio_h).min(MAX_RATIO_COMPONENT),
            );
            return centred(fit_ratio(auto, ratio), content);
        }
        OutputShape::Size { width, height } => {
            if *width == 0 || *height == 0 {
                None
            } else {
                Some((
                    (*width).min(MAX_CANVAS_SIDE),
                    (*height).min(MAX_CANVAS_SIDE),
                ))
            }
        }
        OutputShape::Platform { name } => match presets::find_platform(name) {
            Some(platform) => Some((platform.width, platform.height)),
            None => {
                warn!("Unknown platform '{name}', sizing the canvas to the content");
                None
            }
        },
    };

    match fixed {
        None => centred(auto, content),
        Some((width, height)) => {
            let available = (
                width.saturating_sub(2 * padding).max(1),
                height.saturating_sub(2 * padding).max(1),
            );
            centred((width, height), fit_within(content, available))
        }
    }
}

fn centred(canvas: (u32, u32), content: (u32, u32)) -> CanvasLayout {
    let (width, height) = canvas;
    CanvasLayout {
        width,
        height,
        content_origin: (
            width.saturating_sub(content.0) / 2,
            height.saturating_sub(content.1) / 2,
        ),
        content_size: content,
    }
}

/// Largest size with the aspect of `content` that fits `available`.
///
/// Content that already fits is returned unchanged.
fn fit_within(content: (u32, u32), available: (u32, u32)) -> (u32, u32) {
    let (cw, ch) = content;
    let (aw, ah) = available;
    if cw <= aw && ch <= ah {
        return content;
    }
    let scale = (aw as f64 / cw as f64).min(ah as f64 / ch as f64);
    let fit = |side: u32, limit: u32| ((side as f64 * scale).round() as u32).clamp(1, limit);
    (fit(cw, aw), fit(ch, ah))
}

/// Smallest size at least `base` in both axes with aspect `ratio`.
///
/// A zero ratio component leaves `base` unchanged.
fn fit_ratio(base: (u32, u32), ratio: (u32, u32)) -> (u32, u32) {
    let (w, h) = base;
    let (rw, rh) = ratio;
    if rw == 0 || rh == 0 || w == 0 || h == 0 {
        return base;
    }
    let saturate = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);
    // Compare w/h against rw/rh without floating point.
    let lhs = w as u64 * rh as u64;
    let rhs = h as u64 * rw as u64;
    if lhs < rhs {
        // Too narrow: widen.
        let width = (h as u64 * rw as u64).div_ceil(rh as u64);
        (saturate(width), h)
    } else if lhs > rhs {
        // Too wide: heighten.
        let height = (w as u64 * rh as u64).div_ceil(rw as u64);
        (w, saturate(height))
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_adds_padding_on_every_side() {
        let canvas = layout((760, 560), 40, &OutputShape::Auto);
        assert_eq!(canvas.dimensions(), (840, 640));
        assert_eq!(canvas.content_origin, (40, 40));
    }

    #[test]
    fn zero_padding_is_content_size() {
        let canvas = layout((300, 200), 0, &OutputShape::Auto);
        assert_eq!(canvas.dimensions(), (300, 200));
        assert_eq!(canvas.content_origin, (0, 0));
    }

    #[test]
    fn ratio_widens_tall_canvas() {
        // 200x200 canvas into 16:9 → 356x200 (355.55 rounded up).
        let canvas = layout(
            (100, 100),
            50,
            &OutputShape::Ratio {
                width: 16,
                height: 9,
            },
        );
        assert_eq!(canvas.dimensions(), (356, 200));
        assert_eq!(canvas.content_origin, (128, 50));
    }

    #[test]
    fn ratio_heightens_wide_canvas() {
        let canvas = layout(
            (400, 100),
            0,
            &OutputShape::Ratio {
                width: 1,
                height: 1,
            },
        );
        assert_eq!(canvas.dimensions(), (400, 400));
        assert_eq!(canvas.content_origin, (0, 150));
    }

    #[test]
    fn ratio_result_matches_ratio_exactly() {
        let canvas = layout(
            (140, 70),
            5,
            &OutputShape::Ratio {
                width: 3,
                height: 2,
            },
        );
        assert_eq!(canvas.dimensions(), (150, 100));
        assert_eq!(canvas.width * 2, canvas.height * 3);
    }

    #[test]
    fn zero_ratio_falls_back_to_auto() {
        let canvas = layout(
            (100, 50),
            10,
            &OutputShape::Ratio {
                width: 0,
                height: 9,
            },
        );
        assert_eq!(canvas.dimensions(), (120, 70));
    }

    #[test]
    fn empty_content_is_padding_only() {
        let canvas = layout((0, 0), 8, &OutputShape::Auto);
        assert_eq!(canvas.dimensions(), (16, 16));
        assert_eq!(canvas.content_origin, (8, 8));
    }

    #[test]
    fn oversized_ratio_is_capped() {
        let canvas = layout(
            (100, 100),
            0,
            &OutputShape::Ratio {
                width: u32::MAX,
                height: 1,
            },
        );
        // Treated as 100:1.
        assert_eq!(canvas.dimensions(), (10_000, 100));
        assert_eq!(canvas.content_origin, (4_950, 0));
    }

    #[test]
    fn fixed_size_centres_small_content() {
        let canvas = layout(
            (200, 100),
            20,
            &OutputShape::Size {
                width: 1200,
                height: 675,
            },
        );
        assert_eq!(canvas.dimensions(), (1200, 675));
        assert_eq!(canvas.content_size, (200, 100));
        assert_eq!(canvas.content_origin, (500, 287));
    }

    #[test]
    fn fixed_size_shrinks_large_content() {
        // 2000x1000 into 1000x1000 minus 100px padding: width-bound, 800x400.
        let canvas = layout(
            (2000, 1000),
            100,
            &OutputShape::Size {
                width: 1000,
                height: 1000,
            },
        );
        assert_eq!(canvas.dimensions(), (1000, 1000));
        assert_eq!(canvas.content_size, (800, 400));
        assert_eq!(canvas.content_origin, (100, 300));
    }

    #[test]
    fn fixed_size_is_capped() {
        let canvas = layout(
            (10, 10),
            0,
            &OutputShape::Size {
                width: u32::MAX,
                height: 10,
            },
        );
        assert_eq!(canvas.dimensions(), (MAX_CANVAS_SIDE, 10));
    }

    #[test]
    fn padding_larger_than_fixed_canvas_keeps_content_visible() {
        let canvas = layout(
            (50, 50),
            500,
            &OutputShape::Size {
                width: 100,
                height: 100,
            },
        );
        assert_eq!(canvas.dimensions(), (100, 100));
        assert_eq!(canvas.content_size, (1, 1));
    }

    #[test]
    fn platform_uses_preset_size() {
        let canvas = layout(
            (300, 300),
            40,
            &OutputShape::Platform {
                name: "instagram".into(),
            },
        );
        assert_eq!(canvas.dimensions(), (1080, 1080));
        assert_eq!(canvas.content_size, (300, 300));
        assert_eq!(canvas.content_origin, (390, 390));
    }

    #[test]
    fn unknown_platform_falls_back_to_auto() {
        let canvas = layout(
            (300, 200),
            10,
            &OutputShape::Platform {
                name: "myspace".into(),
            },
        );
        assert_eq!(canvas.dimensions(), (320, 220));
    }
}
