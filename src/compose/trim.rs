//! Content-aware trimming of uniform borders.
//!
//! Screenshots of a single window usually arrive wrapped in chrome that adds
//! nothing once the image sits on a new background: a transparent margin where
//! the compositor drew the window shadow, and a letterbox of flat colour around
//! the actual content. [`trim`] finds the box that is left once both are gone.
//!
//! ## Auto mode
//!
//! 1. **Transparent margins** (when [`TrimPolicy::strip_transparent`] is set):
//!    bounding box of nearly-opaque pixels (alpha > 250) if it is larger than
//!    50×50, else of pixels with alpha > 50 grown by one pixel, else the whole
//!    image.
//! 2. **Uniform rows and columns**: inside that box, each edge walks inward one
//!    line at a time while the line's colour variance stays under
//!    [`TrimPolicy::variance_threshold`] and its mean colour stays within
//!    [`TrimPolicy::tolerance`] of the outermost line. Rows are scanned first;
//!    columns are then scanned over the remaining rows only.
//!
//! An edge whose scan would eat the whole box is left untouched, and opposing
//! edges that together would leave nothing are both reset. A blank image
//! therefore comes back whole, never as an empty box.

use crate::style::{InsetMode, Margins, TrimPolicy};
use image::RgbaImage;

/// Content bounding box within the source image.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimResult {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl TrimResult {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether the box covers the whole `width`×`height` image.
    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

/// Compute the content box of `source` for the given inset mode.
pub fn trim(source: &RgbaImage, mode: &InsetMode, policy: &TrimPolicy) -> TrimResult {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return TrimResult::full(width, height);
    }
    match mode {
        InsetMode::None => TrimResult::full(width, height),
        InsetMode::Manual(margins) => manual(width, height, margins),
        InsetMode::Auto => {
            let bounds = if policy.strip_transparent {
                transparent_margins(source)
            } else {
                TrimResult::full(width, height)
            };
            uniform_borders(source, bounds, policy)
        }
    }
}

/// Apply fixed margins, keeping at least one pixel in each axis.
fn manual(width: u32, height: u32, margins: &Margins) -> TrimResult {
    let left = margins.left.min(width - 1);
    let top = margins.top.min(height - 1);
    let right = width.saturating_sub(margins.right).max(left + 1);
    let bottom = height.saturating_sub(margins.bottom).max(top + 1);
    TrimResult {
        left,
        top,
        right,
        bottom,
    }
}

/// Bounding box of pixels whose alpha passes `keep`.
fn alpha_bounds(source: &RgbaImage, keep: impl Fn(u8) -> bool) -> Option<TrimResult> {
    let mut bounds: Option<TrimResult> = None;
    for (x, y, pixel) in source.enumerate_pixels() {
        if !keep(pixel[3]) {
            continue;
        }
        let b = bounds.get_or_insert(TrimResult {
            left: x,
            top: y,
            right: x + 1,
            bottom: y + 1,
        });
        b.left = b.left.min(x);
        b.top = b.top.min(y);
        b.right = b.right.max(x + 1);
        b.bottom = b.bottom.max(y + 1);
    }
    bounds
}

fn transparent_margins(source: &RgbaImage) -> TrimResult {
    let (width, height) = source.dimensions();

    if let Some(opaque) = alpha_bounds(source, |a| a > 250)
        && opaque.width() > 50
        && opaque.height() > 50
    {
        return opaque;
    }

    match alpha_bounds(source, |a| a > 50) {
        Some(visible) => TrimResult {
            left: visible.left.saturating_sub(1),
            top: visible.top.saturating_sub(1),
            right: (visible.right + 1).min(width),
            bottom: (visible.bottom + 1).min(height),
        },
        None => TrimResult::full(width, height),
    }
}

/// Mean colour and colour variance of one row or column.
#[derive(Debug, Clone, Copy)]
struct LineStats {
    mean: [f32; 4],
    variance: f32,
}

impl LineStats {
    fn of<'a>(pixels: impl Iterator<Item = &'a image::Rgba<u8>>) -> Self {
        let mut sum = [0.0f64; 4];
        let mut sum_sq = [0.0f64; 4];
        let mut n = 0.0f64;
        for pixel in pixels {
            for c in 0..4 {
                let v = pixel[c] as f64;
                sum[c] += v;
                sum_sq[c] += v * v;
            }
            n += 1.0;
        }
        if n == 0.0 {
            return Self {
                mean: [0.0; 4],
                variance: 0.0,
            };
        }
        let mut mean = [0.0f32; 4];
        let mut variance = 0.0f64;
        for c in 0..4 {
            let m = sum[c] / n;
            mean[c] = m as f32;
            variance += (sum_sq[c] / n - m * m).max(0.0);
        }
        Self {
            mean,
            variance: variance as f32,
        }
    }

    /// Largest per-channel difference between two means.
    fn distance(&self, other: &LineStats) -> f32 {
        self.mean
            .iter()
            .zip(other.mean.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

/// How many of `count` lines, starting from one edge, are uniform border.
///
/// Returns 0 when every line qualifies.
fn scan_edge(count: u32, line: impl Fn(u32) -> LineStats, policy: &TrimPolicy) -> u32 {
    let reference = line(0);
    let mut trimmed = 0;
    while trimmed < count {
        let stats = line(trimmed);
        if stats.variance > policy.variance_threshold
            || stats.distance(&reference) > policy.tolerance
        {
            break;
        }
        trimmed += 1;
    }
    if trimmed >= count { 0 } else { trimmed }
}

/// Trim amounts for two opposing edges; both reset when they would meet.
fn opposing(count: u32, near: u32, far: u32) -> (u32, u32) {
    if near + far >= count {
        (0, 0)
    } else {
        (near, far)
    }
}

fn uniform_borders(source: &RgbaImage, bounds: TrimResult, policy: &TrimPolicy) -> TrimResult {
    let TrimResult {
        left,
        top,
        right,
        bottom,
    } = bounds;
    let row = |y: u32| LineStats::of((left..right).map(|x| source.get_pixel(x, y)));

    let rows = bottom - top;
    let (cut_top, cut_bottom) = opposing(
        rows,
        scan_edge(rows, |i| row(top + i), policy),
        scan_edge(rows, |i| row(bottom - 1 - i), policy),
    );
    let (top, bottom) = (top + cut_top, bottom - cut_bottom);

    let column = |x: u32| LineStats::of((top..bottom).map(|y| source.get_pixel(x, y)));
    let columns = right - left;
    let (cut_left, cut_right) = opposing(
        columns,
        scan_edge(columns, |i| column(left + i), policy),
        scan_edge(columns, |i| column(right - 1 - i), policy),
    );

    TrimResult {
        left: left + cut_left,
        top,
        right: right - cut_right,
        bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{framed_image, noise_image, solid_image};
    use image::Rgba;

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn auto(source: &RgbaImage) -> TrimResult {
        trim(source, &InsetMode::Auto, &TrimPolicy::default())
    }

    #[test]
    fn uniform_border_is_removed() {
        let img = framed_image(800, 600, 20, GRAY);
        let result = auto(&img);
        assert_eq!(
            result,
            TrimResult {
                left: 20,
                top: 20,
                right: 780,
                bottom: 580
            }
        );
        assert_eq!((result.width(), result.height()), (760, 560));
    }

    #[test]
    fn asymmetric_border() {
        let mut img = noise_image(100, 80);
        for (x, y, p) in img.enumerate_pixels_mut() {
            if x < 5 || y < 12 {
                *p = GRAY;
            }
        }
        let result = auto(&img);
        assert_eq!(result.left, 5);
        assert_eq!(result.top, 12);
        assert_eq!(result.right, 100);
        assert_eq!(result.bottom, 80);
    }

    #[test]
    fn fully_uniform_image_is_not_trimmed() {
        let img = solid_image(64, 48, GRAY);
        assert!(auto(&img).is_full(64, 48));
    }

    #[test]
    fn fully_transparent_image_is_not_trimmed() {
        let img = solid_image(64, 48, Rgba([0, 0, 0, 0]));
        assert!(auto(&img).is_full(64, 48));
    }

    #[test]
    fn two_flat_halves_are_not_collapsed() {
        let mut img = solid_image(40, 40, Rgba([0, 0, 0, 255]));
        for (x, _, p) in img.enumerate_pixels_mut() {
            if x >= 20 {
                *p = Rgba([255, 255, 255, 255]);
            }
        }
        let result = auto(&img);
        assert!(result.left < result.right);
        assert_eq!((result.left, result.right), (0, 40));
    }

    #[test]
    fn noisy_image_is_not_trimmed() {
        let img = noise_image(50, 50);
        assert!(auto(&img).is_full(50, 50));
    }

    #[test]
    fn near_uniform_border_within_tolerance_is_removed() {
        let mut img = framed_image(120, 120, 10, GRAY);
        // Slightly lighter second ring, like an anti-aliased window edge.
        for (x, y, p) in img.enumerate_pixels_mut() {
            let ring = x == 1 || y == 1 || x == 118 || y == 118;
            if ring && x >= 1 && y >= 1 && x <= 118 && y <= 118 {
                *p = Rgba([134, 134, 134, 255]);
            }
        }
        let result = auto(&img);
        assert_eq!((result.left, result.top), (10, 10));
    }

    #[test]
    fn transparent_margin_is_stripped() {
        let mut img = solid_image(200, 160, Rgba([0, 0, 0, 0]));
        let content = noise_image(100, 80);
        image::imageops::replace(&mut img, &content, 30, 40);
        let result = auto(&img);
        assert_eq!(
            result,
            TrimResult {
                left: 30,
                top: 40,
                right: 130,
                bottom: 120
            }
        );
    }

    #[test]
    fn transparent_margin_kept_when_disabled() {
        let mut img = solid_image(200, 160, Rgba([0, 0, 0, 0]));
        let content = noise_image(100, 80);
        image::imageops::replace(&mut img, &content, 30, 40);
        let policy = TrimPolicy {
            strip_transparent: false,
            variance_threshold: 0.0,
            tolerance: 0.0,
        };
        // Transparent rows are uniform, so the colour scan still finds them.
        let result = trim(&img, &InsetMode::Auto, &policy);
        assert_eq!((result.top, result.bottom), (40, 120));
    }

    #[test]
    fn none_mode_returns_full_image() {
        let img = framed_image(100, 100, 10, GRAY);
        let result = trim(&img, &InsetMode::None, &TrimPolicy::default());
        assert!(result.is_full(100, 100));
    }

    #[test]
    fn manual_margins_applied() {
        let img = solid_image(100, 50, GRAY);
        let mode = InsetMode::Manual(Margins {
            left: 10,
            top: 5,
            right: 20,
            bottom: 15,
        });
        let result = trim(&img, &mode, &TrimPolicy::default());
        assert_eq!(
            result,
            TrimResult {
                left: 10,
                top: 5,
                right: 80,
                bottom: 35
            }
        );
    }

    #[test]
    fn manual_margins_clamped_to_image() {
        let img = solid_image(100, 50, GRAY);
        let mode = InsetMode::Manual(Margins::uniform(1000));
        let result = trim(&img, &mode, &TrimPolicy::default());
        assert!(result.left < result.right && result.right <= 100);
        assert!(result.top < result.bottom && result.bottom <= 50);
        assert_eq!((result.width(), result.height()), (1, 1));
    }

    #[test]
    fn zero_size_source_is_left_alone() {
        let img = RgbaImage::new(0, 0);
        assert_eq!(auto(&img), TrimResult::full(0, 0));
    }
}
