//! # Composition Pipeline
//!
//! Turns a raw screenshot into the final image in six stages, each a pure
//! function returning a fresh buffer:
//!
//! ```text
//! source ─▶ trim ─▶ layout ─▶ corner mask ─┬─▶ shadow ──────┐
//!                                          │                ├─▶ compose ─▶ image
//!                                          └─▶ background ──┘
//! ```
//!
//! | Module | Stage |
//! |--------|-------|
//! | [`trim`] | Content-aware removal of uniform borders and transparent margins |
//! | [`canvas`] | Canvas size and content origin from padding and output shape |
//! | [`background`] | Opaque solid / linear / radial / preset background |
//! | [`mask`] | Anti-aliased rounded-corner alpha mask |
//! | [`shadow`] | Gaussian-blurred, tinted silhouette |
//! | [`composite`] | Porter-Duff "over" of background, shadow and content |
//! | [`pipeline`] | Runs the stages in order |
//!
//! The source image is never mutated. Background and shadow are independent
//! and rendered concurrently; the compositor fixes the layer order, so the
//! result does not depend on scheduling.

pub mod background;
pub mod canvas;
pub mod composite;
pub mod mask;
pub mod pipeline;
pub mod shadow;
pub mod trim;

pub use background::{gradient_color_at, render_background};
pub use canvas::{CanvasLayout, layout};
pub use composite::{ComposeError, blend_over, compose};
pub use mask::{apply_corner_mask, corner_mask};
pub use pipeline::{Rendered, render, render_detailed};
pub use shadow::render_shadow;
pub use trim::{TrimResult, trim};
