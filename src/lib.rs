//! # Composure
//!
//! Turns raw screenshots into presentation-ready images: the window chrome or
//! flat border around the interesting part is trimmed away, the content gets
//! rounded corners and a soft drop shadow, and the result is placed on a
//! padded solid or gradient background.
//!
//! # Architecture: Pure Pipeline, Thin Shell
//!
//! The [`compose`] pipeline is a pure function from a decoded RGBA image and a
//! [`style::StyleConfig`] to a new RGBA image. It never touches the filesystem
//! and never mutates its input, so every stage can be unit tested with
//! synthetic images built in memory.
//!
//! Everything that deals with files sits around it:
//!
//! ```text
//! config.toml ─▶ config ─▶ StyleConfig ─┐
//!                                       ▼
//! shot.png ───▶ codec ─▶ RgbaImage ─▶ compose ─▶ RgbaImage ─▶ codec ─▶ shot-composed.png
//!                                       ▲
//! screenshots/ ─▶ batch (rayon, cache) ─┘
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`compose`] | The render pipeline: trim, layout, background, mask, shadow, composite |
//! | [`style`] | Style data model: colours, backgrounds, shadow, inset and output shape |
//! | [`presets`] | Built-in named backgrounds |
//! | [`config`] | Layered `config.toml` loading, merging and validation |
//! | [`codec`] | Decoding and encoding image files behind the `ImageCodec` trait |
//! | [`batch`] | Parallel rendering of a whole directory |
//! | [`cache`] | Content-addressed render cache used by [`batch`] |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Straight Alpha Throughout
//!
//! All buffers are straight (non-premultiplied) 8-bit RGBA, which is what the
//! `image` crate decodes to and what PNG stores. The compositor implements
//! Porter-Duff "over" directly in that representation.
//!
//! ## Clamp, Don't Fail
//!
//! Out-of-range style values (negative padding, a radius larger than the
//! content, opacity above 1) are clamped by [`style::StyleConfig::resolve`].
//! Only structural problems, such as malformed TOML or an unknown preset name,
//! are errors, and those are reported by [`config`] before any pixel is
//! touched.
//!
//! ## Determinism
//!
//! The same source and style always produce byte-identical output. Parallel
//! stages write disjoint rows and the layer order is fixed by the compositor,
//! not by scheduling. The batch cache relies on this.

pub mod batch;
pub mod cache;
pub mod codec;
pub mod compose;
pub mod config;
pub mod output;
pub mod presets;
pub mod style;

#[cfg(test)]
pub(crate) mod test_helpers;
