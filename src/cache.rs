//! Render cache for batch runs.
//!
//! Rendering a 4K screenshot with a large shadow blur takes long enough that
//! re-running `composure batch` over a folder of mostly unchanged screenshots
//! should not redo the work. This module lets the batch runner skip a render
//! when neither the source file nor the style changed since the last run.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups use `source_hash` and
//! `style_hash`, not the output file name. Renaming a screenshot does not
//! invalidate its render; the cached output is copied to the new name.
//!
//! - **`source_hash`**: SHA-256 of the source file bytes. Content-based rather
//!   than mtime-based, so touching or re-downloading a file costs nothing.
//! - **`style_hash`**: SHA-256 of the style serialized as JSON, prefixed with
//!   [`RENDER_VERSION`], plus the bytes of an image background. Any style
//!   change re-renders every image.
//!
//! A cache hit requires a matching entry **and** the recorded output file to
//! still exist in the output directory.
//!
//! ## Storage
//!
//! `<output_dir>/.composure-cache.json`. A missing, corrupt or
//! version-mismatched manifest is treated as empty.

use crate::style::{BackgroundSpec, StyleConfig};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

/// Name of the cache manifest file within the output directory.
pub const MANIFEST_FILENAME: &str = ".composure-cache.json";

/// Bump to invalidate every existing manifest.
const MANIFEST_VERSION: u32 = 1;

/// Bump when the renderer's output changes for the same style, so stale
/// renders are not served from cache.
pub const RENDER_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub style_hash: String,
}

/// Output file name → the inputs it was rendered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// `"{source_hash}:{style_hash}"` → output file name. Rebuilt on load.
    #[serde(skip)]
    by_content: HashMap<String, String>,
}

fn content_key(source_hash: &str, style_hash: &str) -> String {
    format!("{source_hash}:{style_hash}")
}

impl CacheManifest {
    /// An empty manifest (first run or `--no-cache`).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            by_content: HashMap::new(),
        }
    }

    pub fn load(output_dir: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(output_dir.join(MANIFEST_FILENAME)) else {
            return Self::empty();
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("ignoring unreadable cache manifest: {e}");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.by_content = manifest
            .entries
            .iter()
            .map(|(output, e)| (content_key(&e.source_hash, &e.style_hash), output.clone()))
            .collect();
        manifest
    }

    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(output_dir.join(MANIFEST_FILENAME), json)
    }

    /// Output file name of a previous render of the same inputs, if that file
    /// still exists in `output_dir`.
    pub fn find_cached(
        &self,
        source_hash: &str,
        style_hash: &str,
        output_dir: &Path,
    ) -> Option<String> {
        let stored = self.by_content.get(&content_key(source_hash, style_hash))?;
        output_dir.join(stored).exists().then(|| stored.clone())
    }

    /// Record that `output` was rendered from these inputs.
    ///
    /// An older entry for the same inputs under another name is dropped.
    pub fn insert(&mut self, output: String, source_hash: String, style_hash: String) {
        let key = content_key(&source_hash, &style_hash);
        if let Some(old) = self.by_content.get(&key)
            && *old != output
        {
            self.entries.remove(old.as_str());
        }
        self.by_content.insert(key, output.clone());
        self.entries.insert(
            output,
            CacheEntry {
                source_hash,
                style_hash,
            },
        );
    }
}

/// SHA-256 of a file's contents, hex encoded.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// SHA-256 of everything about a style that affects the rendered pixels.
///
/// An image background contributes its file contents, so replacing the
/// wallpaper re-renders every screenshot.
pub fn hash_style(style: &StyleConfig) -> io::Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(b"style\0");
    hasher.update(RENDER_VERSION.to_le_bytes());
    hasher.update(serde_json::to_vec(style)?);
    if let BackgroundSpec::Image { path } = &style.background {
        match std::fs::read(path) {
            Ok(bytes) => hasher.update(Sha256::digest(&bytes)),
            Err(_) => hasher.update(b"unreadable"),
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Cache outcome counts for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hits, self.copies) {
            (0, 0) => write!(f, "{} rendered", self.misses),
            (hits, 0) => write!(
                f,
                "{hits} cached, {} rendered ({} total)",
                self.misses,
                self.total()
            ),
            (hits, copies) => write!(
                f,
                "{hits} cached, {copies} copied, {} rendered ({} total)",
                self.misses,
                self.total()
            ),
        }
    }
}
