//! Batch rendering of a screenshots folder.
//!
//! Renders every supported image directly inside a directory (no recursion)
//! and writes `<stem>-composed.png` next to it or into a separate output
//! directory. Files that already end in `-composed` are skipped, so running
//! the batch twice over the same folder does not compose the compositions.
//!
//! Sources that share a stem, such as `shot.png` and `shot.jpg`, keep their
//! extension in the output name (`shot.png-composed.png`,
//! `shot.jpg-composed.png`). Stems are compared ignoring ASCII case, since the
//! outputs may land on a case-insensitive filesystem.
//!
//! ## Parallel Processing
//!
//! Images are rendered in parallel with [rayon](https://docs.rs/rayon); the
//! global pool is sized from `[processing] max_processes` by the binary.
//! Results are reported in source order regardless of completion order.
//!
//! ## Failures
//!
//! A screenshot that cannot be read, decoded or written is logged, recorded in
//! [`BatchResult::failures`] and skipped. Only problems with the directories
//! themselves abort the batch.
//!
//! ## Caching
//!
//! See [`cache`](crate::cache). With the cache on, an unchanged screenshot
//! rendered with an unchanged style is not rendered again.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::codec::{CodecError, ImageCodec, RustCodec, supported_input_extensions};
use crate::compose::{ComposeError, render};
use crate::style::StyleConfig;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Suffix appended to the stem of every rendered file.
pub const OUTPUT_SUFFIX: &str = "-composed";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to scan directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Why a single screenshot failed.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Render failed: {0}")]
    Compose(#[from] ComposeError),
    #[error("File name is not valid UTF-8")]
    BadFileName,
    #[error("Output {0} is already produced by another screenshot")]
    DuplicateOutput(String),
}

/// How an output came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Output already on disk from a previous run.
    Cached,
    /// Output of a previous run under another name, copied.
    Copied,
    /// Freshly rendered.
    Rendered,
}

/// Progress events, sent as images complete.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        image_count: usize,
    },
    ImageDone {
        /// 1-based position in source order.
        index: usize,
        source: PathBuf,
        output: PathBuf,
        status: RenderStatus,
    },
    ImageFailed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

#[derive(Debug)]
pub struct BatchFailure {
    pub source: PathBuf,
    pub error: ImageError,
}

#[derive(Debug)]
pub struct BatchResult {
    /// Written (or reused) outputs, in source order.
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
    pub cache_stats: CacheStats,
}

/// Output file name for a source: `shot.jpg` → `shot-composed.png`.
pub fn output_name(source: &Path) -> Option<String> {
    let stem = source.file_stem()?.to_str()?;
    Some(format!("{stem}{OUTPUT_SUFFIX}.png"))
}

fn stem_key(path: &Path) -> Option<String> {
    path.file_stem()?.to_str().map(str::to_ascii_lowercase)
}

/// Output names for `sources`, in the same order.
///
/// A source whose stem is shared with another source is named after its full
/// file name instead. A name that is still taken by an earlier source is an
/// error for the later one.
pub fn plan_output_names(sources: &[PathBuf]) -> Vec<Result<String, ImageError>> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for key in sources.iter().filter_map(|p| stem_key(p)) {
        *stem_counts.entry(key).or_default() += 1;
    }

    let mut taken = HashSet::new();
    sources
        .iter()
        .map(|source| {
            let shared = stem_key(source)
                .and_then(|key| stem_counts.get(&key))
                .is_some_and(|&n| n > 1);
            let name = if shared {
                let file_name = source
                    .file_name()
                    .and_then(|f| f.to_str())
                    .ok_or(ImageError::BadFileName)?;
                format!("{file_name}{OUTPUT_SUFFIX}.png")
            } else {
                output_name(source).ok_or(ImageError::BadFileName)?
            };
            if taken.insert(name.to_ascii_lowercase()) {
                Ok(name)
            } else {
                Err(ImageError::DuplicateOutput(name))
            }
        })
        .collect()
}

fn is_previous_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(OUTPUT_SUFFIX))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Screenshots directly inside `dir`, sorted by file name.
pub fn find_sources(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.to_path_buf()));
    }
    let mut sources = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && has_supported_extension(path)
            && !is_previous_output(path)
        {
            sources.push(path.to_path_buf());
        }
    }
    Ok(sources)
}

/// Render every screenshot in `source_dir` into `output_dir`.
pub fn batch(
    source_dir: &Path,
    output_dir: &Path,
    style: &StyleConfig,
    use_cache: bool,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchResult, BatchError> {
    batch_with_codec(&RustCodec, source_dir, output_dir, style, use_cache, events)
}

/// [`batch`] with a specific codec (allows testing with a mock).
pub fn batch_with_codec(
    codec: &impl ImageCodec,
    source_dir: &Path,
    output_dir: &Path,
    style: &StyleConfig,
    use_cache: bool,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchResult, BatchError> {
    let sources = find_sources(source_dir)?;
    std::fs::create_dir_all(output_dir)?;

    let manifest = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };
    let style_hash = cache::hash_style(style)?;
    let names = plan_output_names(&sources);

    let send = |event: BatchEvent| {
        if let Some(tx) = &events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    };
    send(BatchEvent::Started {
        image_count: sources.len(),
    });

    let outcomes: Vec<Result<Outcome, ImageError>> = sources
        .par_iter()
        .zip(names)
        .enumerate()
        .map(|(i, (source, name))| {
            let outcome = name.and_then(|name| {
                render_one(codec, source, name, output_dir, style, &style_hash, &manifest)
            });
            match &outcome {
                Ok(done) => send(BatchEvent::ImageDone {
                    index: i + 1,
                    source: source.clone(),
                    output: output_dir.join(&done.output_name),
                    status: done.status,
                }),
                Err(e) => {
                    warn!("Skipping {}: {e}", source.display());
                    send(BatchEvent::ImageFailed {
                        index: i + 1,
                        source: source.clone(),
                        error: e.to_string(),
                    });
                }
            }
            outcome
        })
        .collect();

    let mut manifest = manifest;
    let mut result = BatchResult {
        outputs: Vec::new(),
        failures: Vec::new(),
        cache_stats: CacheStats::default(),
    };
    for (source, outcome) in sources.into_iter().zip(outcomes) {
        match outcome {
            Ok(done) => {
                match done.status {
                    RenderStatus::Cached => result.cache_stats.hit(),
                    RenderStatus::Copied => result.cache_stats.copy(),
                    RenderStatus::Rendered => result.cache_stats.miss(),
                }
                result.outputs.push(output_dir.join(&done.output_name));
                manifest.insert(done.output_name, done.source_hash, style_hash.clone());
            }
            Err(error) => result.failures.push(BatchFailure { source, error }),
        }
    }

    manifest.save(output_dir)?;
    debug!("batch done: {}", result.cache_stats);
    Ok(result)
}

struct Outcome {
    output_name: String,
    source_hash: String,
    status: RenderStatus,
}

fn render_one(
    codec: &impl ImageCodec,
    source: &Path,
    output_name: String,
    output_dir: &Path,
    style: &StyleConfig,
    style_hash: &str,
    manifest: &CacheManifest,
) -> Result<Outcome, ImageError> {
    let source_hash = cache::hash_file(source)?;

    if let Some(stored) = manifest.find_cached(&source_hash, style_hash, output_dir) {
        let status = if stored == output_name {
            RenderStatus::Cached
        } else {
            std::fs::copy(output_dir.join(&stored), output_dir.join(&output_name))?;
            RenderStatus::Copied
        };
        debug!("{}: {:?}", source.display(), status);
        return Ok(Outcome {
            output_name,
            source_hash,
            status,
        });
    }

    let image = codec.decode(source)?;
    let composed = render(&image, style)?;
    codec.encode(&composed, &output_dir.join(&output_name))?;
    debug!(
        "{}: rendered {}x{}",
        source.display(),
        composed.width(),
        composed.height()
    );
    Ok(Outcome {
        output_name,
        source_hash,
        status: RenderStatus::Rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::{MockCodec, RecordedOp};
    use crate::style::{BackgroundSpec, Color};
    use crate::test_helpers::noise_image;
    use std::fs;
    use tempfile::TempDir;

    fn small_style() -> StyleConfig {
        StyleConfig {
            padding: 4,
            radius: 2.0,
            background: BackgroundSpec::solid(Color::WHITE),
            ..StyleConfig::default()
        }
    }

    /// Source files only need distinct bytes; the mock never parses them.
    fn make_sources(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    fn mock() -> MockCodec {
        MockCodec::new(noise_image(12, 10))
    }

    #[test]
    fn output_name_uses_stem() {
        assert_eq!(
            output_name(Path::new("/a/shot.jpg")).as_deref(),
            Some("shot-composed.png")
        );
        assert_eq!(
            output_name(Path::new("Screenshot 2024.png")).as_deref(),
            Some("Screenshot 2024-composed.png")
        );
    }

    #[test]
    fn shared_stems_keep_their_extension() {
        let sources: Vec<PathBuf> = ["b.png", "shot.jpg", "Shot.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let names: Vec<String> = plan_output_names(&sources)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            names,
            vec!["b-composed.png", "shot.jpg-composed.png", "Shot.png-composed.png"]
        );
    }

    #[test]
    fn remaining_name_clash_is_an_error() {
        // `a.png.jpg` has the stem `a.png`, which clashes with the
        // disambiguated name of `a.png`.
        let sources: Vec<PathBuf> = ["a.jpg", "a.png", "a.png.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let names = plan_output_names(&sources);
        assert_eq!(names[0].as_deref().unwrap(), "a.jpg-composed.png");
        assert_eq!(names[1].as_deref().unwrap(), "a.png-composed.png");
        assert!(matches!(
            &names[2],
            Err(ImageError::DuplicateOutput(name)) if name == "a.png-composed.png"
        ));
    }

    #[test]
    fn find_sources_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        make_sources(
            tmp.path(),
            &["b.png", "a.JPG", "notes.txt", "a-composed.png", "c.webp"],
        );
        fs::create_dir(tmp.path().join("nested")).unwrap();
        make_sources(&tmp.path().join("nested"), &["deep.png"]);

        let names: Vec<String> = find_sources(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.webp"]);
    }

    #[test]
    fn find_sources_rejects_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let result = find_sources(&tmp.path().join("nope"));
        assert!(matches!(result, Err(BatchError::NotADirectory(_))));
    }

    #[test]
    fn renders_every_source() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["one.png", "two.png"]);
        let out = tmp.path().join("out");
        let codec = mock();

        let result =
            batch_with_codec(&codec, tmp.path(), &out, &small_style(), true, None).unwrap();

        assert_eq!(
            result.outputs,
            vec![out.join("one-composed.png"), out.join("two-composed.png")]
        );
        assert!(result.failures.is_empty());
        assert_eq!(result.cache_stats.misses, 2);

        let encodes: Vec<RecordedOp> = codec
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Encode { .. }))
            .collect();
        assert_eq!(encodes.len(), 2);
        // 12x10 noise is not trimmed; 4px padding on each side.
        assert!(encodes.iter().all(|op| matches!(
            op,
            RecordedOp::Encode {
                width: 20,
                height: 18,
                ..
            }
        )));
    }

    #[test]
    fn second_run_hits_cache() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["one.png", "two.png"]);
        let out = tmp.path().join("out");

        batch_with_codec(&mock(), tmp.path(), &out, &small_style(), true, None).unwrap();
        let codec = mock();
        let result =
            batch_with_codec(&codec, tmp.path(), &out, &small_style(), true, None).unwrap();

        assert_eq!(result.cache_stats.hits, 2);
        assert_eq!(result.cache_stats.misses, 0);
        assert_eq!(codec.decode_count(), 0);
    }

    #[test]
    fn no_cache_rerenders() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["one.png"]);
        let out = tmp.path().join("out");

        batch_with_codec(&mock(), tmp.path(), &out, &small_style(), true, None).unwrap();
        let codec = mock();
        let result =
            batch_with_codec(&codec, tmp.path(), &out, &small_style(), false, None).unwrap();

        assert_eq!(result.cache_stats.misses, 1);
        assert_eq!(codec.decode_count(), 1);
    }

    #[test]
    fn style_change_rerenders() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["one.png"]);
        let out = tmp.path().join("out");

        batch_with_codec(&mock(), tmp.path(), &out, &small_style(), true, None).unwrap();
        let restyled = StyleConfig {
            padding: 8,
            ..small_style()
        };
        let result = batch_with_codec(&mock(), tmp.path(), &out, &restyled, true, None).unwrap();
        assert_eq!(result.cache_stats.misses, 1);
    }

    #[test]
    fn renamed_source_is_copied() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["old.png"]);
        let out = tmp.path().join("out");
        batch_with_codec(&mock(), tmp.path(), &out, &small_style(), true, None).unwrap();

        fs::rename(tmp.path().join("old.png"), tmp.path().join("new.png")).unwrap();
        let codec = mock();
        let result =
            batch_with_codec(&codec, tmp.path(), &out, &small_style(), true, None).unwrap();

        assert_eq!(result.cache_stats.copies, 1);
        assert_eq!(codec.decode_count(), 0);
        assert!(out.join("new-composed.png").exists());
    }

    #[test]
    fn failures_are_collected_not_fatal() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["bad.png", "good.png"]);
        let out = tmp.path().join("out");
        let codec = mock().failing_on("bad.png");

        let result = batch_with_codec(&codec, tmp.path(), &out, &small_style(), true, None).unwrap();

        assert_eq!(result.outputs, vec![out.join("good-composed.png")]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].source, tmp.path().join("bad.png"));
        assert!(matches!(result.failures[0].error, ImageError::Codec(_)));
    }

    #[test]
    fn events_are_sent() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["a.png", "b.png", "c.png"]);
        let out = tmp.path().join("out");
        let (tx, rx) = std::sync::mpsc::channel();

        batch_with_codec(
            &mock().failing_on("b.png"),
            tmp.path(),
            &out,
            &small_style(),
            true,
            Some(tx),
        )
        .unwrap();

        let events: Vec<BatchEvent> = rx.into_iter().collect();
        assert!(matches!(events[0], BatchEvent::Started { image_count: 3 }));
        let done = events
            .iter()
            .filter(|e| matches!(e, BatchEvent::ImageDone { .. }))
            .count();
        let failed: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::ImageFailed { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(done, 2);
        assert_eq!(failed, vec![2]);
    }

    #[test]
    fn same_stem_sources_get_separate_outputs() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["shot.png", "shot.jpg"]);
        let codec = mock();

        let result =
            batch_with_codec(&codec, tmp.path(), tmp.path(), &small_style(), true, None).unwrap();

        let expected = vec![
            tmp.path().join("shot.jpg-composed.png"),
            tmp.path().join("shot.png-composed.png"),
        ];
        assert_eq!(result.outputs, expected);
        assert!(result.failures.is_empty());
        assert!(expected.iter().all(|p| p.exists()));
        let manifest = CacheManifest::load(tmp.path());
        assert_eq!(manifest.entries.len(), 2);

        // The disambiguated outputs are not picked up as sources.
        let again = mock();
        let rerun =
            batch_with_codec(&again, tmp.path(), tmp.path(), &small_style(), true, None).unwrap();
        assert_eq!(rerun.outputs, expected);
        assert_eq!(rerun.cache_stats.hits, 2);
    }

    #[test]
    fn outputs_in_source_dir_are_not_reprocessed() {
        let tmp = TempDir::new().unwrap();
        make_sources(tmp.path(), &["shot.png"]);
        let codec = mock();
        batch_with_codec(&codec, tmp.path(), tmp.path(), &small_style(), true, None).unwrap();
        assert!(tmp.path().join("shot-composed.png").exists());

        let again = mock();
        let result =
            batch_with_codec(&again, tmp.path(), tmp.path(), &small_style(), false, None).unwrap();
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(again.decode_count(), 1);
    }
}
