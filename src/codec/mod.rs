//! Decoding and encoding screenshots.
//!
//! The pipeline itself only ever sees decoded [`RgbaImage`]s. Everything that
//! touches files goes through the [`ImageCodec`] trait so the batch runner can
//! be exercised with a recording mock instead of real files.
//!
//! The production implementation is [`RustCodec`]: the `image` crate's pure
//! Rust decoders and encoders, statically linked.

mod rust_codec;

pub use rust_codec::{RustCodec, encode_png, supported_input_extensions};

use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Reads screenshots from disk and writes rendered images back.
pub trait ImageCodec: Sync {
    /// Decode to 8-bit RGBA, whatever the stored pixel format.
    fn decode(&self, path: &Path) -> Result<RgbaImage, CodecError>;

    /// Encode `image` to `path`, choosing the format from the extension.
    fn encode(&self, image: &RgbaImage, path: &Path) -> Result<(), CodecError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock codec that records operations instead of decoding.
    ///
    /// `decode` hands back a copy of `image` unless the file name is listed in
    /// `failing`. `encode` writes an empty placeholder so later existence checks
    /// see the output. Uses Mutex so it is Sync and works with rayon's par_iter.
    pub struct MockCodec {
        pub image: RgbaImage,
        pub failing: Vec<String>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Encode {
            output: String,
            width: u32,
            height: u32,
        },
    }

    impl MockCodec {
        pub fn new(image: RgbaImage) -> Self {
            Self {
                image,
                failing: Vec::new(),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_on(mut self, file_name: &str) -> Self {
            self.failing.push(file_name.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn decode_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Decode(_)))
                .count()
        }

        fn fails(&self, path: &Path) -> bool {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| self.failing.iter().any(|f| f == n))
        }
    }

    impl ImageCodec for MockCodec {
        fn decode(&self, path: &Path) -> Result<RgbaImage, CodecError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));
            if self.fails(path) {
                return Err(CodecError::ProcessingFailed(format!(
                    "mock decode failure for {}",
                    path.display()
                )));
            }
            Ok(self.image.clone())
        }

        fn encode(&self, image: &RgbaImage, path: &Path) -> Result<(), CodecError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                output: path.to_string_lossy().to_string(),
                width: image.width(),
                height: image.height(),
            });
            std::fs::write(path, b"")?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_decode() {
        let codec = MockCodec::new(RgbaImage::new(8, 6));
        let img = codec.decode(Path::new("/shots/a.png")).unwrap();
        assert_eq!(img.dimensions(), (8, 6));
        assert_eq!(
            codec.get_operations(),
            vec![RecordedOp::Decode("/shots/a.png".to_string())]
        );
    }

    #[test]
    fn mock_fails_on_listed_names() {
        let codec = MockCodec::new(RgbaImage::new(1, 1)).failing_on("broken.png");
        assert!(codec.decode(Path::new("/shots/broken.png")).is_err());
        assert!(codec.decode(Path::new("/shots/fine.png")).is_ok());
        assert_eq!(codec.decode_count(), 2);
    }
}
