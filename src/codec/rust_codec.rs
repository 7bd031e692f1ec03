//! Pure Rust codec on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP, TIFF) | `ImageReader::decode`, format sniffed from content |
//! | Encode → PNG | default for `.png` and unknown extensions |
//! | Encode → JPEG | alpha dropped (`to_rgb8`) |
//! | Encode → WebP | lossless |
//! | Encode → TIFF | RGBA |

use super::{CodecError, ImageCodec};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// File extensions with a decoder compiled in, lowercase.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Encode `image` as PNG in memory, e.g. for piping to a clipboard tool.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CodecError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Output format for a path, by extension. Anything unrecognized is PNG.
fn output_format(path: &Path) -> ImageFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
        Some("webp") => ImageFormat::WebP,
        Some("tif") | Some("tiff") => ImageFormat::Tiff,
        _ => ImageFormat::Png,
    }
}

fn open(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, CodecError> {
    ImageReader::open(path)?
        .with_guessed_format()
        .map_err(CodecError::Io)
}

/// Pure Rust codec using the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for RustCodec {
    fn decode(&self, path: &Path) -> Result<RgbaImage, CodecError> {
        let img = open(path)?.decode().map_err(|e| {
            CodecError::ProcessingFailed(format!("Failed to decode {}: {e}", path.display()))
        })?;
        Ok(img.to_rgba8())
    }

    fn encode(&self, image: &RgbaImage, path: &Path) -> Result<(), CodecError> {
        let format = output_format(path);
        let result = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .save_with_format(path, format),
            _ => image.save_with_format(path, format),
        };
        result.map_err(|e| {
            CodecError::ProcessingFailed(format!("Failed to encode {}: {e}", path.display()))
        })
    }
}
