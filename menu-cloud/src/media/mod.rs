//! Image upload pipeline
//!
//! upload bytes → validate extension/size → decode → JPEG re-encode → SHA-256
//!
//! Files are content-addressed: the hash of the re-encoded JPEG is both the
//! file name on disk and the value stored in `image_files.hash`.

mod store;

pub use store::ImageStore;

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// JPEG quality for stored images
const JPEG_QUALITY: u8 = 85;

/// Supported upload formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Empty file")]
    Empty,
    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
    #[error("Unsupported format: {0}. Supported: png, jpg, jpeg, webp")]
    UnsupportedFormat(String),
    #[error("Invalid image: {0}")]
    Decode(String),
    #[error("Image compression failed: {0}")]
    Encode(String),
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        let code = match e {
            ImageError::Empty => ErrorCode::InvalidImage,
            ImageError::TooLarge { .. } => ErrorCode::ImageTooLarge,
            ImageError::UnsupportedFormat(_) => ErrorCode::UnsupportedImageFormat,
            ImageError::Decode(_) => ErrorCode::InvalidImage,
            ImageError::Encode(_) => ErrorCode::InternalError,
        };
        AppError::with_message(code, e.to_string())
    }
}

/// A validated, re-encoded upload ready to be stored
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    /// Lower-case hex SHA-256 of `bytes`
    pub hash: String,
    /// Client-side file name, kept for display only
    pub file_name: String,
}

/// Validate and normalize an uploaded image.
///
/// CPU bound; call it from `spawn_blocking`.
pub fn process_upload(
    data: &[u8],
    file_name: &str,
    max_bytes: usize,
) -> Result<ProcessedImage, ImageError> {
    if data.is_empty() {
        return Err(ImageError::Empty);
    }
    if data.len() > max_bytes {
        return Err(ImageError::TooLarge {
            size: data.len(),
            max: max_bytes,
        });
    }

    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(ImageError::UnsupportedFormat(ext));
    }

    let img = image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
    }

    let mut hasher = Sha256::new();
    hasher.update(&buffer);
    let hash = hex::encode(hasher.finalize());

    let file_name = std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    Ok(ProcessedImage {
        bytes: buffer,
        hash,
        file_name,
    })
}

/// A stored image hash is exactly 64 hex characters; anything else never
/// reaches the filesystem.
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    pub(crate) fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 128]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_process_png_to_jpeg() {
        let processed = process_upload(&png_bytes(6, 4), "uploads/latte.PNG", 1 << 20).unwrap();
        assert_eq!(&processed.bytes[..2], &[0xFF, 0xD8]);
        assert!(is_valid_hash(&processed.hash));
        assert_eq!(processed.file_name, "latte.PNG");
    }

    #[test]
    fn test_same_input_same_hash() {
        let data = png_bytes(5, 5);
        let a = process_upload(&data, "a.png", 1 << 20).unwrap();
        let b = process_upload(&data, "b.png", 1 << 20).unwrap();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_rejects_bad_uploads() {
        assert!(matches!(
            process_upload(&[], "a.png", 10),
            Err(ImageError::Empty)
        ));
        assert!(matches!(
            process_upload(&[0u8; 11], "a.png", 10),
            Err(ImageError::TooLarge { size: 11, max: 10 })
        ));
        assert!(matches!(
            process_upload(&png_bytes(2, 2), "a.gif", 1 << 20),
            Err(ImageError::UnsupportedFormat(ext)) if ext == "gif"
        ));
        assert!(matches!(
            process_upload(b"definitely not a png", "a.png", 1 << 20),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_error_codes() {
        let err: AppError = ImageError::TooLarge { size: 2, max: 1 }.into();
        assert_eq!(err.code, ErrorCode::ImageTooLarge);
        let err: AppError = ImageError::UnsupportedFormat("bmp".into()).into();
        assert_eq!(err.code, ErrorCode::UnsupportedImageFormat);
    }

    #[test]
    fn test_hash_validation() {
        assert!(is_valid_hash(&"a".repeat(64)));
        assert!(!is_valid_hash(&"a".repeat(63)));
        assert!(!is_valid_hash(&format!("../{}", "a".repeat(61))));
        assert!(!is_valid_hash(&"g".repeat(64)));
    }
}
