//! Image acquisition for OCR capture
//!
//! Accepts dropped or picked files, rejects anything that is not a raster
//! image, and produces a down-scaled RGBA preview for the modal.

use image::ImageFormat;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Raster formats accepted for recognition
const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("{0} is not an image")]
    NotAnImage(String),
    #[error("{name} could not be decoded: {reason}")]
    Undecodable { name: String, reason: String },
    #[error("cannot read {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

/// The raw file handed to the recognition engine
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Original file name
    pub name: String,
    /// Sniffed image format
    pub format: ImageFormat,
    /// Unmodified file contents
    pub bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Decoded preview in RGBA8
#[derive(Clone)]
pub struct ImagePreview {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePreview")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba", &format_args!("<{} bytes>", self.rgba.len()))
            .finish()
    }
}

/// An accepted image: preview plus original file
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Distinguishes successive uploads of the same file
    pub id: Uuid,
    pub original: ImageFile,
    pub preview: ImagePreview,
}

/// Accept an image from raw bytes
///
/// No size limit is applied here. `preview_max_edge` bounds the preview only.
pub fn accept_image(
    name: &str,
    bytes: impl Into<Arc<[u8]>>,
    preview_max_edge: u32,
) -> Result<UploadedImage, AcquisitionError> {
    let bytes: Arc<[u8]> = bytes.into();

    let format = image::guess_format(&bytes)
        .ok()
        .filter(|f| ACCEPTED_FORMATS.contains(f))
        .ok_or_else(|| AcquisitionError::NotAnImage(name.to_string()))?;

    let decoded = image::load_from_memory_with_format(&bytes, format).map_err(|e| {
        AcquisitionError::Undecodable {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;

    let edge = preview_max_edge.max(1);
    let preview = if decoded.width() > edge || decoded.height() > edge {
        decoded.thumbnail(edge, edge)
    } else {
        decoded
    };
    let rgba = preview.to_rgba8();

    debug!(
        "Accepted {} ({:?}, {} bytes), preview {}x{}",
        name,
        format,
        bytes.len(),
        rgba.width(),
        rgba.height()
    );

    Ok(UploadedImage {
        id: Uuid::new_v4(),
        original: ImageFile {
            name: name.to_string(),
            format,
            bytes,
        },
        preview: ImagePreview {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        },
    })
}

/// Accept an image from a file on disk
pub fn accept_image_path(path: &Path, preview_max_edge: u32) -> Result<UploadedImage, AcquisitionError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = std::fs::read(path).map_err(|e| AcquisitionError::Unreadable {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    accept_image(&name, bytes, preview_max_edge)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    /// Encode a solid-colour PNG of the given size
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([20, 40, 60, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_accepts_png() {
        let uploaded = accept_image("photo.png", png_bytes(4, 3), 640).unwrap();

        assert_eq!(uploaded.original.name, "photo.png");
        assert_eq!(uploaded.original.format, ImageFormat::Png);
        assert_eq!(uploaded.original.mime_type(), "image/png");
        assert_eq!((uploaded.preview.width, uploaded.preview.height), (4, 3));
        assert_eq!(uploaded.preview.rgba.len(), 4 * 3 * 4);
    }

    #[test]
    fn test_keeps_original_bytes() {
        let bytes = png_bytes(2, 2);
        let uploaded = accept_image("a.png", bytes.clone(), 640).unwrap();
        assert_eq!(&*uploaded.original.bytes, bytes.as_slice());
    }

    #[test]
    fn test_preview_is_downscaled() {
        let uploaded = accept_image("big.png", png_bytes(400, 200), 100).unwrap();
        assert_eq!((uploaded.preview.width, uploaded.preview.height), (100, 50));
    }

    #[test]
    fn test_rejects_non_image() {
        let result = accept_image("notes.pdf", b"%PDF-1.7 not an image".to_vec(), 640);
        assert!(matches!(result, Err(AcquisitionError::NotAnImage(name)) if name == "notes.pdf"));
    }

    #[test]
    fn test_rejects_truncated_image() {
        let mut bytes = png_bytes(8, 8);
        bytes.truncate(24);
        let result = accept_image("broken.png", bytes, 640);
        assert!(matches!(result, Err(AcquisitionError::Undecodable { .. })));
    }

    #[test]
    fn test_accept_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, png_bytes(3, 3)).unwrap();

        let uploaded = accept_image_path(&path, 640).unwrap();
        assert_eq!(uploaded.original.name, "scan.png");

        let missing = accept_image_path(&dir.path().join("none.png"), 640);
        assert!(matches!(missing, Err(AcquisitionError::Unreadable { .. })));
    }
}
