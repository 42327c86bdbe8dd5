//! Image references supplied for one incident.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// A photograph of the damaged vehicle, either on disk or already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Image file on the local filesystem.
    Path(PathBuf),
    /// Encoded image bytes with a display name.
    Bytes {
        /// Name used in logs and per-image results.
        name: String,
        /// Encoded image data (JPEG, PNG, ...).
        data: Vec<u8>,
    },
}

impl ImageInput {
    /// Creates an in-memory image input.
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            name: name.into(),
            data,
        }
    }

    /// Returns the reference used to identify this image in results.
    #[must_use]
    pub fn reference(&self) -> String {
        match self {
            Self::Path(p) => p.to_string_lossy().into_owned(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    /// Reads the encoded bytes. The file handle is released before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Path(p) => {
                std::fs::read(p).with_context(|| format!("Failed to read image: {}", p.display()))
            }
            Self::Bytes { data, .. } => Ok(data.clone()),
        }
    }

    /// Guesses the MIME type from magic bytes, defaulting to JPEG.
    #[must_use]
    pub fn mime_type(data: &[u8]) -> &'static str {
        match image::guess_format(data) {
            Ok(image::ImageFormat::Png) => "image/png",
            Ok(image::ImageFormat::Gif) => "image/gif",
            Ok(image::ImageFormat::WebP) => "image/webp",
            Ok(image::ImageFormat::Bmp) => "image/bmp",
            Ok(image::ImageFormat::Tiff) => "image/tiff",
            _ => "image/jpeg",
        }
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_for_bytes_and_paths() {
        let bytes = ImageInput::from_bytes("front.jpg", vec![1, 2, 3]);
        assert_eq!(bytes.reference(), "front.jpg");

        let path = ImageInput::from(PathBuf::from("/tmp/rear.png"));
        assert_eq!(path.reference(), "/tmp/rear.png");
    }

    #[test]
    fn test_read_missing_file_errors() {
        let input = ImageInput::Path(PathBuf::from("/nonexistent/image.jpg"));
        assert!(input.read_bytes().is_err());
    }

    #[test]
    fn test_mime_type_from_magic() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageInput::mime_type(&png_magic), "image/png");
        assert_eq!(ImageInput::mime_type(b"garbage"), "image/jpeg");
    }
}
