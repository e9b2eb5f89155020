//! Source-file resolution: raw bytes plus a detected media type.
//!
//! The media type is sniffed from magic bytes rather than trusted from a
//! file extension — a `.png` full of garbage should fail here with a clear
//! error instead of deep inside a decoder. PDF detection checks the `%PDF`
//! header; raster formats are recognised through the `image` crate's own
//! signature table.

use crate::error::ScanError;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Detected media type of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// A raster image in the given format.
    Image(ImageFormat),
    /// A PDF document; only its first page is ever used.
    Pdf,
}

impl MediaType {
    /// Sniff the media type from the first bytes of the input.
    pub fn detect(bytes: &[u8]) -> Result<Self, ScanError> {
        if bytes.is_empty() {
            return Err(ScanError::EmptyInput);
        }
        if bytes.starts_with(b"%PDF") {
            return Ok(MediaType::Pdf);
        }
        match image::guess_format(bytes) {
            Ok(format) => Ok(MediaType::Image(format)),
            Err(_) => {
                let shown = bytes.len().min(8);
                Err(ScanError::UnsupportedFileType {
                    detail: format!("unrecognised magic bytes {:02x?}", &bytes[..shown]),
                })
            }
        }
    }

    /// MIME type string for this media type.
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Image(format) => format.to_mime_type(),
            MediaType::Pdf => "application/pdf",
        }
    }
}

/// One uploaded file: raw bytes plus its detected media type.
///
/// Ephemeral — owned for the duration of a single pipeline run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    bytes: Vec<u8>,
    media: MediaType,
}

impl SourceFile {
    /// Build a source from in-memory bytes, sniffing the media type.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ScanError> {
        let media = MediaType::detect(&bytes)?;
        debug!("Source resolved: {} ({} bytes)", media.mime(), bytes.len());
        Ok(Self { bytes, media })
    }

    /// Read a source file from disk, mapping I/O failures to typed errors.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
                path: PathBuf::from(path),
            },
            _ => ScanError::FileNotFound {
                path: PathBuf::from(path),
            },
        })?;
        Self::from_bytes(bytes)
    }

    /// Raw file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Detected media type.
    pub fn media(&self) -> MediaType {
        self.media
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal PNG: the 8-byte signature is enough for detection.
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn detects_pdf_magic() {
        let media = MediaType::detect(b"%PDF-1.7\n...").unwrap();
        assert_eq!(media, MediaType::Pdf);
        assert_eq!(media.mime(), "application/pdf");
    }

    #[test]
    fn detects_png_magic() {
        let media = MediaType::detect(PNG_MAGIC).unwrap();
        assert!(matches!(media, MediaType::Image(ImageFormat::Png)));
        assert_eq!(media.mime(), "image/png");
    }

    #[test]
    fn empty_input_is_its_own_error() {
        assert!(matches!(MediaType::detect(&[]), Err(ScanError::EmptyInput)));
    }

    #[test]
    fn unknown_magic_is_unsupported() {
        let result = MediaType::detect(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(
            result,
            Err(ScanError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn source_from_bytes_keeps_payload() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xAA; 16]);
        let source = SourceFile::from_bytes(bytes.clone()).unwrap();
        assert_eq!(source.bytes(), &bytes[..]);
    }

    #[tokio::test]
    async fn missing_path_maps_to_file_not_found() {
        let result = SourceFile::from_path("/definitely/not/a/real/file.png").await;
        assert!(matches!(result, Err(ScanError::FileNotFound { .. })));
    }
}
