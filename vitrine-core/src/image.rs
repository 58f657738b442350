use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::DEFAULT_MAX_IMAGE_BYTES;

/// Error type for image encoding.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{name} is not an image (content type {content_type:?})")]
    InvalidType { name: String, content_type: String },
    #[error("{name} is too large: {size} bytes, the limit is {max} bytes")]
    TooLarge { name: String, size: u64, max: u64 },
    #[error("{name} cannot be stored: this catalog only keeps image links")]
    Unsupported { name: String },
    #[error("could not read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where the bytes of an [`ImageFile`] live.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file picked by the admin, described by its declared metadata.
///
/// The bytes are not read until the file is encoded.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub source: ImageSource,
}

impl ImageFile {
    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            source: ImageSource::Bytes(bytes),
        }
    }

    /// Describes a file on disk. The content type is derived from the extension.
    ///
    /// A missing or unreadable file is reported when it is encoded.
    pub async fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);

        Self {
            content_type: content_type_for(path).to_string(),
            name,
            size,
            source: ImageSource::Path(path.to_path_buf()),
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
            ImageSource::Path(path) => tokio::fs::read(path).await,
        }
    }
}

/// Maps a file extension to an image content type.
///
/// Unknown extensions map to `application/octet-stream`, which the encoder rejects.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// An image attached to a submission: a file to store, or a link to keep as-is.
#[derive(Debug, Clone)]
pub enum ImageInput {
    File(ImageFile),
    Url(String),
}

impl ImageInput {
    /// A human-readable name for notifications.
    pub fn label(&self) -> &str {
        match self {
            ImageInput::File(file) => &file.name,
            ImageInput::Url(url) => url,
        }
    }
}

/// The validated contents of an image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Renders the image as `data:{content_type};base64,{payload}`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Validates image files and reads their contents.
#[derive(Debug, Clone, Copy)]
pub struct ImageEncoder {
    max_bytes: u64,
}

impl Default for ImageEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}

impl ImageEncoder {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks the declared type and size without reading the file.
    pub fn check(&self, file: &ImageFile) -> Result<(), ImageError> {
        if !file.is_image() {
            return Err(ImageError::InvalidType {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
            });
        }
        self.check_size(&file.name, file.size)
    }

    fn check_size(&self, name: &str, size: u64) -> Result<(), ImageError> {
        if size > self.max_bytes {
            return Err(ImageError::TooLarge {
                name: name.to_string(),
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Encodes a file, or returns `None` when no file was given.
    pub async fn encode(&self, file: Option<&ImageFile>) -> Result<Option<EncodedImage>, ImageError> {
        match file {
            Some(file) => self.encode_file(file).await.map(Some),
            None => Ok(None),
        }
    }

    /// Validates `file` and reads its contents.
    #[instrument(skip_all, fields(file = %file.name))]
    pub async fn encode_file(&self, file: &ImageFile) -> Result<EncodedImage, ImageError> {
        self.check(file)?;

        let bytes = file.read().await.map_err(|source| ImageError::Io {
            name: file.name.clone(),
            source,
        })?;
        // The declared size may be stale for files on disk.
        self.check_size(&file.name, bytes.len() as u64)?;

        debug!(bytes = bytes.len(), "Encoded image");

        Ok(EncodedImage {
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn encode_none_is_empty() {
        let encoder = ImageEncoder::default();
        assert!(encoder.encode(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn encode_produces_data_uri() {
        let encoder = ImageEncoder::default();
        let file = ImageFile::from_bytes("dot.png", "image/png", b"abc".to_vec());

        let encoded = encoder.encode(Some(&file)).await.unwrap().unwrap();

        assert_eq!(encoded.data_uri(), "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn encode_rejects_non_images() {
        let encoder = ImageEncoder::default();
        let file = ImageFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec());

        let err = encoder.encode(Some(&file)).await.unwrap_err();

        assert!(matches!(err, ImageError::InvalidType { ref content_type, .. } if content_type == "text/plain"));
    }

    #[tokio::test]
    async fn encode_rejects_oversized_files_with_both_sizes() {
        let encoder = ImageEncoder::new(4);
        let file = ImageFile::from_bytes("big.png", "image/png", vec![0; 5]);

        let err = encoder.encode(Some(&file)).await.unwrap_err();

        assert!(matches!(err, ImageError::TooLarge { size: 5, max: 4, .. }));
        let message = err.to_string();
        assert!(message.contains('5') && message.contains('4'));
    }

    #[tokio::test]
    async fn encode_reads_from_disk() {
        let mut tmp = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        tmp.write_all(b"jpeg bytes").unwrap();

        let file = ImageFile::from_path(tmp.path()).await;
        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.size, 10);

        let encoded = ImageEncoder::default().encode(Some(&file)).await.unwrap().unwrap();
        assert_eq!(encoded.bytes, b"jpeg bytes");
    }

    #[tokio::test]
    async fn encode_reports_unreadable_source() {
        let file = ImageFile::from_path("/nonexistent/vitrine/gone.png").await;
        assert_eq!(file.size, 0);

        let err = ImageEncoder::default().encode(Some(&file)).await.unwrap_err();

        assert!(matches!(err, ImageError::Io { ref name, .. } if name == "gone.png"));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("a.txt")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }
}
