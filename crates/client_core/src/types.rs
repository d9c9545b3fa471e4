use std::{fs, path::Path};

use shared::{domain::ImageMime, validation::validate_image_mime};

use crate::error::ImageLoadError;

/// An image staged for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub mime: ImageMime,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("mime", &self.mime)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    pub fn new(
        filename: impl Into<String>,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageLoadError> {
        let mime = validate_image_mime(mime_type)?;
        Ok(Self {
            filename: filename.into(),
            mime,
            bytes,
        })
    }

    /// Reads an image from disk, inferring its MIME type from the file name.
    pub fn from_path(path: &Path) -> Result<Self, ImageLoadError> {
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        let mime = validate_image_mime(mime_type)?;
        let bytes = fs::read(path).map_err(|source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            filename,
            mime,
            bytes,
        })
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
