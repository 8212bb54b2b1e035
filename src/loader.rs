//! Load a user-chosen image file for comparison.
//!
//! The file is passed through untouched; the server decides whether it is a
//! usable image.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::compare::ImagePayload;

#[derive(Debug, Error)]
#[error("Lecture impossible de l'image '{}' : {source}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// An image read from disk, ready for preview and upload.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub payload: ImagePayload,
}

impl LoadedImage {
    /// `data:` URL of the file contents, for previews.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.payload.mime,
            STANDARD.encode(&self.payload.bytes)
        )
    }

    pub fn into_payload(self) -> ImagePayload {
        self.payload
    }
}

/// Read `path` fully into memory.
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    log::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());

    Ok(LoadedImage {
        path: path.to_path_buf(),
        payload: ImagePayload {
            bytes,
            mime: guess_mime(path).to_string(),
            file_name,
        },
    })
}

/// MIME type from the file extension, `application/octet-stream` if unknown.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}
