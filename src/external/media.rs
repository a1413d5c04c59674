use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// What an uploaded file is used for. Unknown kinds are stored as documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Document,
        }
    }

    /// Storage resource class. Audio is stored with the video class.
    pub fn resource_type(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video | MediaKind::Audio => "video",
            MediaKind::Document => "raw",
        }
    }

    pub fn subfolder(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
            MediaKind::Audio => "audios",
            MediaKind::Document => "documents",
        }
    }

    /// Rejects a file name whose extension does not suit this kind.
    /// Only images are restricted.
    pub fn validate_filename(&self, filename: &str) -> AppResult<()> {
        if *self != MediaKind::Image {
            return Ok(());
        }
        match file_extension(filename) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(AppError::ValidationError(format!(
                "Invalid image format. Allowed: {}",
                IMAGE_EXTENSIONS.join(", ")
            ))),
        }
    }
}

pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn mime_type_for(filename: &str) -> &'static str {
    match file_extension(filename).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
}

/// Remote media storage. The returned URL is public and permanent.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, bytes: Vec<u8>, filename: &str, kind: MediaKind) -> AppResult<StoredMedia>;
}

pub type SharedMediaStore = Arc<dyn MediaStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(MediaKind::from_param("image").resource_type(), "image");
        assert_eq!(MediaKind::from_param("VIDEO").resource_type(), "video");
        assert_eq!(MediaKind::from_param("audio").resource_type(), "video");
        assert_eq!(MediaKind::from_param("document").resource_type(), "raw");
        assert_eq!(MediaKind::from_param("auto"), MediaKind::Document);
    }

    #[test]
    fn test_image_extension_check() {
        assert!(MediaKind::Image.validate_filename("yape.PNG").is_ok());
        assert!(MediaKind::Image.validate_filename("photo.webp").is_ok());
        assert!(MediaKind::Image.validate_filename("notes.pdf").is_err());
        assert!(MediaKind::Image.validate_filename("noext").is_err());
        assert!(MediaKind::Document.validate_filename("notes.pdf").is_ok());
        assert!(MediaKind::Audio.validate_filename("anything").is_ok());
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_type_for("a.docx"), "application/octet-stream");
    }
}
