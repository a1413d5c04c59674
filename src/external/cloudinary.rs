use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};
use crate::external::{MediaKind, MediaStore, StoredMedia, mime_type_for};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    public_id: Option<String>,
    error: Option<CloudinaryErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

/// Signed uploads to Cloudinary's REST API.
#[derive(Clone)]
pub struct CloudinaryService {
    client: Client,
    config: MediaConfig,
}

impl CloudinaryService {
    pub fn new(config: MediaConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent("aula-backend/media")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.cloud_name.is_empty()
            && !self.config.api_key.is_empty()
            && !self.config.api_secret.is_empty()
    }

    fn upload_url(&self, kind: MediaKind) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/{}/upload",
            self.config.cloud_name,
            kind.resource_type()
        )
    }

    fn folder_for(&self, kind: MediaKind) -> String {
        format!("{}/{}", self.config.folder, kind.subfolder())
    }

    /// Parameters are signed in alphabetical order with the secret appended.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Sanitised file stem plus a random suffix, so re-uploading the same file
/// never overwrites the earlier asset.
fn public_id_for(filename: &str, suffix: &str) -> String {
    let stem = filename.rsplit_once('.').map(|(s, _)| s).unwrap_or(filename);
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{cleaned}_{suffix}")
}

#[async_trait]
impl MediaStore for CloudinaryService {
    async fn store(&self, bytes: Vec<u8>, filename: &str, kind: MediaKind) -> AppResult<StoredMedia> {
        if !self.is_configured() {
            return Err(AppError::ExternalApiError(
                "Media storage is not configured".to_string(),
            ));
        }

        let timestamp = chrono::Utc::now().timestamp();
        let timestamp_str = timestamp.to_string();
        let folder = self.folder_for(kind);
        let suffix = Uuid::new_v4().simple().to_string();
        let public_id = public_id_for(filename, &suffix[..12]);
        let signature = self.sign(&[
            ("folder", folder.as_str()),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp_str.as_str()),
        ]);
        let data_uri = format!(
            "data:{};base64,{}",
            mime_type_for(filename),
            STANDARD.encode(&bytes)
        );

        let form = [
            ("file", data_uri.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("timestamp", timestamp_str.as_str()),
            ("folder", folder.as_str()),
            ("public_id", public_id.as_str()),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(self.upload_url(kind))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Cloudinary request failed for {filename}: {e}");
                AppError::ExternalApiError("Failed to upload file".to_string())
            })?;

        let status = response.status();
        let body: CloudinaryUploadResponse = response.json().await.map_err(|e| {
            log::error!("Cloudinary returned an unreadable body (status={status}): {e}");
            AppError::ExternalApiError("Failed to upload file".to_string())
        })?;

        if let Some(err) = body.error {
            log::error!("Cloudinary rejected {filename}: {}", err.message);
            return Err(AppError::ExternalApiError(format!(
                "Failed to upload file: {}",
                err.message
            )));
        }

        let url = body.secure_url.or(body.url).ok_or_else(|| {
            AppError::ExternalApiError("Upload response did not include a URL".to_string())
        })?;
        log::info!("Uploaded {filename} as {:?} to {url}", kind);

        Ok(StoredMedia {
            url,
            public_id: body.public_id.unwrap_or(public_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CloudinaryService {
        CloudinaryService::new(MediaConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "abcd".into(),
            ..MediaConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_signature_is_order_independent() {
        let svc = service();
        let a = svc.sign(&[("timestamp", "1"), ("folder", "f")]);
        let b = svc.sign(&[("folder", "f"), ("timestamp", "1")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_upload_url_uses_resource_type() {
        let svc = service();
        assert_eq!(
            svc.upload_url(MediaKind::Audio),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
        assert_eq!(svc.folder_for(MediaKind::Document), "aula_click/documents");
    }

    #[test]
    fn test_public_id_is_sanitised() {
        assert_eq!(public_id_for("mi archivo.pdf", "ab12"), "mi_archivo_ab12");
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_upstream() {
        let svc = CloudinaryService::new(MediaConfig::default()).unwrap();
        let err = svc.store(vec![1], "a.png", MediaKind::Image).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApiError(_)));
    }
}
