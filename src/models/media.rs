use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// image, video, audio or document.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub filename: String,
}
