use crate::error::{AppError, AppResult};
use crate::external::{MediaKind, SharedMediaStore, StoredMedia};

/// Media pass-through: validates the file locally, then hands it to the
/// configured store.
#[derive(Clone)]
pub struct UploadService {
    store: SharedMediaStore,
}

impl UploadService {
    pub fn new(store: SharedMediaStore) -> Self {
        Self { store }
    }

    pub async fn upload(&self, bytes: Vec<u8>, filename: &str, kind: MediaKind) -> AppResult<StoredMedia> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(AppError::ValidationError("A file name is required".to_string()));
        }
        if bytes.is_empty() {
            return Err(AppError::ValidationError("No file received".to_string()));
        }
        kind.validate_filename(filename)?;

        log::info!("Uploading {filename} ({} bytes) as {:?}", bytes.len(), kind);
        self.store.store(bytes, filename, kind).await
    }
}
