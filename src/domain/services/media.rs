use std::path::Path;

use async_trait::async_trait;

use crate::domain::models::media::{MediaError, UploadOptions, UploadedMedia};

#[async_trait]
pub trait MediaUploader: 'static + Sync + Send {
    async fn upload(&self, file: &Path, options: UploadOptions)
    -> Result<UploadedMedia, MediaError>;
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;
}
