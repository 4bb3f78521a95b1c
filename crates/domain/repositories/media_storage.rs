use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use mockall::automock;

use crate::domain::value_objects::media_upload::{MediaUploadOptions, ProcessedMediaResult};

#[automock]
#[async_trait]
pub trait MediaStorageClient {
    async fn upload_video(
        &self,
        file: Bytes,
        file_name: Option<String>,
        options: &MediaUploadOptions,
    ) -> Result<ProcessedMediaResult>;
}
