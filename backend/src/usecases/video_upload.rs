use std::{sync::Arc, time::Instant};

use bytes::Bytes;
use chrono::Utc;
use crates::domain::{
    repositories::{media_storage::MediaStorageClient, videos::VideoRepository},
    value_objects::{
        media_upload::MediaUploadOptions,
        videos::{UploadVideoModel, VideoDto},
    },
};
use tracing::{debug, error, info, warn};

use crate::{auth::Session, axum_http::error_responses::UploadError};

#[derive(Debug, Clone)]
pub struct UploadVideoInput {
    pub file: Bytes,
    pub file_name: Option<String>,
    pub metadata: UploadVideoModel,
}

pub struct VideoUploadUseCase<V, M>
where
    V: VideoRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    video_repository: Arc<V>,
    media_storage: Option<Arc<M>>,
    upload_options: MediaUploadOptions,
}

impl<V, M> VideoUploadUseCase<V, M>
where
    V: VideoRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    /// `media_storage` is `None` when the media service credentials are not configured.
    pub fn new(video_repository: Arc<V>, media_storage: Option<Arc<M>>) -> Self {
        Self {
            video_repository,
            media_storage,
            upload_options: MediaUploadOptions::video_with_mp4_rendition(),
        }
    }

    pub fn authorize(&self, session: &Session) -> Result<String, UploadError> {
        session.user_id.clone().ok_or_else(|| {
            warn!("video_upload: request without session");
            UploadError::Unauthorized
        })
    }

    pub fn ensure_configured(&self) -> Result<(), UploadError> {
        self.media_storage_client().map(|_| ())
    }

    fn media_storage_client(&self) -> Result<&Arc<M>, UploadError> {
        self.media_storage.as_ref().ok_or_else(|| {
            error!("video_upload: Cloudinary credentials are not configured");
            UploadError::MisconfiguredService
        })
    }

    /// Uploads the buffered file, then records it. A record is written only
    /// after the remote upload succeeded; a failed insert leaves the remote
    /// media in place.
    pub async fn upload(
        &self,
        user_id: &str,
        input: UploadVideoInput,
    ) -> Result<VideoDto, UploadError> {
        let media_storage = self.media_storage_client()?;

        info!(
            %user_id,
            size_bytes = input.file.len(),
            folder = %self.upload_options.folder,
            "video_upload: uploading to media service"
        );

        let started = Instant::now();
        let media = media_storage
            .upload_video(input.file, input.file_name, &self.upload_options)
            .await
            .map_err(|err| {
                error!(%user_id, error = ?err, "video_upload: media upload failed");
                UploadError::UploadFailed
            })?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            public_id = %media.public_id,
            secure_url = ?media.secure_url,
            format = ?media.format,
            "video_upload: media upload finished"
        );

        let started = Instant::now();
        let entity = input.metadata.to_entity(&media, Utc::now());
        let video = self
            .video_repository
            .insert(entity)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    public_id = %media.public_id,
                    db_error = ?err,
                    "video_upload: failed to insert video record"
                );
                warn!(
                    public_id = %media.public_id,
                    "video_upload: remote media left without a record"
                );
                UploadError::PersistenceFailed
            })?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            video_id = %video.id,
            "video_upload: video record inserted"
        );

        info!(%user_id, video_id = %video.id, public_id = %video.public_id, "video_upload: completed");
        Ok(VideoDto::from(video))
    }
}
