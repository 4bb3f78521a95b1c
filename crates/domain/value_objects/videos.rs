use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::videos::{InsertVideoEntity, VideoEntity},
    value_objects::media_upload::ProcessedMediaResult,
};

/// Caller-supplied metadata that accompanies an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadVideoModel {
    pub title: String,
    pub description: String,
    pub original_size: i64,
}

impl UploadVideoModel {
    pub fn to_entity(&self, media: &ProcessedMediaResult, now: DateTime<Utc>) -> InsertVideoEntity {
        InsertVideoEntity {
            title: self.title.clone(),
            description: self.description.clone(),
            public_id: media.public_id.clone(),
            original_size: self.original_size,
            compressed_size: media.bytes.to_string(),
            duration: media.duration.unwrap_or(0.0),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub public_id: String,
    pub original_size: i64,
    pub compressed_size: String,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VideoEntity> for VideoDto {
    fn from(value: VideoEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            public_id: value.public_id,
            original_size: value.original_size,
            compressed_size: value.compressed_size,
            duration: value.duration,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
