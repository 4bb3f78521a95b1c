use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::videos::{InsertVideoEntity, VideoEntity};

#[automock]
#[async_trait]
pub trait VideoRepository {
    async fn insert(&self, insert_video_entity: InsertVideoEntity) -> Result<VideoEntity>;
}
