use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain::{
        entities::videos::{InsertVideoEntity, VideoEntity},
        repositories::videos::VideoRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::videos},
};

pub struct VideoPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl VideoPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl VideoRepository for VideoPostgres {
    async fn insert(&self, insert_video_entity: InsertVideoEntity) -> Result<VideoEntity> {
        // Diesel is synchronous; keep the checkout and insert off the async workers.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<VideoEntity> {
            let mut conn = db_pool.get()?;

            let result = insert_into(videos::table)
                .values(&insert_video_entity)
                .returning(VideoEntity::as_returning())
                .get_result::<VideoEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }
}
