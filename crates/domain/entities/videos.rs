use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::videos;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = videos)]
pub struct VideoEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub public_id: String, // Cloudinary public_id, example: video-upload-cloudinary-saas/abc123
    pub original_size: i64,
    pub compressed_size: String, // byte count as text, kept for existing consumers
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = videos)]
pub struct InsertVideoEntity {
    pub title: String,
    pub description: String,
    pub public_id: String,
    pub original_size: i64,
    pub compressed_size: String,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
