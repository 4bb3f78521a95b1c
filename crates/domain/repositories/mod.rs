pub mod media_storage;
pub mod videos;
