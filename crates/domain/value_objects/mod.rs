pub mod media_upload;
pub mod videos;
