use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures of the video upload route. The display text is the only detail
/// the caller sees; causes are logged where they happen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Unauthorized user")]
    Unauthorized,

    #[error("Cloudinary credentials not found")]
    MisconfiguredService,

    #[error("File not found")]
    MissingFile,

    #[error("Invalid originalSize")]
    InvalidOriginalSize,

    #[error("File too large")]
    PayloadTooLarge,

    #[error("Upload video failed")]
    BodyReadFailed,

    #[error("Upload video failed")]
    UploadFailed,

    #[error("Upload video failed")]
    PersistenceFailed,
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Unauthorized => StatusCode::UNAUTHORIZED,
            UploadError::MissingFile | UploadError::InvalidOriginalSize => StatusCode::BAD_REQUEST,
            UploadError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::MisconfiguredService
            | UploadError::BodyReadFailed
            | UploadError::UploadFailed
            | UploadError::PersistenceFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_failure_to_one_status() {
        assert_eq!(UploadError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(UploadError::MissingFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::MisconfiguredService.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(UploadError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(UploadError::BodyReadFailed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(UploadError::UploadFailed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            UploadError::PersistenceFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn body_carries_only_the_fixed_message() {
        let response = UploadError::PersistenceFailed.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Upload video failed" }));
    }
}
