use std::{sync::Arc, time::Instant};

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use bytes::Bytes;
use crates::domain::{
    repositories::{media_storage::MediaStorageClient, videos::VideoRepository},
    value_objects::videos::UploadVideoModel,
};
use tracing::{debug, info, warn};

use crate::{
    auth::Session,
    axum_http::error_responses::UploadError,
    usecases::video_upload::{UploadVideoInput, VideoUploadUseCase},
};

pub fn routes<V, M>(usecase: Arc<VideoUploadUseCase<V, M>>) -> Router
where
    V: VideoRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(upload_video::<V, M>))
        // The whole file is buffered; the outer RequestBodyLimitLayer sets the cap.
        .layer(DefaultBodyLimit::disable())
        .with_state(usecase)
}

pub async fn upload_video<V, M>(
    State(usecase): State<Arc<VideoUploadUseCase<V, M>>>,
    session: Session,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, UploadError>
where
    V: VideoRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    let user_id = usecase.authorize(&session)?;
    usecase.ensure_configured()?;

    info!(%user_id, "video_upload: request received");

    let multipart = multipart.map_err(|rejection| {
        warn!(%user_id, error = %rejection, "video_upload: body is not multipart form data");
        UploadError::MissingFile
    })?;

    let started = Instant::now();
    let form = UploadForm::read(multipart).await?;
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "video_upload: form data parsed"
    );

    let input = form.into_input()?;
    let video = usecase.upload(&user_id, input).await?;

    Ok(Json(video))
}

/// Fields collected from the multipart body. Unknown fields are ignored.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Bytes>,
    file_name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    original_size: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = UploadForm::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(err) => return Err(form_read_error(err, "next field")),
            };

            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "file" => {
                    form.file_name = field.file_name().map(str::to_string);
                    let started = Instant::now();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| form_read_error(err, "file field"))?;
                    debug!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        size_bytes = bytes.len(),
                        "video_upload: file buffered"
                    );
                    form.file = Some(bytes);
                }
                "title" | "description" | "originalSize" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|err| form_read_error(err, "text field"))?;
                    match name.as_str() {
                        "title" => form.title = Some(value),
                        "description" => form.description = Some(value),
                        _ => form.original_size = Some(value),
                    }
                }
                _ => {
                    debug!(field = %name, "video_upload: ignoring unknown form field");
                }
            }
        }

        Ok(form)
    }

    fn into_input(self) -> Result<UploadVideoInput, UploadError> {
        let file = self.file.ok_or(UploadError::MissingFile)?;
        let original_size = parse_original_size(self.original_size.as_deref())?;

        Ok(UploadVideoInput {
            file,
            file_name: self.file_name,
            metadata: UploadVideoModel {
                title: self.title.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                original_size,
            },
        })
    }
}

/// Syntax errors mean the body is not usable multipart; a body cut off by the
/// size cap or a failed read is reported as such.
fn form_read_error(err: MultipartError, stage: &str) -> UploadError {
    let status = err.status();
    warn!(error = %err, %status, stage, "video_upload: failed to read multipart body");

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::PayloadTooLarge
    } else if status.is_client_error() {
        UploadError::MissingFile
    } else {
        UploadError::BodyReadFailed
    }
}

/// Missing or blank sizes count as 0; anything else must be an integer.
fn parse_original_size(raw: Option<&str>) -> Result<i64, UploadError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value.parse::<i64>().map_err(|_| {
            warn!(value, "video_upload: originalSize is not an integer");
            UploadError::InvalidOriginalSize
        }),
    }
}
