use serde::Deserialize;

pub const VIDEO_UPLOAD_FOLDER: &str = "video-upload-cloudinary-saas";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Video,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Video => "video",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived rendition the media service should produce after the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerTransformation {
    pub quality: String,
    pub fetch_format: String,
}

impl EagerTransformation {
    /// Renders the transformation in URL syntax, e.g. `q_auto,f_mp4`.
    pub fn to_transformation_string(&self) -> String {
        format!("q_{},f_{}", self.quality, self.fetch_format)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUploadOptions {
    pub resource_type: ResourceType,
    pub folder: String,
    pub eager: Vec<EagerTransformation>,
    /// Derived renditions are generated in the background; the upload call
    /// returns without waiting for them.
    pub eager_async: bool,
}

impl MediaUploadOptions {
    pub fn video_with_mp4_rendition() -> Self {
        Self {
            resource_type: ResourceType::Video,
            folder: VIDEO_UPLOAD_FOLDER.to_string(),
            eager: vec![EagerTransformation {
                quality: "auto".to_string(),
                fetch_format: "mp4".to_string(),
            }],
            eager_async: true,
        }
    }

    pub fn eager_param(&self) -> Option<String> {
        if self.eager.is_empty() {
            return None;
        }

        Some(
            self.eager
                .iter()
                .map(EagerTransformation::to_transformation_string)
                .collect::<Vec<_>>()
                .join("|"),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessedMediaResult {
    pub public_id: String,
    pub bytes: i64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}
