use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error};
use url::Url;

use crate::domain::{
    repositories::media_storage::MediaStorageClient,
    value_objects::media_upload::{MediaUploadOptions, ProcessedMediaResult},
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: Url,
    pub connect_timeout_secs: u64,
    pub upload_timeout_secs: u64,
}

/// Signed-upload client for the Cloudinary Upload API.
pub struct CloudinaryClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base_url: Url,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorEnvelope {
    error: CloudinaryErrorDetails,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetails {
    message: Option<String>,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()
            .context("failed to build Cloudinary http client")?;

        Ok(Self {
            http,
            cloud_name: config.cloud_name,
            api_key: config.api_key,
            api_secret: config.api_secret,
            api_base_url: config.api_base_url,
        })
    }

    fn upload_url(&self, options: &MediaUploadOptions) -> Result<Url> {
        // https://cloudinary.com/documentation/image_upload_api_reference#upload
        self.api_base_url
            .join(&format!(
                "v1_1/{}/{}/upload",
                self.cloud_name, options.resource_type
            ))
            .context("failed to build Cloudinary upload url")
    }

    async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let cloudinary_error_message = serde_json::from_str::<CloudinaryErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.error.message);

        error!(
            status = %status,
            cloudinary_error_message = ?cloudinary_error_message,
            response_body = %body,
            "cloudinary: upload request failed"
        );

        anyhow::bail!("Cloudinary upload request failed (status {})", status);
    }
}

#[async_trait]
impl MediaStorageClient for CloudinaryClient {
    async fn upload_video(
        &self,
        file: Bytes,
        file_name: Option<String>,
        options: &MediaUploadOptions,
    ) -> Result<ProcessedMediaResult> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let params = signed_params(options, &timestamp);
        let signature = sign_params(&params, &self.api_secret);

        let file_len = file.len() as u64;
        let file_part = Part::stream_with_length(file, file_len)
            .file_name(file_name.unwrap_or_else(|| "blob".to_string()));

        let mut form = Form::new().part("file", file_part);
        for (key, value) in params {
            form = form.text(key, value);
        }
        form = form
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = self.upload_url(options)?;
        debug!(%url, folder = %options.folder, "cloudinary: sending upload request");

        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        let resp = Self::ensure_success(resp).await?;
        let result = resp
            .json::<ProcessedMediaResult>()
            .await
            .context("failed to decode Cloudinary upload response")?;

        Ok(result)
    }
}

/// Parameters that take part in the request signature, sorted by key.
fn signed_params(options: &MediaUploadOptions, timestamp: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("folder", options.folder.clone()),
        ("timestamp", timestamp.to_string()),
    ];

    if let Some(eager) = options.eager_param() {
        params.push(("eager", eager));
    }
    if options.eager_async {
        params.push(("eager_async", "true".to_string()));
    }

    params.sort_by(|a, b| a.0.cmp(b.0));
    params
}

/// https://cloudinary.com/documentation/authentication_signatures
fn sign_params(params: &[(&'static str, String)], api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

// Never echo the request url: it carries the cloud name and the signed form.
fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("cloudinary upload request timed out");
    }
    if error.is_connect() {
        return anyhow!("cloudinary connection failed");
    }
    anyhow!("cloudinary upload request failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CloudinaryClient {
        CloudinaryClient::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).unwrap(),
            connect_timeout_secs: 10,
            upload_timeout_secs: 300,
        })
        .unwrap()
    }

    #[test]
    fn signed_params_are_sorted_and_include_eager() {
        let options = MediaUploadOptions::video_with_mp4_rendition();

        let params = signed_params(&options, "1700000000");
        let keys: Vec<&str> = params.iter().map(|(key, _)| *key).collect();

        assert_eq!(keys, vec!["eager", "eager_async", "folder", "timestamp"]);
        assert_eq!(params[0].1, "q_auto,f_mp4");
        assert_eq!(params[1].1, "true");
    }

    #[test]
    fn signature_is_sha256_of_joined_params_and_secret() {
        let params = vec![
            ("folder", "videos".to_string()),
            ("timestamp", "1700000000".to_string()),
        ];

        let mut hasher = Sha256::new();
        hasher.update(b"folder=videos&timestamp=1700000000secret");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(sign_params(&params, "secret"), expected);
        assert_ne!(sign_params(&params, "other"), expected);
    }

    #[test]
    fn upload_url_targets_video_endpoint() {
        let options = MediaUploadOptions::video_with_mp4_rendition();

        let url = client().upload_url(&options).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
    }

    // Manual check: export Cloudinary credentials and place `test-video.mp4`
    // in the workspace root, then run:
    // cargo test -p crates cloudinary::tests::upload_real_video -- --ignored --nocapture
    #[tokio::test]
    #[ignore = "hits real Cloudinary and needs local test file + credentials"]
    async fn upload_real_video() -> Result<()> {
        dotenvy::dotenv().ok();

        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .map(std::path::Path::to_path_buf)
            .context("workspace root")?;
        let bytes = tokio::fs::read(root.join("test-video.mp4")).await?;

        let client = CloudinaryClient::new(CloudinaryConfig {
            cloud_name: std::env::var("NEXT_PUBLIC_CLOUDINARY_CLOUD_NAME")?,
            api_key: std::env::var("CLOUDINARY_API_KEY")?,
            api_secret: std::env::var("CLOUDINARY_API_SECRET")?,
            api_base_url: Url::parse(DEFAULT_API_BASE_URL)?,
            connect_timeout_secs: 10,
            upload_timeout_secs: 300,
        })?;

        let result = client
            .upload_video(
                Bytes::from(bytes),
                Some("test-video.mp4".to_string()),
                &MediaUploadOptions::video_with_mp4_rendition(),
            )
            .await?;
        println!("uploaded video {} ({} bytes)", result.public_id, result.bytes);

        Ok(())
    }
}
