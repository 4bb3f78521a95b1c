use crates::infra::media::cloudinary::CloudinaryConfig;
use url::Url;

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub session: SessionConfig,
    pub cloudinary: Cloudinary,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
}

/// Credentials stay optional at boot; the upload route reports their absence per request.
#[derive(Debug, Clone)]
pub struct Cloudinary {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base_url: Url,
    pub connect_timeout: u64,
    pub upload_timeout: u64,
}

impl Cloudinary {
    /// Returns a client config only when all three secrets are present.
    pub fn client_config(&self) -> Option<CloudinaryConfig> {
        match (&self.cloud_name, &self.api_key, &self.api_secret) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name: cloud_name.clone(),
                api_key: api_key.clone(),
                api_secret: api_secret.clone(),
                api_base_url: self.api_base_url.clone(),
                connect_timeout_secs: self.connect_timeout,
                upload_timeout_secs: self.upload_timeout,
            }),
            _ => None,
        }
    }
}
