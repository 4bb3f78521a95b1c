use anyhow::{Context, Result};
use crates::infra::media::cloudinary::DEFAULT_API_BASE_URL;
use url::Url;

use super::{
    config_model::{BackendServer, Cloudinary, Database, DotEnvyConfig, SessionConfig},
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: with_default("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
        connect_timeout: with_default("DATABASE_CONNECT_TIMEOUT", "5")
            .parse()
            .context("DATABASE_CONNECT_TIMEOUT is invalid")?,
    };

    let session = SessionConfig {
        jwt_secret: required("SESSION_JWT_SECRET")?,
    };

    let cloudinary = Cloudinary {
        cloud_name: optional("NEXT_PUBLIC_CLOUDINARY_CLOUD_NAME"),
        api_key: optional("CLOUDINARY_API_KEY"),
        api_secret: optional("CLOUDINARY_API_SECRET"),
        api_base_url: Url::parse(&with_default("CLOUDINARY_API_BASE_URL", DEFAULT_API_BASE_URL))
            .context("CLOUDINARY_API_BASE_URL is invalid")?,
        connect_timeout: with_default("CLOUDINARY_CONNECT_TIMEOUT", "10")
            .parse()
            .context("CLOUDINARY_CONNECT_TIMEOUT is invalid")?,
        upload_timeout: with_default("CLOUDINARY_UPLOAD_TIMEOUT", "300")
            .parse()
            .context("CLOUDINARY_UPLOAD_TIMEOUT is invalid")?,
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        backend_server,
        database,
        session,
        cloudinary,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} is invalid", key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn with_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}
