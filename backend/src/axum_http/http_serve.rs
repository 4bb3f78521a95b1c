use crate::{
    auth::{SessionVerifier, resolve_session},
    axum_http::{
        default_routers,
        route_gate::{RouteGate, gate},
        routers,
    },
    config::config_model::DotEnvyConfig,
    usecases::video_upload::VideoUploadUseCase,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    routing::get,
};
use crates::{
    domain::repositories::{media_storage::MediaStorageClient, videos::VideoRepository},
    infra::{
        db::{postgres::postgres_connection::PgPoolSquad, repositories::videos::VideoPostgres},
        media::cloudinary::CloudinaryClient,
    },
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let video_repository = VideoPostgres::new(Arc::clone(&db_pool));

    let media_storage = match config.cloudinary.client_config() {
        Some(cloudinary_config) => Some(Arc::new(CloudinaryClient::new(cloudinary_config)?)),
        None => {
            warn!("Cloudinary credentials are missing; uploads will be rejected");
            None
        }
    };

    let video_upload_usecase = Arc::new(VideoUploadUseCase::new(
        Arc::new(video_repository),
        media_storage,
    ));

    let app = build_router(
        &config,
        video_upload_usecase,
        Arc::new(SessionVerifier::new(&config.session.jwt_secret)),
        Arc::new(RouteGate::default()),
    )?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(stage = %config.stage, "Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has stopped accepting requests");
    Ok(())
}

pub fn build_router<V, M>(
    config: &DotEnvyConfig,
    video_upload_usecase: Arc<VideoUploadUseCase<V, M>>,
    session_verifier: Arc<SessionVerifier>,
    route_gate: Arc<RouteGate>,
) -> Result<Router>
where
    V: VideoRepository + Send + Sync + 'static,
    M: MediaStorageClient + Send + Sync + 'static,
{
    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/video-upload",
            routers::video_upload::routes(video_upload_usecase),
        )
        .route("/api/health-check", get(default_routers::health_check))
        .layer(from_fn_with_state(route_gate, gate))
        .layer(from_fn_with_state(session_verifier, resolve_session))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        config_model::{BackendServer, Cloudinary, Database, SessionConfig},
        stage::Stage,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::LOCATION},
    };
    use crates::domain::repositories::{
        media_storage::MockMediaStorageClient, videos::MockVideoRepository,
    };
    use jsonwebtoken::{EncodingKey, Header, encode};
    use tower::ServiceExt;
    use url::Url;

    const SECRET: &str = "router-test-secret";

    fn config() -> DotEnvyConfig {
        DotEnvyConfig {
            stage: Stage::Local,
            backend_server: BackendServer {
                port: 0,
                body_limit: 10,
                timeout: 30,
            },
            database: Database {
                url: "postgres://localhost:5432/db".to_string(),
                max_connections: 1,
                connect_timeout: 1,
            },
            session: SessionConfig {
                jwt_secret: SECRET.to_string(),
            },
            cloudinary: Cloudinary {
                cloud_name: None,
                api_key: None,
                api_secret: None,
                api_base_url: Url::parse("https://api.cloudinary.com").unwrap(),
                connect_timeout: 10,
                upload_timeout: 300,
            },
        }
    }

    fn app() -> Router {
        app_with(config())
    }

    fn app_with(config: DotEnvyConfig) -> Router {
        let mut video_repo = MockVideoRepository::new();
        video_repo.expect_insert().times(0);
        let mut media = MockMediaStorageClient::new();
        media.expect_upload_video().times(0);

        build_router(
            &config,
            Arc::new(VideoUploadUseCase::new(
                Arc::new(video_repo),
                Some(Arc::new(media)),
            )),
            Arc::new(SessionVerifier::new(SECRET)),
            Arc::new(RouteGate::default()),
        )
        .unwrap()
    }

    fn bearer(sub: &str) -> String {
        let claims = crate::auth::SessionClaims {
            sub: sub.to_string(),
            exp: 9999999999,
            sid: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        format!("Bearer {}", token)
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/health-check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn anonymous_upload_is_redirected_to_sign_in() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/video-upload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/sign-in");
    }

    #[tokio::test]
    async fn signed_in_upload_without_file_reaches_handler() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/video-upload")
                    .header(AUTHORIZATION, bearer("user_1"))
                    .header(CONTENT_TYPE, "multipart/form-data; boundary=B")
                    .body(Body::from("--B--\r\n"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_streamed_upload_is_rejected_as_too_large() {
        let mut config = config();
        config.backend_server.body_limit = 1;

        let mut body = b"--B\r\nContent-Disposition: form-data; name=\"file\"; filename=\"clip.mp4\"\r\nContent-Type: video/mp4\r\n\r\n".to_vec();
        body.extend(std::iter::repeat_n(0u8, 2 * 1024 * 1024));
        body.extend_from_slice(b"\r\n--B--\r\n");

        // No Content-Length header, so the cap is only hit while streaming.
        let response = app_with(config)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/video-upload")
                    .header(AUTHORIZATION, bearer("user_1"))
                    .header(CONTENT_TYPE, "multipart/form-data; boundary=B")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "File too large");
    }

    #[tokio::test]
    async fn signed_in_landing_request_goes_to_dashboard() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(AUTHORIZATION, bearer("user_1"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/home");
    }
}
