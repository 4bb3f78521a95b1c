use std::{convert::Infallible, sync::Arc};

use anyhow::Result;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cookie the session issuer sets for same-site page requests.
pub const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
    pub sid: Option<String>,
}

/// Caller identity for one request. `user_id` is `None` when no valid
/// session token accompanied the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<String>,
}

impl Session {
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

        Ok(token_data.claims)
    }

    /// Resolves the session from the bearer header, then the session cookie.
    /// Any failure is treated as "no session".
    pub fn resolve(&self, headers: &HeaderMap) -> Session {
        let Some(token) = bearer_token(headers).or_else(|| cookie_token(headers)) else {
            return Session::default();
        };

        match self.verify_token(&token) {
            Ok(claims) if !claims.sub.trim().is_empty() => Session::authenticated(claims.sub),
            Ok(_) => Session::default(),
            Err(err) => {
                debug!(error = %err, "auth: session token rejected");
                Session::default()
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Middleware that resolves the caller's session once and stores it in the
/// request extensions for the route gate and handlers.
pub async fn resolve_session(
    State(verifier): State<Arc<SessionVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = verifier.resolve(request.headers());
    request.extensions_mut().insert(session);
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Session>().cloned().unwrap_or_default())
    }
}
