//! Request gating by session state and route classification.
//!
//! Every path is a public page, a public API route, or protected. Signed-in
//! users are sent from public pages into the app; anonymous users are sent
//! from protected paths to sign-in.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::Session;

const WILDCARD_SUFFIX: &str = "(.*)";

/// A path pattern: either an exact path or a prefix followed by `(.*)`.
/// Exact patterns also accept the same path with one trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    Prefix(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix(WILDCARD_SUFFIX) {
            Some(prefix) => RoutePattern::Prefix(prefix.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => {
                path == exact || path.strip_suffix('/') == Some(exact.as_str())
            }
            RoutePattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    PublicPage,
    PublicApi,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectTo(String),
}

#[derive(Debug, Clone)]
pub struct RouteGate {
    public_pages: Vec<RoutePattern>,
    public_api_routes: Vec<RoutePattern>,
    dashboard_path: String,
    sign_in_path: String,
    sign_up_path: String,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::new(&["/", "/sign-in", "/sign-up"], &["/api/videos", "/api/health-check"])
    }
}

impl RouteGate {
    pub fn new(public_pages: &[&str], public_api_routes: &[&str]) -> Self {
        Self {
            public_pages: public_pages.iter().map(|p| RoutePattern::parse(p)).collect(),
            public_api_routes: public_api_routes
                .iter()
                .map(|p| RoutePattern::parse(p))
                .collect(),
            dashboard_path: "/home".to_string(),
            sign_in_path: "/sign-in".to_string(),
            sign_up_path: "/sign-up".to_string(),
        }
    }

    pub fn classify_route(&self, path: &str) -> RouteClass {
        if self.public_pages.iter().any(|p| p.matches(path)) {
            RouteClass::PublicPage
        } else if self.public_api_routes.iter().any(|p| p.matches(path)) {
            RouteClass::PublicApi
        } else {
            RouteClass::Protected
        }
    }

    pub fn classify(&self, path: &str, has_session: bool) -> GateDecision {
        let class = self.classify_route(path);

        if has_session {
            let is_app_entry = path == self.dashboard_path
                || path == self.sign_in_path
                || path == self.sign_up_path;

            if class == RouteClass::PublicPage && !is_app_entry {
                return GateDecision::RedirectTo(self.dashboard_path.clone());
            }
            return GateDecision::Allow;
        }

        // Non-public API paths are Protected too, so one rule covers pages and API.
        if class == RouteClass::Protected {
            return GateDecision::RedirectTo(self.sign_in_path.clone());
        }

        GateDecision::Allow
    }

    /// Static assets and framework-internal paths bypass the gate; API paths never do.
    pub fn applies_to(path: &str) -> bool {
        if path.starts_with("/api") || path.starts_with("/trpc") {
            return true;
        }
        !(path.contains('.') || path.starts_with("/_next"))
    }
}

pub async fn gate(
    State(route_gate): State<Arc<RouteGate>>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if !RouteGate::applies_to(&path) {
        return next.run(request).await;
    }

    match route_gate.classify(&path, session.is_authenticated()) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectTo(location) => {
            debug!(%path, %location, "route_gate: redirecting request");
            redirect(&location)
        }
    }
}

fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
