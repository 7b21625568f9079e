//! Gate middlewares.
//!
//! - `admin_page_gate`: full check with lockout, plain-text answers
//! - `security_config_gate`: Basic credentials only, JSON answers
//! - `write_gate`: bypass or Basic on mutating `/api/` calls, JSON answers

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::ip::client_ip;
use crate::security::{Admission, GateError};

pub const ADMIN_REALM: &str = "Admin";
pub const CONFIG_REALM: &str = "AdminConfig";
pub const API_REALM: &str = "Admin API";

/// A gate refusal rendered as an HTTP response.
#[derive(Debug)]
pub struct GateRejection {
    pub error: GateError,
    pub realm: &'static str,
    pub json: bool,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let status = match self.error {
            GateError::LockedOut { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::Configuration(_) => StatusCode::BAD_REQUEST,
            GateError::AuthRequired | GateError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
        };
        let message = self.error.to_string();

        let mut response = if self.json {
            (status, Json(serde_json::json!({ "error": message }))).into_response()
        } else {
            (status, message).into_response()
        };

        if status == StatusCode::UNAUTHORIZED {
            let challenge = format!("Basic realm=\"{}\"", self.realm);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

fn request_ip(state: &AppState, request: &Request<Body>) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_ip(request.headers(), peer, state.config.admin.trust_forwarded_for)
}

fn authorization(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
}

async fn finish(
    ip: &str,
    variant: &'static str,
    decision: Result<Admission, GateError>,
    realm: &'static str,
    json: bool,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match decision {
        Ok(admission) => {
            metrics::record_admin_auth(variant, admission.as_str());
            tracing::debug!(ip, variant, admission = admission.as_str(), "Admin access granted");
            request.extensions_mut().insert(admission);
            next.run(request).await
        }
        Err(error) => {
            metrics::record_admin_auth(variant, error.kind());
            tracing::warn!(ip, variant, reason = error.kind(), "Admin access denied");
            GateRejection { error, realm, json }.into_response()
        }
    }
}

pub async fn admin_page_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = request_ip(&state, &request);
    let decision = state.gate.check_admin(&ip, authorization(&request));
    finish(&ip, "admin", decision, ADMIN_REALM, false, request, next).await
}

pub async fn security_config_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = request_ip(&state, &request);
    let decision = state.gate.check_strict(authorization(&request));
    finish(&ip, "strict", decision, CONFIG_REALM, true, request, next).await
}

fn is_mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE | Method::PATCH)
}

pub async fn write_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with("/api/") || !is_mutating(request.method()) {
        return next.run(request).await;
    }
    let ip = request_ip(&state, &request);
    let decision = state.gate.check_write(&ip, authorization(&request));
    finish(&ip, "write", decision, API_REALM, true, request, next).await
}
