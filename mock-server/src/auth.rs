//! Server-side check of the `Authorization: AD ...` header.
//!
//! Implemented independently from the client crate so a signing bug on
//! either side shows up as a 401 in the integration tests.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::AppState;

const MAX_BODY: usize = 1024 * 1024;

/// Account the server accepts requests for.
#[derive(Debug, Clone)]
pub struct ServerCredentials {
    pub license_id: String,
    pub api_password: String,
}

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    MissingHeader,
    MalformedHeader,
    UnknownLicense,
    InvalidToken { expected_canonical: String },
}

impl AuthFailure {
    fn code(&self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "missing_authorization",
            AuthFailure::MalformedHeader => "malformed_authorization",
            AuthFailure::UnknownLicense => "unknown_license",
            AuthFailure::InvalidToken { .. } => "invalid_token",
        }
    }
}

pub fn canonical_string(method: &str, resource: &str, timestamp: &str, body: &[u8]) -> String {
    let hash = STANDARD.encode(Sha1::digest(body));
    format!("{}\n{resource}\n{timestamp}\n{hash}", method.to_uppercase())
}

pub fn token(canonical: &str, secret: &str) -> String {
    let mut mac = match Hmac::<Sha1>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(canonical.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Check one request's `Authorization` header against `creds`.
pub fn verify(
    creds: &ServerCredentials,
    method: &str,
    resource: &str,
    header: Option<&str>,
    body: &[u8],
) -> Result<(), AuthFailure> {
    let header = header.ok_or(AuthFailure::MissingHeader)?;
    let rest = header.strip_prefix("AD ").ok_or(AuthFailure::MalformedHeader)?;
    let mut parts = rest.splitn(3, ':');
    let (license, timestamp, given) = match (parts.next(), parts.next(), parts.next()) {
        (Some(l), Some(t), Some(g)) if t.parse::<i64>().is_ok() => (l, t, g),
        _ => return Err(AuthFailure::MalformedHeader),
    };
    if license != creds.license_id {
        return Err(AuthFailure::UnknownLicense);
    }
    let canonical = canonical_string(method, resource, timestamp, body);
    if token(&canonical, &creds.api_password) != given {
        return Err(AuthFailure::InvalidToken {
            expected_canonical: canonical,
        });
    }
    Ok(())
}

/// Middleware rejecting requests whose signature does not verify.
pub async fn require_signature(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let resource = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let header = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    if let Err(failure) = verify(&state.credentials, parts.method.as_str(), resource, header, &bytes) {
        debug!(?failure, %resource, "rejecting request");
        let body = json!({
            "result": "error",
            "code": failure.code(),
            "error": "request signature rejected",
            "method": parts.method.as_str(),
            "resource": resource,
        });
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
