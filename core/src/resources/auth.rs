//! `GET /auth`: checks that the credentials are accepted.

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::http::HttpMethod;

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthRequest;

impl AuthRequest {
    pub fn new() -> Self {
        Self
    }
}

/// Result of the authentication check. On failure the server fills `error`
/// and `code` and echoes what it signed, which helps diagnose bad tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AuthResponse {
    pub result: String,
    pub error: Option<String>,
    pub code: Option<String>,
    pub method: Option<String>,
    pub resource: Option<String>,
    pub request_time: Option<String>,
    pub content_hash: Option<String>,
    pub license_id: String,
}

impl AuthResponse {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

impl Endpoint for AuthRequest {
    type Response = AuthResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn resource(&self) -> String {
        "/auth".to_string()
    }
}
