//! `GET /sysinfo`: license and usage overview.

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::http::HttpMethod;

#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoRequest;

impl SysinfoRequest {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SysinfoResponse {
    pub name: String,
    #[serde(rename = "api-ver")]
    pub api_version: String,
    pub license: License,
    pub clients: ClientStats,
    pub sessions: SessionStats,
    pub standalone: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct License {
    pub name: String,
    /// Expiry as a Unix timestamp.
    #[serde(rename = "expires")]
    pub expires_timestamp: i64,
    pub has_expired: bool,
    /// Negative values are server-side sentinels (unlimited / not applicable).
    pub max_clients: i64,
    pub max_sessions: i64,
    pub max_session_time: i64,
    pub namespaces: Vec<Namespace>,
    #[serde(rename = "license-id")]
    pub id: String,
    #[serde(rename = "license-key")]
    pub key: String,
    pub api_password: String,
    pub power_user: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub size: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientStats {
    pub total: i64,
    pub online: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub total: i64,
    pub active: i64,
}

impl Endpoint for SysinfoRequest {
    type Response = SysinfoResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn resource(&self) -> String {
        "/sysinfo".to_string()
    }
}
