//! Credentials and client configuration.
//!
//! # Design
//! `Credentials` is immutable once handed to a `Transport`. `ClientConfig`
//! adds the knobs that belong to the HTTP stack rather than the protocol
//! (timeout) plus the initial state of the debug switch. Both can be loaded
//! from `ANYDESK_*` environment variables.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

/// Public endpoint used by professional licenses.
pub const DEFAULT_ENDPOINT: &str = "https://v1.api.anydesk.com:8081";

pub const ENV_LICENSE_ID: &str = "ANYDESK_LICENSE_ID";
pub const ENV_API_PASSWORD: &str = "ANYDESK_API_PASSWORD";
pub const ENV_API_ENDPOINT: &str = "ANYDESK_API_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "ANYDESK_TIMEOUT_SECS";
pub const ENV_DEBUG: &str = "ANYDESK_DEBUG";

/// License id, API password and endpoint for one API account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    license_id: String,
    api_password: String,
    endpoint: String,
}

impl Credentials {
    /// Credentials against the default public endpoint.
    pub fn new(license_id: &str, api_password: &str) -> Self {
        Self::with_endpoint(license_id, api_password, DEFAULT_ENDPOINT)
    }

    /// Credentials against a custom (e.g. enterprise) endpoint.
    pub fn with_endpoint(license_id: &str, api_password: &str, endpoint: &str) -> Self {
        Self {
            license_id: license_id.to_string(),
            api_password: api_password.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn license_id(&self) -> &str {
        &self.license_id
    }

    pub fn api_password(&self) -> &str {
        &self.api_password
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("license_id", &self.license_id)
            .field("api_password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Everything needed to construct a `Transport`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    /// Applied to the HTTP agent; `None` leaves the agent's default.
    pub timeout: Option<Duration>,
    /// Initial state of the transport's debug switch.
    pub debug: bool,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout: None,
            debug: false,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::Config(format!("{key} is not set")))
        };
        let license_id = required(ENV_LICENSE_ID)?;
        let api_password = required(ENV_API_PASSWORD)?;
        let endpoint = lookup(ENV_API_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::Config(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}")))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let debug = lookup(ENV_DEBUG)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            credentials: Credentials::with_endpoint(&license_id, &api_password, &endpoint),
            timeout,
            debug,
        })
    }
}
