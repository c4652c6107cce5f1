//! The request envelope: everything that goes into one signed API call.
//!
//! # Design
//! The fields that feed the signature (method, resource plus query,
//! timestamp, body) are exposed through the `Signable` trait so the
//! canonical string is derived the same way for every request. The
//! transport borrows the envelope mutably for the whole exchange, which
//! freezes those fields between signing and sending.
//!
//! Query parameters are kept in a sorted map. The encoded query string is
//! part of the signed resource, so its order must be stable.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::config::Credentials;
use crate::debug::DebugSnapshot;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::signature;

/// Ordered query parameters.
pub type QueryParams = BTreeMap<String, String>;

/// Current wall-clock time in whole seconds since the Unix epoch.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Form-encode `query` in key order (`a=1&b=two+words`).
pub fn encode_query(query: &QueryParams) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}

/// The inputs of the request signature.
pub trait Signable {
    fn method(&self) -> HttpMethod;

    /// Resource path with a leading slash, without query.
    fn resource(&self) -> &str;

    fn query(&self) -> Option<&QueryParams>;

    fn timestamp(&self) -> Option<i64>;

    fn body(&self) -> &[u8];

    /// The resource as signed and sent: path plus `?query` when any
    /// parameters are present.
    fn resource_with_query(&self) -> String {
        match self.query() {
            Some(query) if !query.is_empty() => {
                format!("{}?{}", self.resource(), encode_query(query))
            }
            _ => self.resource().to_string(),
        }
    }

    fn canonical_string(&self, timestamp: i64) -> String {
        signature::canonical_string(
            self.method().as_str(),
            &self.resource_with_query(),
            timestamp,
            &signature::body_hash(self.body()),
        )
    }

    fn token(&self, timestamp: i64, secret: &str) -> Result<String, ApiError> {
        signature::token(&self.canonical_string(timestamp), secret)
    }
}

/// One API request before and during signing/sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    method: HttpMethod,
    resource: String,
    query: Option<QueryParams>,
    timestamp: Option<i64>,
    body: Vec<u8>,
    debug: Option<DebugSnapshot>,
}

impl RequestEnvelope {
    pub fn new(method: HttpMethod, resource: &str) -> Self {
        Self {
            method,
            resource: resource.to_string(),
            query: None,
            timestamp: None,
            body: Vec::new(),
            debug: None,
        }
    }

    pub fn get(resource: &str) -> Self {
        Self::new(HttpMethod::Get, resource)
    }

    pub fn patch(resource: &str) -> Self {
        Self::new(HttpMethod::Patch, resource)
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.set_query(key, value);
        self
    }

    /// Insert or replace one query parameter.
    pub fn set_query(&mut self, key: &str, value: &str) {
        self.query
            .get_or_insert_with(QueryParams::new)
            .insert(key.to_string(), value.to_string());
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = Some(timestamp);
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Serialize `payload` to JSON and use it as the body.
    pub fn with_json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, ApiError> {
        self.body = serde_json::to_vec(payload)?;
        Ok(self)
    }

    /// Debug artifacts of the last exchange, if capture was enabled.
    pub fn debug(&self) -> Option<&DebugSnapshot> {
        self.debug.as_ref()
    }

    pub(crate) fn debug_mut(&mut self) -> &mut DebugSnapshot {
        self.debug.get_or_insert_with(DebugSnapshot::default)
    }

    /// Build the signed HTTP request against `credentials`.
    ///
    /// Uses the envelope's timestamp, or the current time when none is set.
    pub fn materialize(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let timestamp = self.timestamp.unwrap_or_else(unix_now);
        let token = self.token(timestamp, credentials.api_password())?;
        let authorization = format!("AD {}:{}:{}", credentials.license_id(), timestamp, token);

        Ok(HttpRequest {
            method: self.method,
            url: format!("{}{}", credentials.endpoint(), self.resource_with_query()),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), authorization),
            ],
            body: self.body.clone(),
        })
    }
}

impl Signable for RequestEnvelope {
    fn method(&self) -> HttpMethod {
        self.method
    }

    fn resource(&self) -> &str {
        &self.resource
    }

    fn query(&self) -> Option<&QueryParams> {
        self.query.as_ref()
    }

    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMESTAMP: i64 = 1445440997;

    fn credentials() -> Credentials {
        Credentials::with_endpoint("1438129266231705", "UYETICGU2CT3KES", "http://localhost:8081")
    }

    #[test]
    fn auth_request_matches_reference_token() {
        let env = RequestEnvelope::get("/auth").with_timestamp(TIMESTAMP);
        assert_eq!(
            env.canonical_string(TIMESTAMP),
            "GET\n/auth\n1445440997\n2jmj7l5rSw0yVb/vlWAYkK/YBwk="
        );
        assert_eq!(
            env.token(TIMESTAMP, "UYETICGU2CT3KES").unwrap(),
            "T2YsCOj2o3Rb79nLPUgx3Gl+nnw="
        );
    }

    #[test]
    fn materialize_sets_headers_and_url() {
        let req = RequestEnvelope::get("/auth")
            .with_timestamp(TIMESTAMP)
            .materialize(&credentials())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8081/auth");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(
            req.header("Authorization"),
            Some("AD 1438129266231705:1445440997:T2YsCOj2o3Rb79nLPUgx3Gl+nnw=")
        );
        assert!(req.body.is_empty());
    }

    #[test]
    fn query_is_appended_to_signed_resource() {
        let env = RequestEnvelope::get("/clients")
            .with_query("offset", "0")
            .with_query("limit", "-1")
            .with_timestamp(TIMESTAMP);
        assert_eq!(env.resource_with_query(), "/clients?limit=-1&offset=0");
        assert!(env
            .canonical_string(TIMESTAMP)
            .starts_with("GET\n/clients?limit=-1&offset=0\n"));

        let req = env.materialize(&credentials()).unwrap();
        assert_eq!(req.url, "http://localhost:8081/clients?limit=-1&offset=0");
    }

    #[test]
    fn query_values_are_form_encoded() {
        let env = RequestEnvelope::get("/sessions").with_query("comment", "a b&c");
        assert_eq!(env.resource_with_query(), "/sessions?comment=a+b%26c");
    }

    #[test]
    fn changing_query_value_changes_token() {
        let a = RequestEnvelope::get("/test").with_query("demo", "123");
        let b = RequestEnvelope::get("/test").with_query("demo", "124");
        assert_ne!(
            a.token(TIMESTAMP, "secret").unwrap(),
            b.token(TIMESTAMP, "secret").unwrap()
        );
    }

    #[test]
    fn signing_twice_is_deterministic() {
        let env = RequestEnvelope::patch("/sessions/abc")
            .with_json(&serde_json::json!({"comment": "x"}))
            .unwrap();
        assert_eq!(
            env.token(TIMESTAMP, "secret").unwrap(),
            env.token(TIMESTAMP, "secret").unwrap()
        );
    }

    #[test]
    fn empty_query_map_is_not_appended() {
        let mut env = RequestEnvelope::get("/auth");
        env.query = Some(QueryParams::new());
        assert_eq!(env.resource_with_query(), "/auth");
    }

    #[test]
    fn json_body_is_hashed() {
        let env = RequestEnvelope::patch("/sessions/abc")
            .with_json(&serde_json::json!({"comment": "x"}))
            .unwrap();
        let expected = signature::body_hash(br#"{"comment":"x"}"#);
        assert!(env.canonical_string(TIMESTAMP).ends_with(&expected));
    }

    #[test]
    fn materialize_without_timestamp_uses_now() {
        let before = unix_now();
        let req = RequestEnvelope::get("/auth").materialize(&credentials()).unwrap();
        let auth = req.header("Authorization").unwrap();
        let ts: i64 = auth.split(':').nth(1).unwrap().parse().unwrap();
        assert!(ts >= before && ts <= unix_now());
    }

    #[test]
    fn debug_snapshot_is_absent_until_touched() {
        let mut env = RequestEnvelope::get("/auth");
        assert!(env.debug().is_none());
        env.debug_mut().captured = true;
        assert!(env.debug().unwrap().captured);
    }
}
