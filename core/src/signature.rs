//! Request signing primitives.
//!
//! # Design
//! Every API call carries `Authorization: AD {license}:{timestamp}:{token}`
//! where the token is a base64 HMAC-SHA1 over a canonical request string:
//!
//! ```text
//! {METHOD}\n{resource?query}\n{timestamp}\n{base64(sha1(body))}
//! ```
//!
//! The functions here are pure and know nothing about envelopes or HTTP, so
//! they can be checked directly against known fixtures.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

use crate::envelope::{unix_now, Signable};
use crate::error::ApiError;

type HmacSha1 = Hmac<Sha1>;

/// Base64 of the SHA1 digest of `body`.
pub fn body_hash(body: &[u8]) -> String {
    STANDARD.encode(Sha1::digest(body))
}

/// Build the string the request token is computed over.
///
/// `resource` must already include the encoded query string, if any. No
/// trailing newline is appended.
pub fn canonical_string(method: &str, resource: &str, timestamp: i64, body_hash: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        method.to_uppercase(),
        resource,
        timestamp,
        body_hash
    )
}

/// Base64 HMAC-SHA1 of `canonical`, keyed with the raw `secret` bytes.
pub fn token(canonical: &str, secret: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Config(format!("unusable API password: {e}")))?;
    mac.update(canonical.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Token for `request` at its own timestamp, or now when it has none.
pub fn sign<S: Signable + ?Sized>(request: &S, secret: &str) -> Result<String, ApiError> {
    let timestamp = request.timestamp().unwrap_or_else(unix_now);
    token(&request.canonical_string(timestamp), secret)
}
