//! Per-resource requests and response DTOs.
//!
//! # Design
//! Each request type implements `Endpoint`; list requests also implement
//! `ListEndpoint` so `Transport::pages` can walk them. Response types mirror
//! the server's JSON (kebab-case field names) and are decoded with serde.
//! They are independent from the mock server's types; integration tests
//! catch schema drift.

pub mod auth;
pub mod client;
pub mod session;
pub mod sysinfo;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use auth::{AuthRequest, AuthResponse};
pub use client::{ClientDetailRequest, ClientListRequest, ClientListResponse, ClientNode};
pub use session::{
    SessionCommentRequest, SessionDirection, SessionListRequest, SessionListResponse, SessionNode,
    SessionPeer,
};
pub use sysinfo::{SysinfoRequest, SysinfoResponse};

/// Convert a Unix timestamp in seconds to `SystemTime`.
pub(crate) fn from_unix(seconds: i64) -> SystemTime {
    if seconds >= 0 {
        UNIX_EPOCH + Duration::from_secs(seconds as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(seconds.unsigned_abs())
    }
}
