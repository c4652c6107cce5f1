//! Error types for the management API client.
//!
//! # Design
//! `NotFound` and `NoResults` get dedicated variants because callers
//! frequently distinguish "the entity does not exist" and "the list matched
//! nothing" from "the server returned an unexpected status." All other non-2xx
//! responses land in `HttpStatus` with the status line and raw body for
//! debugging. `NoResults` keeps the raw page so a caller may still decode it
//! as a valid empty list.

use thiserror::Error;

/// Errors returned by the transport and the endpoint helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404; the requested entity does not exist.
    #[error("not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status_line}")]
    HttpStatus {
        status: u16,
        status_line: String,
        body: Vec<u8>,
    },

    /// A paginated call succeeded but the server selected zero items.
    #[error("no results")]
    NoResults { body: Vec<u8> },

    /// A request payload could not be serialized or a response body could
    /// not be deserialized.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The HTTP backend failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// Client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, ApiError::NoResults { .. })
    }

    /// HTTP status code of the failed exchange, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Encoding(err.to_string())
    }
}
