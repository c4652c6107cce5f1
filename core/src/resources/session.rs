//! Session history: the paginated `GET /sessions` and `PATCH /sessions/{sid}`.

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, ListEndpoint};
use crate::envelope::QueryParams;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::pagination::{PaginatedResult, Pagination};

use super::from_unix;

/// One side of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPeer {
    pub cid: i64,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SessionNode {
    pub sid: String,
    pub from: SessionPeer,
    pub to: SessionPeer,
    pub active: bool,
    #[serde(rename = "start-time")]
    pub start_timestamp: i64,
    #[serde(rename = "end-time")]
    pub end_timestamp: i64,
    /// Length in seconds.
    #[serde(rename = "duration")]
    pub duration_seconds: i64,
    pub comment: Option<String>,
}

impl SessionNode {
    pub fn start_time(&self) -> SystemTime {
        from_unix(self.start_timestamp)
    }

    pub fn end_time(&self) -> SystemTime {
        from_unix(self.end_timestamp)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds.max(0) as u64)
    }
}

/// Which sessions of a client to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDirection {
    /// Sessions the client accepted.
    Incoming,
    /// Sessions the client initiated.
    Outgoing,
    Both,
}

impl SessionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionDirection::Incoming => "in",
            SessionDirection::Outgoing => "out",
            SessionDirection::Both => "inout",
        }
    }
}

impl fmt::Display for SessionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lists sessions, optionally filtered by client, direction and time range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionListRequest {
    pub client_id: Option<i64>,
    /// Only meaningful together with `client_id`.
    pub direction: Option<SessionDirection>,
    /// Lower bound on the start time, as a Unix timestamp.
    pub from: Option<i64>,
    /// Upper bound on the start time, as a Unix timestamp.
    pub to: Option<i64>,
    pub pagination: Pagination,
}

impl SessionListRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client_id: i64, direction: SessionDirection) -> Self {
        self.client_id = Some(client_id);
        self.direction = Some(direction);
        self
    }

    pub fn between(mut self, from: i64, to: i64) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionListResponse {
    #[serde(flatten)]
    pub page: PaginatedResult,
    pub list: Vec<SessionNode>,
}

impl AsRef<PaginatedResult> for SessionListResponse {
    fn as_ref(&self) -> &PaginatedResult {
        &self.page
    }
}

impl Endpoint for SessionListRequest {
    type Response = SessionListResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn resource(&self) -> String {
        "/sessions".to_string()
    }

    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        if let Some(cid) = self.client_id {
            query.insert("cid".to_string(), cid.to_string());
            if let Some(direction) = self.direction {
                query.insert("direction".to_string(), direction.to_string());
            }
        }
        if let Some(from) = self.from {
            query.insert("from".to_string(), from.to_string());
        }
        if let Some(to) = self.to {
            query.insert("to".to_string(), to.to_string());
        }
        query
    }

    fn pagination(&self) -> Option<&Pagination> {
        Some(&self.pagination)
    }
}

impl ListEndpoint for SessionListRequest {
    fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
    }

    fn page(response: &SessionListResponse) -> PaginatedResult {
        response.page
    }
}

/// Sets or clears the comment of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommentRequest {
    pub session_id: String,
    /// `None` clears the comment.
    pub comment: Option<String>,
}

#[derive(Serialize)]
struct CommentPayload<'a> {
    comment: Option<&'a str>,
}

impl SessionCommentRequest {
    pub fn set(session_id: &str, comment: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            comment: Some(comment.to_string()),
        }
    }

    pub fn clear(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            comment: None,
        }
    }
}

impl Endpoint for SessionCommentRequest {
    type Response = ();

    fn method(&self) -> HttpMethod {
        HttpMethod::Patch
    }

    fn resource(&self) -> String {
        format!("/sessions/{}", self.session_id)
    }

    fn payload(&self) -> Result<Vec<u8>, ApiError> {
        let payload = CommentPayload {
            comment: self.comment.as_deref(),
        };
        Ok(serde_json::to_vec(&payload)?)
    }

    /// The server answers with an empty or irrelevant body.
    fn decode(&self, _body: &[u8]) -> Result<(), ApiError> {
        Ok(())
    }
}
