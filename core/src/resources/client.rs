//! Client inventory: `GET /clients/{cid}` and the paginated `GET /clients`.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, ListEndpoint};
use crate::envelope::QueryParams;
use crate::http::HttpMethod;
use crate::pagination::{PaginatedResult, Pagination};

use super::session::SessionNode;

/// An AnyDesk client as listed in the address book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClientNode {
    pub cid: i64,
    pub client_version: String,
    pub alias: Option<String>,
    pub online: bool,
    pub comment: Option<String>,
    /// Seconds since the client came online; -1 while offline.
    #[serde(rename = "online-time")]
    pub online_seconds: i64,
    /// The five most recent sessions. Only filled by the detail request.
    pub last_sessions: Vec<SessionNode>,
}

impl ClientNode {
    /// When the client came online, relative to now. `None` while offline.
    pub fn online_since(&self) -> Option<SystemTime> {
        if !self.online || self.online_seconds < 0 {
            return None;
        }
        SystemTime::now().checked_sub(Duration::from_secs(self.online_seconds as u64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientDetailRequest {
    pub client_id: i64,
}

impl ClientDetailRequest {
    pub fn new(client_id: i64) -> Self {
        Self { client_id }
    }
}

impl Endpoint for ClientDetailRequest {
    type Response = ClientNode;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn resource(&self) -> String {
        format!("/clients/{}", self.client_id)
    }
}

/// Lists clients, optionally only those online.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientListRequest {
    /// Restrict the listing to online clients. `false` does not filter for
    /// offline clients; it lists all of them.
    pub online_only: bool,
    pub pagination: Pagination,
}

impl ClientListRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn online_only(mut self) -> Self {
        self.online_only = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientListResponse {
    #[serde(flatten)]
    pub page: PaginatedResult,
    pub online: bool,
    pub list: Vec<ClientNode>,
}

impl AsRef<PaginatedResult> for ClientListResponse {
    fn as_ref(&self) -> &PaginatedResult {
        &self.page
    }
}

impl Endpoint for ClientListRequest {
    type Response = ClientListResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn resource(&self) -> String {
        "/clients".to_string()
    }

    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        if self.online_only {
            query.insert("online".to_string(), "true".to_string());
        }
        query
    }

    fn pagination(&self) -> Option<&Pagination> {
        Some(&self.pagination)
    }
}

impl ListEndpoint for ClientListRequest {
    fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
    }

    fn page(response: &ClientListResponse) -> PaginatedResult {
        response.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Signable;

    #[test]
    fn detail_resource_includes_id() {
        let env = ClientDetailRequest::new(100000000).envelope().unwrap();
        assert_eq!(env.resource_with_query(), "/clients/100000000");
    }

    #[test]
    fn list_filter_becomes_query() {
        let env = ClientListRequest::new().online_only().envelope().unwrap();
        assert_eq!(env.resource_with_query(), "/clients?online=true");
        let env = ClientListRequest::new().envelope().unwrap();
        assert_eq!(env.resource_with_query(), "/clients");
    }

    #[test]
    fn decodes_detail_fixture() {
        let raw = include_str!("../../../test-vectors/client_detail.json");
        let client = ClientDetailRequest::new(100000000).decode(raw.as_bytes()).unwrap();

        assert_eq!(client.cid, 100000000);
        assert_eq!(client.alias.as_deref(), Some("xyz"));
        assert_eq!(client.client_version, "1.2.3");
        assert_eq!(client.comment.as_deref(), Some("TEST-COMMENTA"));
        assert!(client.online);
        assert_eq!(client.online_seconds, 456);
        assert_eq!(client.last_sessions.len(), 2);

        let since = client.online_since().unwrap();
        let elapsed = SystemTime::now().duration_since(since).unwrap().as_secs();
        assert!((456..=458).contains(&elapsed));

        let first = &client.last_sessions[0];
        assert_eq!(first.sid, "SESSIONA");
        assert!(!first.active);
        assert_eq!(first.from.cid, 100000000);
        assert_eq!(first.to.cid, 100000001);
    }

    #[test]
    fn decodes_list_fixture() {
        let raw = include_str!("../../../test-vectors/client_list.json");
        let resp = ClientListRequest::new().decode(raw.as_bytes()).unwrap();

        assert_eq!(
            resp.page,
            PaginatedResult {
                count: 321,
                selected: 671,
                offset: 528,
                limit: 654
            }
        );
        assert!(resp.online);
        assert_eq!(resp.list.len(), 3);

        let second = &resp.list[1];
        assert_eq!(second.cid, 122);
        assert_eq!(second.alias, None);
        assert_eq!(second.client_version, "5.4.0");
        assert_eq!(second.online_seconds, 49215);

        let last = &resp.list[2];
        assert_eq!(last.alias.as_deref(), Some("demo@ad"));
        assert!(!last.online);
        assert_eq!(last.online_since(), None);
    }
}
