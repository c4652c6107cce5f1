//! In-memory data set served by the mock API.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Peer {
    pub cid: i64,
    pub alias: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Session {
    pub sid: String,
    pub from: Peer,
    pub to: Peer,
    pub active: bool,
    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Client {
    pub cid: i64,
    pub client_version: String,
    pub alias: Option<String>,
    pub online: bool,
    pub comment: Option<String>,
    pub online_time: i64,
}

#[derive(Clone, Debug, Default)]
pub struct Store {
    pub clients: Vec<Client>,
    pub sessions: Vec<Session>,
}

/// Offset/limit/sort as requested in the query string.
#[derive(Clone, Debug)]
pub struct Paging {
    pub offset: i64,
    pub limit: i64,
    pub sort: Option<String>,
    pub descending: bool,
}

impl Paging {
    pub fn new(offset: Option<i64>, limit: Option<i64>, sort: Option<String>, order: Option<&str>) -> Self {
        Self {
            offset: offset.unwrap_or(0).max(0),
            limit: limit.unwrap_or(-1),
            sort,
            descending: order != Some("asc"),
        }
    }
}

/// Page header plus the selected items, as list endpoints report them.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub selected: i64,
    pub offset: i64,
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    pub list: Vec<T>,
}

/// Cut one page out of `items`, which are already filtered and sorted.
pub fn paginate<T>(items: Vec<T>, paging: &Paging) -> Page<T> {
    let count = items.len() as i64;
    let page: Vec<T> = items
        .into_iter()
        .skip(paging.offset as usize)
        .take(if paging.limit < 0 { usize::MAX } else { paging.limit as usize })
        .collect();
    Page {
        count,
        selected: page.len() as i64,
        offset: paging.offset,
        limit: paging.limit,
        online: None,
        list: page,
    }
}

fn ordered(ord: Ordering, descending: bool) -> Ordering {
    if descending {
        ord.reverse()
    } else {
        ord
    }
}

pub fn sort_clients(clients: &mut [Client], paging: &Paging) {
    clients.sort_by(|a, b| {
        let ord = match paging.sort.as_deref() {
            Some("alias") => a.alias.cmp(&b.alias),
            Some("online-time") => a.online_time.cmp(&b.online_time),
            Some("client-version") => a.client_version.cmp(&b.client_version),
            _ => a.cid.cmp(&b.cid),
        };
        ordered(ord, paging.descending)
    });
}

pub fn sort_sessions(sessions: &mut [Session], paging: &Paging) {
    sessions.sort_by(|a, b| {
        let ord = match paging.sort.as_deref() {
            Some("end-time") => a.end_time.cmp(&b.end_time),
            Some("duration") => a.duration.cmp(&b.duration),
            Some("sid") => a.sid.cmp(&b.sid),
            _ => a.start_time.cmp(&b.start_time),
        };
        ordered(ord, paging.descending)
    });
}

fn peer(cid: i64, alias: Option<&str>) -> Peer {
    Peer {
        cid,
        alias: alias.map(str::to_string),
    }
}

impl Store {
    /// A small address book with a handful of clients and sessions.
    pub fn seeded() -> Self {
        let clients = vec![
            Client {
                cid: 100000000,
                client_version: "1.2.3".to_string(),
                alias: Some("xyz".to_string()),
                online: true,
                comment: Some("TEST-COMMENTA".to_string()),
                online_time: 456,
            },
            Client {
                cid: 100000001,
                client_version: "5.4.0".to_string(),
                alias: None,
                online: true,
                comment: Some("TEST-02".to_string()),
                online_time: 49215,
            },
            Client {
                cid: 100000010,
                client_version: "5.5.3".to_string(),
                alias: Some("demo@ad".to_string()),
                online: false,
                comment: None,
                online_time: -1,
            },
            Client {
                cid: 100000011,
                client_version: "6.0.1".to_string(),
                alias: Some("office@ad".to_string()),
                online: false,
                comment: None,
                online_time: -1,
            },
            Client {
                cid: 100000012,
                client_version: "6.0.1".to_string(),
                alias: Some("lab@ad".to_string()),
                online: true,
                comment: Some("rack 4".to_string()),
                online_time: 3600,
            },
        ];

        let sessions = vec![
            Session {
                sid: "SESSIONA".to_string(),
                from: peer(100000000, Some("TEST_ALIAS1")),
                to: peer(100000001, None),
                active: false,
                start_time: 1590504626,
                end_time: 1590504637,
                duration: 123,
                comment: None,
            },
            Session {
                sid: "SESSIONB".to_string(),
                from: peer(100000010, None),
                to: peer(100000000, Some("TEST_ALIAS2")),
                active: true,
                start_time: 1587473919,
                end_time: 1587473931,
                duration: 321,
                comment: Some("TEST_COMMENTB".to_string()),
            },
            Session {
                sid: "SESSIONC".to_string(),
                from: peer(100000012, Some("lab@ad")),
                to: peer(100000011, Some("office@ad")),
                active: false,
                start_time: 1600000000,
                end_time: 1600000600,
                duration: 600,
                comment: None,
            },
        ];

        Self { clients, sessions }
    }

    /// The five most recent sessions `cid` took part in.
    pub fn last_sessions(&self, cid: i64) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| s.from.cid == cid || s.to.cid == cid)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sessions.truncate(5);
        sessions
    }
}
