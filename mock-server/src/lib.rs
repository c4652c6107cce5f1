//! Stub of the AnyDesk REST management API for integration tests.
//!
//! `app` serves `/auth`, `/sysinfo`, `/clients`, `/clients/{cid}`,
//! `/sessions` and `PATCH /sessions/{sid}` from an in-memory store, behind a
//! middleware that verifies the HMAC `Authorization` header. `stub` answers
//! every request with a fixed status and body, for exercising client-side
//! status handling.

pub mod auth;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    middleware,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub use auth::ServerCredentials;
pub use store::{Client, Page, Paging, Peer, Session, Store};

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<ServerCredentials>,
    pub db: Db,
}

/// Detail view of a client, including its recent sessions.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub last_sessions: Vec<Session>,
}

#[derive(Debug, Deserialize)]
pub struct ClientQuery {
    pub online: Option<bool>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub cid: Option<i64>,
    pub direction: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentPatch {
    pub comment: Option<String>,
}

/// Full API over the seeded store.
pub fn app(credentials: ServerCredentials) -> Router {
    app_with_store(credentials, Store::seeded())
}

pub fn app_with_store(credentials: ServerCredentials, store: Store) -> Router {
    let state = AppState {
        credentials: Arc::new(credentials),
        db: Arc::new(RwLock::new(store)),
    };
    Router::new()
        .route("/auth", get(auth_check))
        .route("/sysinfo", get(sysinfo))
        .route("/clients", get(list_clients))
        .route("/clients/{cid}", get(get_client))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{sid}", axum::routing::patch(update_session_comment))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_signature))
        .with_state(state)
}

/// Router answering every request with `status` and `body`, signed or not.
pub fn stub(status: StatusCode, body: &str) -> Router {
    let body = body.to_string();
    Router::new().fallback(move |uri: Uri| {
        let body = body.clone();
        async move {
            info!(%uri, status = status.as_u16(), "stub response");
            (status, [("content-type", "application/json")], body)
        }
    })
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn auth_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "result": "success",
        "license-id": state.credentials.license_id,
    }))
}

async fn sysinfo(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    let online = db.clients.iter().filter(|c| c.online).count();
    let active = db.sessions.iter().filter(|s| s.active).count();
    Json(json!({
        "name": "AnyDesk REST",
        "api-ver": "1.1",
        "license": {
            "name": "mock license",
            "expires": 1893456000,
            "has-expired": false,
            "max-clients": -1,
            "max-sessions": 4,
            "max-session-time": -1,
            "namespaces": [{"name": "mock", "size": db.clients.len()}],
            "license-id": state.credentials.license_id,
            "license-key": "MOCK-LICENSE-KEY",
            "api-password": "",
            "power-user": false,
        },
        "clients": {"total": db.clients.len(), "online": online},
        "sessions": {"total": db.sessions.len(), "active": active},
        "standalone": false,
    }))
}

async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
) -> Json<Page<Client>> {
    let paging = Paging::new(query.offset, query.limit, query.sort, query.order.as_deref());
    let online_only = query.online.unwrap_or(false);

    let db = state.db.read().await;
    let mut clients: Vec<Client> = db
        .clients
        .iter()
        .filter(|c| !online_only || c.online)
        .cloned()
        .collect();
    store::sort_clients(&mut clients, &paging);

    let mut page = store::paginate(clients, &paging);
    page.online = Some(online_only);
    Json(page)
}

async fn get_client(
    State(state): State<AppState>,
    Path(cid): Path<i64>,
) -> Result<Json<ClientDetail>, StatusCode> {
    let db = state.db.read().await;
    let client = db
        .clients
        .iter()
        .find(|c| c.cid == cid)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ClientDetail {
        last_sessions: db.last_sessions(cid),
        client,
    }))
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<Page<Session>> {
    let paging = Paging::new(query.offset, query.limit, query.sort, query.order.as_deref());

    let db = state.db.read().await;
    let mut sessions: Vec<Session> = db
        .sessions
        .iter()
        .filter(|s| match query.cid {
            Some(cid) => match query.direction.as_deref() {
                Some("in") => s.to.cid == cid,
                Some("out") => s.from.cid == cid,
                _ => s.from.cid == cid || s.to.cid == cid,
            },
            None => true,
        })
        .filter(|s| query.from.map_or(true, |from| s.start_time >= from))
        .filter(|s| query.to.map_or(true, |to| s.start_time <= to))
        .cloned()
        .collect();
    store::sort_sessions(&mut sessions, &paging);

    Json(store::paginate(sessions, &paging))
}

async fn update_session_comment(
    State(state): State<AppState>,
    Path(sid): Path<String>,
    Json(patch): Json<CommentPatch>,
) -> StatusCode {
    let mut db = state.db.write().await;
    match db.sessions.iter_mut().find(|s| s.sid == sid) {
        Some(session) => {
            session.comment = patch.comment;
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
