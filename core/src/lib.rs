//! Blocking client for the AnyDesk REST management API.
//!
//! # Overview
//! Every call is authenticated with `Authorization: AD {license}:{ts}:{token}`
//! where the token is an HMAC-SHA1 over a canonical request string. This
//! crate builds that signature, executes the request and classifies the
//! outcome; list endpoints additionally speak the offset/limit pagination
//! protocol.
//!
//! # Design
//! - `signature` is pure: canonical string, body hash, token.
//! - `RequestEnvelope` holds one request's signed fields and its debug
//!   snapshot; the `Signable` trait exposes what the signature covers.
//! - `Transport` owns credentials, the `HttpBackend` and a `DebugSwitch`,
//!   and turns an envelope into raw response bytes or an `ApiError`.
//! - `Pagination` is a value passed to paginated calls; `next_page` decides
//!   whether another page exists.
//! - Resource requests in `resources` implement `Endpoint` and only describe
//!   themselves; they never touch the network directly.
//!
//! ```no_run
//! use anydesk_core::{AuthRequest, ClientConfig, Credentials, Transport};
//!
//! let config = ClientConfig::new(Credentials::new("1438129266231705", "secret"));
//! let api = Transport::new(config);
//! let auth = api.send(&AuthRequest::new())?;
//! println!("{} {}", auth.result, auth.license_id);
//! # Ok::<(), anydesk_core::ApiError>(())
//! ```

pub mod config;
pub mod debug;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod http;
pub mod pagination;
pub mod resources;
pub mod signature;
pub mod transport;

pub use config::{ClientConfig, Credentials, DEFAULT_ENDPOINT};
pub use debug::{DebugSnapshot, DebugSwitch};
pub use endpoint::{Endpoint, ListEndpoint};
pub use envelope::{QueryParams, RequestEnvelope, Signable};
pub use error::ApiError;
pub use http::{HttpBackend, HttpMethod, HttpRequest, HttpResponse, UreqBackend};
pub use pagination::{next_page, PaginatedResult, Pagination, SortOrder, UNBOUNDED};
pub use resources::{
    AuthRequest, AuthResponse, ClientDetailRequest, ClientListRequest, ClientListResponse,
    ClientNode, SessionCommentRequest, SessionDirection, SessionListRequest, SessionListResponse,
    SessionNode, SysinfoRequest, SysinfoResponse,
};
pub use transport::{Exchange, Pages, Transport};
