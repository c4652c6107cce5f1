//! Signed request execution and outcome classification.
//!
//! # Design
//! `Transport` owns the credentials, the HTTP backend and the debug switch.
//! One call is one synchronous exchange: stamp, sign, send, buffer, classify.
//! Nothing is retried and nothing is swallowed; every failure is returned to
//! the caller as an `ApiError`.
//!
//! A `Transport` is `Send + Sync`. Concurrent callers each bring their own
//! envelope; the debug switch is the only state shared between calls.

use std::fmt;

use tracing::{debug, trace};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::debug::DebugSwitch;
use crate::endpoint::{Endpoint, ListEndpoint};
use crate::envelope::{unix_now, RequestEnvelope, Signable};
use crate::error::ApiError;
use crate::http::{HttpBackend, UreqBackend};
use crate::pagination::{next_page, PaginatedResult, Pagination};

/// Executes signed requests against one API account.
pub struct Transport {
    credentials: Credentials,
    backend: Box<dyn HttpBackend>,
    debug: DebugSwitch,
    clock: fn() -> i64,
}

/// Result of a call together with the envelope that produced it, so the
/// debug snapshot can be inspected afterwards.
#[derive(Debug)]
pub struct Exchange<T> {
    pub envelope: RequestEnvelope,
    pub result: Result<T, ApiError>,
}

impl Transport {
    /// Transport over a `ureq` agent configured from `config`.
    pub fn new(config: ClientConfig) -> Self {
        let backend = UreqBackend::new(config.timeout);
        Self::with_backend(config.credentials, backend).with_debug_switch(DebugSwitch::new(config.debug))
    }

    pub fn with_backend<B: HttpBackend + 'static>(credentials: Credentials, backend: B) -> Self {
        Self {
            credentials,
            backend: Box::new(backend),
            debug: DebugSwitch::default(),
            clock: unix_now,
        }
    }

    /// Share `switch` with this transport. Every transport holding a clone of
    /// the same switch is toggled together.
    pub fn with_debug_switch(mut self, switch: DebugSwitch) -> Self {
        self.debug = switch;
        self
    }

    /// Replace the source of request timestamps.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn debug_switch(&self) -> &DebugSwitch {
        &self.debug
    }

    /// Toggle debug capture for all subsequent calls. Calls already in
    /// flight may or may not observe the change.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    /// Sign and send `envelope`, returning the raw response body on 2xx.
    ///
    /// The envelope's timestamp is overwritten with the current time. When
    /// debug capture is on, the envelope's snapshot is filled as the
    /// exchange progresses, including on failure.
    pub fn execute(&self, envelope: &mut RequestEnvelope) -> Result<Vec<u8>, ApiError> {
        envelope.set_timestamp((self.clock)());

        let capture = self.debug.is_enabled();
        if capture {
            let body = envelope.body().to_vec();
            let snapshot = envelope.debug_mut();
            snapshot.captured = true;
            snapshot.request_body = body;
        }

        let request = envelope.materialize(&self.credentials)?;
        if capture {
            envelope.debug_mut().request_url = Url::parse(&request.url).ok();
        }

        debug!(
            method = %request.method,
            resource = %envelope.resource_with_query(),
            bytes = request.body.len(),
            "sending request"
        );
        let response = self.backend.execute(&request)?;

        if capture {
            let snapshot = envelope.debug_mut();
            snapshot.response_status = Some(response.status);
            snapshot.response_headers = response.headers.clone();
            snapshot.response_body = response.body.clone();
        }

        debug!(
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );

        if response.status == 404 {
            return Err(ApiError::NotFound);
        }
        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                status: response.status,
                status_line: response.status_line(),
                body: response.body,
            });
        }
        Ok(response.body)
    }

    /// Like `execute`, after writing `pagination` into the query.
    ///
    /// A 2xx page whose header reports zero selected items fails with
    /// `ApiError::NoResults`, which still carries the raw body.
    pub fn execute_paginated(
        &self,
        envelope: &mut RequestEnvelope,
        pagination: &Pagination,
    ) -> Result<Vec<u8>, ApiError> {
        pagination.apply(envelope);
        let body = self.execute(envelope)?;

        let page: PaginatedResult = serde_json::from_slice(&body)?;
        trace!(
            count = page.count,
            selected = page.selected,
            offset = page.offset,
            limit = page.limit,
            "page header"
        );
        if page.selected == 0 {
            return Err(ApiError::NoResults { body });
        }
        Ok(body)
    }

    /// Execute `endpoint` and decode its response.
    pub fn send<E: Endpoint>(&self, endpoint: &E) -> Result<E::Response, ApiError> {
        let mut envelope = endpoint.envelope()?;
        self.dispatch(endpoint, &mut envelope)
    }

    /// Like `send`, but also hands back the envelope with its debug snapshot.
    pub fn exchange<E: Endpoint>(&self, endpoint: &E) -> Exchange<E::Response> {
        match endpoint.envelope() {
            Ok(mut envelope) => {
                let result = self.dispatch(endpoint, &mut envelope);
                Exchange { envelope, result }
            }
            Err(err) => Exchange {
                envelope: RequestEnvelope::new(endpoint.method(), &endpoint.resource()),
                result: Err(err),
            },
        }
    }

    /// Iterate the pages of a list endpoint, starting at its current
    /// pagination. Iteration ends after the last page or at the first page
    /// that matched nothing; other errors are yielded once and end it.
    pub fn pages<E: ListEndpoint>(&self, endpoint: E) -> Pages<'_, E> {
        Pages {
            transport: self,
            next: Some(endpoint),
        }
    }

    fn dispatch<E: Endpoint>(
        &self,
        endpoint: &E,
        envelope: &mut RequestEnvelope,
    ) -> Result<E::Response, ApiError> {
        let body = match endpoint.pagination() {
            Some(pagination) => self.execute_paginated(envelope, pagination)?,
            None => self.execute(envelope)?,
        };
        endpoint.decode(&body)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("credentials", &self.credentials)
            .field("debug", &self.debug.is_enabled())
            .finish()
    }
}

/// Iterator over the pages of a list endpoint. See `Transport::pages`.
pub struct Pages<'a, E: ListEndpoint> {
    transport: &'a Transport,
    next: Option<E>,
}

impl<E: ListEndpoint> Iterator for Pages<'_, E> {
    type Item = Result<E::Response, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut endpoint = self.next.take()?;
        match self.transport.send(&endpoint) {
            Ok(response) => {
                let current = endpoint.pagination().cloned().unwrap_or_default();
                let (following, more) = next_page(&E::page(&response), &current);
                if more {
                    endpoint.set_pagination(following);
                    self.next = Some(endpoint);
                }
                Some(Ok(response))
            }
            Err(ApiError::NoResults { .. }) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use serde::Deserialize;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    const TIMESTAMP: i64 = 1445440997;

    /// Replays canned responses and records every request it receives.
    #[derive(Default)]
    struct ScriptedBackend {
        responses: Mutex<VecDeque<HttpResponse>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedBackend {
        fn with(responses: Vec<(u16, &str)>) -> Arc<Self> {
            let backend = Self::default();
            *backend.responses.lock().unwrap() = responses
                .into_iter()
                .map(|(status, body)| HttpResponse {
                    status,
                    headers: vec![("content-type".to_string(), "application/json".to_string())],
                    body: body.as_bytes().to_vec(),
                })
                .collect();
            Arc::new(backend)
        }

        fn urls(&self) -> Vec<String> {
            self.seen.lock().unwrap().iter().map(|r| r.url.clone()).collect()
        }
    }

    impl HttpBackend for ScriptedBackend {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("no scripted response left".to_string()))
        }
    }

    fn transport(backend: &Arc<ScriptedBackend>) -> Transport {
        let creds = Credentials::with_endpoint("1438129266231705", "UYETICGU2CT3KES", "http://stub");
        Transport::with_backend(creds, backend.clone()).with_clock(|| TIMESTAMP)
    }

    #[test]
    fn execute_signs_with_clock_timestamp() {
        let backend = ScriptedBackend::with(vec![(200, "{}")]);
        let mut env = RequestEnvelope::get("/auth").with_timestamp(1);
        transport(&backend).execute(&mut env).unwrap();

        assert_eq!(env.timestamp(), Some(TIMESTAMP));
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].url, "http://stub/auth");
        assert_eq!(
            seen[0].header("Authorization"),
            Some("AD 1438129266231705:1445440997:T2YsCOj2o3Rb79nLPUgx3Gl+nnw=")
        );
    }

    #[test]
    fn not_found_is_distinct() {
        let backend = ScriptedBackend::with(vec![(404, "")]);
        let err = transport(&backend)
            .execute(&mut RequestEnvelope::get("/clients/1"))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn bad_request_is_status_error() {
        let backend = ScriptedBackend::with(vec![(400, "bad")]);
        let err = transport(&backend)
            .execute(&mut RequestEnvelope::get("/"))
            .unwrap_err();
        match err {
            ApiError::HttpStatus {
                status,
                status_line,
                body,
            } => {
                assert_eq!(status, 400);
                assert_eq!(status_line, "400 Bad Request");
                assert_eq!(body, b"bad");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn backend_failure_propagates() {
        let backend = ScriptedBackend::with(vec![]);
        let err = transport(&backend)
            .execute(&mut RequestEnvelope::get("/"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn debug_disabled_leaves_no_snapshot() {
        let backend = ScriptedBackend::with(vec![(200, "{}")]);
        let mut env = RequestEnvelope::get("/auth");
        transport(&backend).execute(&mut env).unwrap();
        assert!(env.debug().is_none());
    }

    #[test]
    fn debug_enabled_captures_exchange() {
        let backend = ScriptedBackend::with(vec![(201, r#"{"ok":true}"#)]);
        let t = transport(&backend);
        t.set_debug(true);

        let mut env = RequestEnvelope::get("/test").with_query("demo", "123");
        t.execute(&mut env).unwrap();

        let snap = env.debug().unwrap();
        assert!(snap.captured);
        assert_eq!(snap.response_status, Some(201));
        let url = snap.request_url.as_ref().unwrap();
        assert_eq!(url.path(), "/test");
        assert_eq!(url.query(), Some("demo=123"));
        assert_eq!(snap.response_text(), r#"{"ok":true}"#);
        assert_eq!(snap.response_header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn debug_captures_failed_exchange() {
        let backend = ScriptedBackend::with(vec![(500, "boom")]);
        let t = transport(&backend).with_debug_switch(DebugSwitch::new(true));
        let mut env = RequestEnvelope::patch("/sessions/x").with_body(b"{}".to_vec());
        assert!(t.execute(&mut env).is_err());

        let snap = env.debug().unwrap();
        assert_eq!(snap.request_body, b"{}");
        assert_eq!(snap.response_status, Some(500));
        assert_eq!(snap.response_body, b"boom");
    }

    #[test]
    fn shared_switch_toggles_all_transports() {
        let switch = DebugSwitch::default();
        let a = ScriptedBackend::with(vec![(200, "{}")]);
        let b = ScriptedBackend::with(vec![(200, "{}")]);
        let ta = transport(&a).with_debug_switch(switch.clone());
        let tb = transport(&b).with_debug_switch(switch.clone());

        ta.set_debug(true);
        assert!(tb.debug_switch().is_enabled());

        let mut env = RequestEnvelope::get("/auth");
        tb.execute(&mut env).unwrap();
        assert!(env.debug().is_some());
    }

    #[test]
    fn paginated_call_writes_query() {
        let backend = ScriptedBackend::with(vec![(200, r#"{"count":1,"selected":1,"offset":0,"limit":-1}"#)]);
        let mut env = RequestEnvelope::get("/clients");
        transport(&backend)
            .execute_paginated(&mut env, &Pagination::default())
            .unwrap();
        assert_eq!(backend.urls(), vec!["http://stub/clients?limit=-1&offset=0&order=desc"]);
    }

    #[test]
    fn zero_selected_is_no_results() {
        let body = r#"{"count":0,"selected":0,"offset":0,"limit":-1,"list":[]}"#;
        let backend = ScriptedBackend::with(vec![(200, body)]);
        let err = transport(&backend)
            .execute_paginated(&mut RequestEnvelope::get("/clients"), &Pagination::default())
            .unwrap_err();
        match err {
            ApiError::NoResults { body: raw } => assert_eq!(raw, body.as_bytes()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undecodable_page_is_encoding_error() {
        let backend = ScriptedBackend::with(vec![(200, "not json")]);
        let err = transport(&backend)
            .execute_paginated(&mut RequestEnvelope::get("/clients"), &Pagination::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Encoding(_)));
    }

    #[derive(Clone)]
    struct Numbers {
        pagination: Pagination,
    }

    #[derive(Debug, Deserialize)]
    struct NumberPage {
        #[serde(flatten)]
        page: PaginatedResult,
        list: Vec<i64>,
    }

    impl Endpoint for Numbers {
        type Response = NumberPage;

        fn method(&self) -> HttpMethod {
            HttpMethod::Get
        }

        fn resource(&self) -> String {
            "/numbers".to_string()
        }

        fn pagination(&self) -> Option<&Pagination> {
            Some(&self.pagination)
        }
    }

    impl ListEndpoint for Numbers {
        fn set_pagination(&mut self, pagination: Pagination) {
            self.pagination = pagination;
        }

        fn page(response: &NumberPage) -> PaginatedResult {
            response.page
        }
    }

    #[test]
    fn pages_walks_until_count_is_reached() {
        let backend = ScriptedBackend::with(vec![
            (200, r#"{"count":5,"selected":2,"offset":0,"limit":2,"list":[1,2]}"#),
            (200, r#"{"count":5,"selected":2,"offset":2,"limit":2,"list":[3,4]}"#),
            (200, r#"{"count":5,"selected":1,"offset":4,"limit":2,"list":[5]}"#),
        ]);
        let t = transport(&backend);
        let numbers = Numbers {
            pagination: Pagination::page_size(2),
        };
        let all: Vec<i64> = t
            .pages(numbers)
            .flat_map(|page| page.unwrap().list)
            .collect();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            backend.urls(),
            vec![
                "http://stub/numbers?limit=2&offset=0&order=desc",
                "http://stub/numbers?limit=2&offset=2&order=desc",
                "http://stub/numbers?limit=2&offset=4&order=desc",
            ]
        );
    }

    #[test]
    fn pages_stops_on_empty_page() {
        let backend = ScriptedBackend::with(vec![(200, r#"{"count":0,"selected":0,"offset":0,"limit":2,"list":[]}"#)]);
        let t = transport(&backend);
        let numbers = Numbers {
            pagination: Pagination::page_size(2),
        };
        assert_eq!(t.pages(numbers).count(), 0);
    }

    #[test]
    fn pages_yields_errors_once() {
        let backend = ScriptedBackend::with(vec![(500, "")]);
        let t = transport(&backend);
        let numbers = Numbers {
            pagination: Pagination::page_size(2),
        };
        let results: Vec<_> = t.pages(numbers).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn exchange_returns_envelope() {
        let backend = ScriptedBackend::with(vec![(200, r#"{"count":1,"selected":1,"offset":0,"limit":-1,"list":[9]}"#)]);
        let t = transport(&backend);
        t.set_debug(true);
        let exchange = t.exchange(&Numbers {
            pagination: Pagination::default(),
        });
        assert_eq!(exchange.result.unwrap().list, vec![9]);
        assert_eq!(exchange.envelope.timestamp(), Some(TIMESTAMP));
        assert_eq!(exchange.envelope.debug().unwrap().response_status, Some(200));
    }

    #[test]
    fn transport_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transport>();
    }
}
