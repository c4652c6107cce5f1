//! Debug capture of raw request/response artifacts.
//!
//! # Design
//! A `DebugSwitch` is handed to each `Transport` at construction. Clones
//! share one flag, so giving the same switch to several transports toggles
//! capture for all of them at once. The flag is read once per exchange;
//! flipping it while another thread is mid-request may or may not affect
//! that request. This race is accepted: the switch is a diagnostic aid, not
//! a per-request setting.
//!
//! When capture is on, the transport fills a `DebugSnapshot` stored on the
//! envelope as the exchange progresses. An envelope that was never executed
//! with capture on has no snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use url::Url;

/// Shared on/off flag for debug capture.
#[derive(Debug, Clone, Default)]
pub struct DebugSwitch {
    enabled: Arc<AtomicBool>,
}

impl DebugSwitch {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Raw artifacts of one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugSnapshot {
    /// True once the transport has started recording this exchange.
    pub captured: bool,
    pub request_url: Option<Url>,
    pub request_body: Vec<u8>,
    pub response_status: Option<u16>,
    pub response_headers: Vec<(String, String)>,
    pub response_body: Vec<u8>,
}

impl DebugSnapshot {
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Response body as text, replacing invalid UTF-8.
    pub fn response_text(&self) -> String {
        String::from_utf8_lossy(&self.response_body).into_owned()
    }
}
