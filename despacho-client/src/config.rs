//! Client configuration

use despacho_core::OverlayPolicy;
use std::time::Duration;

/// What `fetch_once` does when the orders endpoint answers HTTP 500
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPolicy {
    /// POST the reconnect endpoint once, then retry the fetch exactly once
    #[default]
    ReconnectOnce,
    /// Report the 500 like any other non-success status
    None,
}

/// Configuration for the dispatch dashboard client.
///
/// The context id selects which backend account orders are pulled from; it
/// is injected here at construction and never read from user input.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "http://localhost:5000")
    pub base_url: String,

    /// Export context id used in every orders and label request
    pub context_id: u32,

    /// Interval between scheduled fetches
    pub poll_interval: Duration,

    /// Recovery behavior on HTTP 500, shared by timer and manual fetches
    pub recovery: RecoveryPolicy,

    /// Overlay treatment on snapshot refresh
    pub overlay_policy: OverlayPolicy,

    /// Request timeout in seconds; None leaves the transport default
    pub timeout: Option<u64>,
}

impl ClientConfig {
    /// Create a configuration with the deployment defaults (5 minute poll,
    /// one-shot recovery, overlay reset on refresh).
    pub fn new(base_url: impl Into<String>, context_id: u32) -> Self {
        Self {
            base_url: base_url.into(),
            context_id,
            poll_interval: Duration::from_secs(300),
            recovery: RecoveryPolicy::ReconnectOnce,
            overlay_policy: OverlayPolicy::ResetToDefaults,
            timeout: None,
        }
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the recovery policy
    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Set the overlay refresh policy
    pub fn with_overlay_policy(mut self, policy: OverlayPolicy) -> Self {
        self.overlay_policy = policy;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000", 80)
    }
}
