//! Sync state and the status projection

use serde::{Deserialize, Serialize};

/// Lifecycle of the order synchronization loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    /// No fetch issued yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// A 500 was seen and the one-shot recovery cycle is running
    Retrying,
    /// Last applied fetch succeeded
    Ready,
    /// Last applied fetch failed
    Error,
}

/// The single current human-readable status line.
///
/// Overwritten on every sync transition; no history is kept. Label export
/// failures go back to their caller and never land here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatusReport {
    /// Current sync state
    pub state: SyncState,
    /// Operator-facing message for that state
    pub message: String,
}

impl StatusReport {
    pub fn new(state: SyncState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}
