//! Sync controller - initial load, periodic polling, one-shot recovery
//!
//! Timer ticks and manual refreshes run the same `fetch_once` with the
//! same recovery policy. Concurrent fetches are not serialized; instead
//! every fetch carries a monotonically increasing sequence number and a
//! response is applied only when it belongs to the most recently issued
//! request, so a slow stale fetch can never overwrite a newer snapshot.

use crate::config::RecoveryPolicy;
use crate::http::DispatchApi;
use crate::{ApiClient, ClientConfig, ClientError, ClientResult};
use despacho_core::{FetchOutcome, OrderStore, StatusReport, SyncState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

// Operator-facing status texts, kept in the deployment's language
const MSG_LOADING: &str = "Cargando datos...";
const MSG_LOADED: &str = "Datos cargados correctamente.";
const MSG_RECOVERED: &str = "Conexión recuperada y datos cargados.";
const MSG_RETRYING: &str = "Error del servidor, reintentando conexión...";

/// Shared handle to the order store
pub type SharedOrderStore = Arc<RwLock<OrderStore>>;

/// Cloneable handle to the single current status line.
///
/// Overwritten on every sync transition; label export failures go back to
/// their caller and never through here.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    inner: Arc<RwLock<StatusReport>>,
}

impl StatusReporter {
    /// Current state and message
    pub fn current(&self) -> StatusReport {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, state: SyncState, message: impl Into<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) =
            StatusReport::new(state, message);
    }
}

enum FetchResult {
    /// First attempt succeeded
    Fresh(FetchOutcome),
    /// Succeeded on the retry after a reconnect cycle
    Recovered(FetchOutcome),
}

/// Orchestrates fetching into the store and status projection
pub struct SyncController<A = ApiClient> {
    api: A,
    config: ClientConfig,
    store: SharedOrderStore,
    status: StatusReporter,
    issued: AtomicU64,
}

impl SyncController<ApiClient> {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self::with_api(api, config))
    }
}

impl<A: DispatchApi> SyncController<A> {
    /// Build a controller over any [`DispatchApi`] implementation
    pub fn with_api(api: A, config: ClientConfig) -> Self {
        Self {
            api,
            config,
            store: SharedOrderStore::default(),
            status: StatusReporter::default(),
            issued: AtomicU64::new(0),
        }
    }

    /// Handle to the order store, for rendering and label export
    pub fn store(&self) -> SharedOrderStore {
        Arc::clone(&self.store)
    }

    /// Handle to the status line
    pub fn status(&self) -> StatusReporter {
        self.status.clone()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One fetch cycle: GET the snapshot, run the recovery policy on a 500,
    /// apply the result. Errors end in the status line, never propagate.
    ///
    /// Returns the state the cycle left behind (stale cycles return the
    /// state set by the newer request that superseded them).
    pub async fn fetch_once(&self) -> SyncState {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.set(SyncState::Loading, MSG_LOADING);

        let result = self.run_fetch().await;

        if !self.is_latest(seq) {
            tracing::debug!(seq, "Discarding stale fetch result");
            return self.status.current().state;
        }

        match result {
            Ok(FetchResult::Fresh(outcome)) => self.apply(outcome, MSG_LOADED),
            Ok(FetchResult::Recovered(outcome)) => self.apply(outcome, MSG_RECOVERED),
            Err(err) => {
                tracing::warn!(error = %err, "Order fetch failed");
                let message = match &err {
                    ClientError::Transport(cause) => format!("Error de conexión: {cause}"),
                    ClientError::RecoveryFailed(detail) => {
                        format!("No se pudo recuperar la conexión: {detail}")
                    }
                    other => format!("Error al cargar datos: {other}"),
                };
                self.status.set(SyncState::Error, message);
                SyncState::Error
            }
        }
    }

    async fn run_fetch(&self) -> ClientResult<FetchResult> {
        match self.api.fetch_orders(self.config.context_id).await {
            Ok(outcome) => Ok(FetchResult::Fresh(outcome)),
            Err(ClientError::HttpStatus {
                status: 500,
                body_preview,
            }) if self.config.recovery == RecoveryPolicy::ReconnectOnce => {
                tracing::warn!(body = %body_preview, "Orders endpoint returned 500, running recovery cycle");
                self.status.set(SyncState::Retrying, MSG_RETRYING);
                self.api
                    .reconnect()
                    .await
                    .map_err(|e| ClientError::RecoveryFailed(format!("fallo el reintento de conexión: {e}")))?;
                let outcome = self
                    .api
                    .fetch_orders(self.config.context_id)
                    .await
                    .map_err(|e| ClientError::RecoveryFailed(format!("fallo la segunda carga: {e}")))?;
                Ok(FetchResult::Recovered(outcome))
            }
            Err(err) => Err(err),
        }
    }

    fn apply(&self, outcome: FetchOutcome, success_message: &str) -> SyncState {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            FetchOutcome::Empty { message } => {
                tracing::info!(message = %message, "Backend reported no pending orders");
                store.replace_snapshot(Vec::new(), self.config.overlay_policy);
                self.status.set(SyncState::Ready, message);
            }
            FetchOutcome::Orders(orders) => {
                tracing::info!(count = orders.len(), "Order snapshot replaced");
                store.replace_snapshot(orders, self.config.overlay_policy);
                self.status.set(SyncState::Ready, success_message);
            }
        }
        SyncState::Ready
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }
}

impl<A: DispatchApi + 'static> SyncController<A> {
    /// Start polling: an immediate fetch, then one per configured interval
    /// until the handle is stopped or dropped.
    pub fn start(self: Arc<Self>) -> SyncHandle {
        let token = CancellationToken::new();
        let child = token.child_token();
        let controller = self;
        let task = tokio::spawn(async move {
            let mut ticker = interval(controller.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // Cancellation between ticks only: a fetch already in
                // flight runs to completion, best-effort teardown.
                controller.fetch_once().await;
            }
            tracing::debug!("Sync polling stopped");
        });
        SyncHandle {
            token,
            task: Some(task),
        }
    }
}

/// Owner handle for the polling task. Dropping it cancels the timer.
pub struct SyncHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Stop polling without waiting for the loop to wind down
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stop polling and wait for the loop to finish
    pub async fn stopped(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reporter_overwrites_single_message() {
        let status = StatusReporter::default();
        assert_eq!(status.current().state, SyncState::Idle);
        status.set(SyncState::Loading, MSG_LOADING);
        status.set(SyncState::Ready, MSG_LOADED);
        let report = status.current();
        assert_eq!(report.state, SyncState::Ready);
        assert_eq!(report.message, MSG_LOADED);
    }

    #[tokio::test]
    async fn test_stale_sequence_is_not_latest() {
        let controller = SyncController::new(ClientConfig::default()).unwrap();
        let first = controller.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let second = controller.issued.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(!controller.is_latest(first));
        assert!(controller.is_latest(second));
    }
}
