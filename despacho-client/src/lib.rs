//! # despacho-client
//!
//! HTTP client for the dispatch dashboard backend.
//!
//! Fetches the pending-orders snapshot into a shared [`OrderStore`],
//! polls on a fixed interval, runs the one-shot reconnect cycle when the
//! backend answers 500, and exports printer-ready ZPL labels per order.
//!
//! ## Example
//!
//! ```ignore
//! use despacho_client::{ClientConfig, FileSink, LabelExporter, SyncController};
//! use std::sync::Arc;
//!
//! let config = ClientConfig::new("http://localhost:5000", 80);
//! let controller = Arc::new(SyncController::new(config.clone())?);
//! let exporter = LabelExporter::new(&config, FileSink::new("etiquetas"))?;
//!
//! let handle = Arc::clone(&controller).start();
//! // ... render controller.store(), edit overlays, export labels ...
//! handle.stop();
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod sync;

pub use config::{ClientConfig, RecoveryPolicy};
pub use error::{ClientError, ClientResult};
pub use export::{ExportRequest, FileSink, LabelExporter, LabelSink, artifact_name};
pub use http::{ApiClient, DispatchApi};
pub use sync::{SharedOrderStore, StatusReporter, SyncController, SyncHandle};

// Re-export shared types for convenience
pub use despacho_core::{
    AddressType, FetchOutcome, Order, OrderId, OrderItem, OrderStore, OverlayFields,
    OverlayPolicy, OverlayUpdate, StatusReport, StoredOrder, SyncState,
};
