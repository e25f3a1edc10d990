//! # despacho-core
//!
//! Data layer for the dispatch dashboard client - pure types only.
//!
//! ## Scope
//!
//! This crate handles WHAT the dashboard holds:
//! - Order models matching the backend's JSON keys
//! - Normalization of the orders endpoint payload
//! - The local overlay of operator-editable shipping metadata
//! - Sync state and the single status projection
//!
//! Network I/O (HOW the data gets here) lives in `despacho-client`.

pub mod order;
pub mod status;
pub mod store;

// Re-exports
pub use order::{FetchOutcome, Order, OrderId, OrderItem};
pub use status::{StatusReport, SyncState};
pub use store::{AddressType, OrderStore, OverlayFields, OverlayPolicy, OverlayUpdate, StoredOrder};
