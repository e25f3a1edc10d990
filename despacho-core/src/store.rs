//! Order store - canonical snapshot plus the local edit overlay
//!
//! The snapshot is replaced wholesale on every successful fetch. The
//! overlay holds operator-editable shipping metadata keyed by order id and
//! is never sent back to the canonical store.

use crate::order::{Order, OrderId};
use serde::{Deserialize, Serialize};

/// Default shipping label type applied to freshly merged orders
pub const DEFAULT_SHIPPING_LABEL_TYPE: &str = "Domicilio";

/// Address classification printed on the label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AddressType {
    #[default]
    Particular,
    Comercial,
}

impl AddressType {
    /// Wire value expected by the label endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Particular => "Particular",
            AddressType::Comercial => "Comercial",
        }
    }
}

/// Operator-editable shipping metadata for one order, local only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayFields {
    /// Number of packages, at least 1
    pub package_count: u32,
    /// Free-form label type text
    pub shipping_label_type: String,
    /// Address classification
    pub address_type: AddressType,
}

impl Default for OverlayFields {
    fn default() -> Self {
        Self {
            package_count: 1,
            shipping_label_type: DEFAULT_SHIPPING_LABEL_TYPE.to_string(),
            address_type: AddressType::Particular,
        }
    }
}

/// Single-field overlay edit
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayUpdate {
    PackageCount(u32),
    ShippingLabelType(String),
    AddressType(AddressType),
}

/// What happens to existing overlay edits when a fresh snapshot arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPolicy {
    /// Every order gets default overlay fields again (original behavior)
    #[default]
    ResetToDefaults,
    /// Orders whose id survives the refresh keep their edited overlay
    PreserveById,
}

/// One order together with its overlay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredOrder {
    pub order: Order,
    pub overlay: OverlayFields,
}

/// Canonical order snapshot plus per-order overlay. Pure data, no I/O.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    entries: Vec<StoredOrder>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with freshly fetched orders.
    ///
    /// Orders lacking `IDPedido` are kept for display but flagged: they can
    /// never be targeted by overlay edits or exports, and positional keying
    /// is deliberately not offered.
    pub fn replace_snapshot(&mut self, orders: Vec<Order>, policy: OverlayPolicy) {
        let previous = std::mem::take(&mut self.entries);
        self.entries = orders
            .into_iter()
            .map(|order| {
                let overlay = match (&order.id, policy) {
                    (Some(id), OverlayPolicy::PreserveById) => previous
                        .iter()
                        .find(|e| e.order.id.as_ref() == Some(id))
                        .map(|e| e.overlay.clone())
                        .unwrap_or_default(),
                    _ => OverlayFields::default(),
                };
                if order.id.is_none() {
                    tracing::warn!(
                        client = ?order.client_name,
                        "Order without IDPedido in snapshot, overlay edits unavailable"
                    );
                }
                StoredOrder { order, overlay }
            })
            .collect();
    }

    /// Apply one overlay edit to the order matching `id`.
    ///
    /// Silent no-op when the id is not in the current snapshot - the order
    /// may have left the snapshot between render and edit.
    pub fn update_overlay(&mut self, id: &OrderId, update: OverlayUpdate) {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.order.id.as_ref() == Some(id))
        else {
            tracing::debug!(order_id = %id, "Overlay edit for unknown order id ignored");
            return;
        };
        match update {
            OverlayUpdate::PackageCount(count) => entry.overlay.package_count = count,
            OverlayUpdate::ShippingLabelType(text) => entry.overlay.shipping_label_type = text,
            OverlayUpdate::AddressType(kind) => entry.overlay.address_type = kind,
        }
    }

    /// Read-only view of the current snapshot, in backend order
    pub fn orders(&self) -> &[StoredOrder] {
        &self.entries
    }

    /// Look up one order by id
    pub fn get(&self, id: &OrderId) -> Option<&StoredOrder> {
        self.entries
            .iter()
            .find(|e| e.order.id.as_ref() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
