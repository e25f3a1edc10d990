//! Order models and payload normalization
//!
//! Field names mirror the backend's JSON keys exactly (the aggregation
//! service emits Spanish headers with embedded spaces and accents), so
//! every field carries an explicit `#[serde(rename)]`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Order identity as the backend emits it - a number or a string.
///
/// Used for `IDPedido`, `IDCliente` and item ids. Comparison and hashing
/// treat `Number(80)` and `Text("80")` as distinct, matching the backend
/// contract that one snapshot uses one representation consistently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum OrderId {
    Number(i64),
    Text(String),
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderId::Number(n) => write!(f, "{n}"),
            OrderId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        OrderId::Number(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        OrderId::Text(value.to_string())
    }
}

/// One line item of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderItem {
    /// Item id from the source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<OrderId>,
    /// Item description
    #[serde(rename = "Descripción", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// EAN barcode
    #[serde(rename = "EAN", default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    /// Ordered quantity
    #[serde(rename = "Cantidad", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
}

/// One pending order as returned by `GET /api/pedidos/{context_id}`.
///
/// Replaced wholesale on every successful fetch; the backend never patches
/// an order in place. Every field is optional because the upstream export
/// omits columns freely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Order {
    /// Stable order id - the overlay key. Orders without it are kept for
    /// display but can never be edited or exported.
    #[serde(rename = "IDPedido", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    /// Client id in the source system
    #[serde(rename = "IDCliente", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<OrderId>,
    /// Client display name
    #[serde(rename = "NombreCliente", default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Shipping kind as classified by the backend
    #[serde(rename = "Tipo de Envío", default, skip_serializing_if = "Option::is_none")]
    pub shipping_kind: Option<String>,
    /// Raw shipping date text; parse with [`Order::shipping_date`]
    #[serde(rename = "Fecha de envío", default, skip_serializing_if = "Option::is_none")]
    pub shipping_date_raw: Option<String>,
    /// Free-form remarks
    #[serde(rename = "Observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Shipping address from the source system
    #[serde(rename = "Dirección de Envío", default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    /// Total units across all items, computed by the backend
    #[serde(rename = "cantidad_total_items_pedido", default, skip_serializing_if = "Option::is_none")]
    pub total_item_count: Option<i64>,
    /// Comma-joined EANs, computed by the backend
    #[serde(rename = "skus_concatenados", default, skip_serializing_if = "Option::is_none")]
    pub sku_summary: Option<String>,
    /// Line items
    #[serde(rename = "Items", default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,

    // Store-channel (Tiendanube) recipient block, present only for
    // orders that originated there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiendanube_order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiendanube_order_number: Option<String>,
    #[serde(rename = "nombre_destinatario_tn", default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(rename = "telefono_destinatario", default, skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
    #[serde(rename = "direccion_calle", default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(rename = "barrio", default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(rename = "localidad_tn", default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(rename = "provincia_tn", default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(rename = "codigo_postal", default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(rename = "pais_tn", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Order {
    /// Parse the shipping date, tolerating the formats the export has been
    /// observed to emit (RFC 3339, `YYYY-MM-DD HH:MM:SS`, bare date).
    pub fn shipping_date(&self) -> Option<NaiveDateTime> {
        let raw = self.shipping_date_raw.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
            return Some(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(d.and_hms_opt(0, 0, 0)?);
        }
        None
    }
}

/// Normalized result of the orders endpoint.
///
/// The backend returns either a JSON array of orders, a single bare order
/// object, or `{"message": "..."}` meaning the context has no pending
/// orders. Callers always see one of two shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// No pending orders; the backend-supplied text becomes the status line
    Empty { message: String },
    /// Current snapshot (a bare object is wrapped into a one-element vec)
    Orders(Vec<Order>),
}

impl FetchOutcome {
    /// Normalize a successful response body.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(map) = &value {
            if map.len() == 1 {
                if let Some(message) = map.get("message").and_then(Value::as_str) {
                    return Ok(FetchOutcome::Empty {
                        message: message.to_string(),
                    });
                }
            }
        }
        match value {
            Value::Array(_) => Ok(FetchOutcome::Orders(serde_json::from_value(value)?)),
            Value::Object(_) => Ok(FetchOutcome::Orders(vec![serde_json::from_value(value)?])),
            other => Err(serde::de::Error::custom(format!(
                "expected object or array of orders, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_object_means_empty() {
        let outcome = FetchOutcome::from_value(json!({"message": "Sin pedidos"})).unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Empty {
                message: "Sin pedidos".to_string()
            }
        );
    }

    #[test]
    fn test_array_body_parses_orders() {
        let body = json!([
            {
                "IDPedido": 1234,
                "IDCliente": "C-9",
                "NombreCliente": "Mayorista Sur",
                "Tipo de Envío": "Domicilio",
                "Fecha de envío": "2025-03-14 00:00:00",
                "cantidad_total_items_pedido": 3,
                "Items": [
                    {"item_id": 1, "Descripción": "Remera", "EAN": "779123", "Cantidad": 3.0}
                ]
            }
        ]);
        let outcome = FetchOutcome::from_value(body).unwrap();
        let FetchOutcome::Orders(orders) = outcome else {
            panic!("expected orders");
        };
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, Some(OrderId::Number(1234)));
        assert_eq!(orders[0].client_id, Some(OrderId::Text("C-9".to_string())));
        assert_eq!(orders[0].items[0].ean.as_deref(), Some("779123"));
        assert_eq!(
            orders[0].shipping_date(),
            NaiveDate::from_ymd_opt(2025, 3, 14).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_bare_object_is_wrapped() {
        let outcome = FetchOutcome::from_value(json!({"IDPedido": "A-77"})).unwrap();
        let FetchOutcome::Orders(orders) = outcome else {
            panic!("expected orders");
        };
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, Some(OrderId::Text("A-77".to_string())));
    }

    #[test]
    fn test_object_with_message_and_data_is_an_order() {
        // Only a message-only object counts as the empty marker
        let outcome =
            FetchOutcome::from_value(json!({"message": "x", "IDPedido": 5})).unwrap();
        assert!(matches!(outcome, FetchOutcome::Orders(orders) if orders.len() == 1));
    }

    #[test]
    fn test_scalar_body_is_rejected() {
        assert!(FetchOutcome::from_value(json!(42)).is_err());
    }

    #[test]
    fn test_unparseable_shipping_date_is_none() {
        let order = Order {
            shipping_date_raw: Some("mañana".to_string()),
            ..Order::default()
        };
        assert_eq!(order.shipping_date(), None);
    }
}
