//! Label export - validate, request, save
//!
//! Each export is an independent call: read the order's overlay at call
//! time, validate before touching the network, GET the label and hand the
//! opaque bytes to the host's save capability. Failures are returned to
//! the caller and never touch the sync status line.

use crate::http::DispatchApi;
use crate::sync::SharedOrderStore;
use crate::{ApiClient, ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use despacho_core::{AddressType, OrderId, StoredOrder};
use std::path::PathBuf;
use std::sync::PoisonError;

/// Ephemeral label request, constructed fresh from the current overlay.
/// Never persisted; same inputs produce the same request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub context_id: u32,
    /// Missing on orders the backend delivered without `IDPedido`;
    /// validation rejects those before any I/O.
    pub order_id: Option<OrderId>,
    pub package_count: u32,
    pub shipping_label_type: String,
    pub address_type: AddressType,
}

impl ExportRequest {
    pub fn new(
        context_id: u32,
        order_id: impl Into<OrderId>,
        package_count: u32,
        shipping_label_type: impl Into<String>,
        address_type: AddressType,
    ) -> Self {
        Self {
            context_id,
            order_id: Some(order_id.into()),
            package_count,
            shipping_label_type: shipping_label_type.into(),
            address_type,
        }
    }

    /// Snapshot one stored order's overlay into a request
    pub fn from_stored(context_id: u32, entry: &StoredOrder) -> Self {
        Self {
            context_id,
            order_id: entry.order.id.clone(),
            package_count: entry.overlay.package_count,
            shipping_label_type: entry.overlay.shipping_label_type.clone(),
            address_type: entry.overlay.address_type,
        }
    }

    /// Pre-flight checks; on failure no network call is issued
    fn validate(&self) -> ClientResult<&OrderId> {
        if self.package_count < 1 {
            return Err(ClientError::Validation(
                "La cantidad de bultos debe ser al menos 1.".to_string(),
            ));
        }
        self.order_id.as_ref().ok_or_else(|| {
            ClientError::Validation(
                "No se pudo obtener el ID del pedido para imprimir la etiqueta.".to_string(),
            )
        })
    }
}

/// Deterministic artifact name for one context/order pair.
///
/// The order id comes from the backend; path separators in a text id are
/// replaced so the name can never point outside the sink directory.
pub fn artifact_name(context_id: u32, order_id: &OrderId) -> String {
    let id: String = order_id
        .to_string()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    format!("etiqueta_pedido_ExpID{context_id}_SOH{id}.txt")
}

/// Host save/download capability. The label payload is opaque bytes.
#[async_trait]
pub trait LabelSink: Send + Sync {
    async fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Saves label artifacts into a local directory.
///
/// Writes to a tmp file then renames, so a crash mid-write never leaves a
/// corrupt artifact under the final name.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl LabelSink for FileSink {
    async fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let final_path = self.dir.join(name);
        let tmp_path = self.dir.join(format!("{name}.tmp"));
        tokio::fs::write(&tmp_path, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        Ok(())
    }
}

/// Requests printer-ready labels and persists them through a [`LabelSink`]
pub struct LabelExporter<S> {
    api: ApiClient,
    context_id: u32,
    sink: S,
}

impl<S: LabelSink> LabelExporter<S> {
    pub fn new(config: &ClientConfig, sink: S) -> ClientResult<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
            context_id: config.context_id,
            sink,
        })
    }

    /// Run one export: validate, fetch the label, save the artifact.
    /// Returns the artifact name on success.
    pub async fn export(&self, request: &ExportRequest) -> ClientResult<String> {
        let order_id = request.validate()?;
        let bytes = self
            .api
            .fetch_label(
                request.context_id,
                order_id,
                request.package_count,
                &request.shipping_label_type,
                request.address_type.as_str(),
            )
            .await?;
        let name = artifact_name(request.context_id, order_id);
        self.sink.save(&name, &bytes).await?;
        tracing::info!(artifact = %name, size = bytes.len(), "Label artifact saved");
        Ok(name)
    }

    /// Export for an order currently in the store, reading its overlay at
    /// call time. Writes nothing back to the store.
    pub async fn export_order(
        &self,
        store: &SharedOrderStore,
        order_id: &OrderId,
    ) -> ClientResult<String> {
        let request = {
            let store = store.read().unwrap_or_else(PoisonError::into_inner);
            let entry = store.get(order_id).ok_or_else(|| {
                ClientError::Validation(format!(
                    "El pedido {order_id} no está en el listado actual."
                ))
            })?;
            ExportRequest::from_stored(self.context_id, entry)
        };
        self.export(&request).await
    }
}
