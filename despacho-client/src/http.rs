//! Stateless HTTP layer over the dispatch backend
//!
//! No business logic here: issue the request, check the status, normalize
//! the body. The sync controller and label exporter decide what the
//! results mean.

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use despacho_core::{FetchOutcome, OrderId};
use reqwest::Client;
use std::time::Duration;

/// Non-success bodies are diagnostic text; keep a bounded preview only
const BODY_PREVIEW_LEN: usize = 200;

/// Truncate diagnostic text to the preview bound (char-safe)
pub(crate) fn body_preview(text: &str) -> String {
    if text.chars().count() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
    preview.push_str("...");
    preview
}

/// Backend API surface consumed by the sync controller and label exporter
#[async_trait]
pub trait DispatchApi: Send + Sync {
    /// Fetch the pending-orders snapshot for one context
    async fn fetch_orders(&self, context_id: u32) -> ClientResult<FetchOutcome>;

    /// Trigger the backend's SOAP client reinitialization
    async fn reconnect(&self) -> ClientResult<()>;

    /// Fetch the opaque ZPL label payload for one order
    async fn fetch_label(
        &self,
        context_id: u32,
        order_id: &OrderId,
        package_count: u32,
        shipping_label_type: &str,
        address_type: &str,
    ) -> ClientResult<Vec<u8>>;
}

/// Network HTTP client for the orders, reconnect and label endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(ClientError::HttpStatus {
            status: status.as_u16(),
            body_preview: body_preview(&text),
        })
    }
}

#[async_trait]
impl DispatchApi for ApiClient {
    async fn fetch_orders(&self, context_id: u32) -> ClientResult<FetchOutcome> {
        let url = format!("{}/api/pedidos/{}", self.base_url, context_id);
        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response).await?;
        // Decode by hand so an undecodable 2xx body surfaces as a
        // serialization error, not a transport one: the server was reached.
        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        Ok(FetchOutcome::from_value(value)?)
    }

    /// The response body is logged for diagnosis but never parsed; a
    /// malformed or empty body does not fail the call.
    async fn reconnect(&self) -> ClientResult<()> {
        let url = format!("{}/reintentar-cliente-soap", self.base_url);
        let response = self.client.post(&url).send().await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await.unwrap_or_default();
        tracing::info!(body = %body_preview(&body), "Reconnect endpoint answered");
        Ok(())
    }

    /// The payload is opaque to the client; query values are
    /// percent-encoded by the transport.
    async fn fetch_label(
        &self,
        context_id: u32,
        order_id: &OrderId,
        package_count: u32,
        shipping_label_type: &str,
        address_type: &str,
    ) -> ClientResult<Vec<u8>> {
        let url = format!(
            "{}/api/pedidos/label_zpl/{}/{}/{}",
            self.base_url, context_id, order_id, package_count
        );
        let response = self
            .client
            .get(&url)
            .query(&[
                ("tipo_envio_etiqueta", shipping_label_type),
                ("tipo_domicilio", address_type),
            ])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
