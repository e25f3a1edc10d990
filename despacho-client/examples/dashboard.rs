// despacho-client/examples/dashboard.rs
// Console rendition of the dispatch dashboard: fetch once, list orders,
// export a label for the first order.

use despacho_client::{ClientConfig, FileSink, LabelExporter, SyncController};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let base_url =
        std::env::var("DESPACHO_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let context_id: u32 = std::env::var("DESPACHO_CONTEXT_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(80);

    let config = ClientConfig::new(&base_url, context_id);
    let controller = Arc::new(SyncController::new(config.clone())?);
    let exporter = LabelExporter::new(&config, FileSink::new("etiquetas"))?;

    controller.fetch_once().await;
    let report = controller.status().current();
    tracing::info!(state = ?report.state, message = %report.message, "Sync finished");

    let store = controller.store();
    let first_id = {
        let store = store.read().unwrap();
        for entry in store.orders() {
            println!(
                "Pedido {} - {} ({} bultos)",
                entry
                    .order
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "sin ID".to_string()),
                entry.order.client_name.as_deref().unwrap_or("N/A"),
                entry.overlay.package_count,
            );
        }
        store.orders().first().and_then(|e| e.order.id.clone())
    };

    if let Some(order_id) = first_id {
        match exporter.export_order(&store, &order_id).await {
            Ok(name) => tracing::info!(artifact = %name, "Label saved"),
            Err(e) => tracing::error!("No se pudo imprimir la etiqueta ZPL: {e}"),
        }
    }

    Ok(())
}
