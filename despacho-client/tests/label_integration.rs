//! Label export tests: validation, artifact naming, file persistence

use despacho_client::{
    AddressType, ClientConfig, ClientError, ExportRequest, FileSink, LabelExporter, Order, OrderId,
    OrderStore, OverlayPolicy, OverlayUpdate, SharedOrderStore,
};
use httpmock::prelude::*;
use std::sync::{Arc, RwLock};
use tempfile::TempDir;

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.base_url(), 80)
}

fn order(id: i64) -> Order {
    Order {
        id: Some(OrderId::Number(id)),
        ..Order::default()
    }
}

#[tokio::test]
async fn test_successful_export_saves_named_artifact() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/pedidos/label_zpl/80/1234/2")
            .query_param("tipo_envio_etiqueta", "Domicilio")
            .query_param("tipo_domicilio", "Particular");
        then.status(200).body("^XA^XZ");
    });

    let dir = TempDir::new().unwrap();
    let exporter =
        LabelExporter::new(&config_for(&server), FileSink::new(dir.path())).unwrap();
    let request = ExportRequest::new(80, 1234, 2, "Domicilio", AddressType::Particular);

    let name = exporter.export(&request).await.unwrap();

    mock.assert();
    assert_eq!(name, "etiqueta_pedido_ExpID80_SOH1234.txt");
    let saved = std::fs::read(dir.path().join(&name)).unwrap();
    assert_eq!(saved, b"^XA^XZ");
    // No tmp file left behind
    assert!(!dir.path().join(format!("{name}.tmp")).exists());
}

#[tokio::test]
async fn test_invalid_package_count_issues_no_network_call() {
    let server = MockServer::start_async().await;
    let catch_all = server.mock(|when, then| {
        when.method(GET);
        then.status(200);
    });

    let dir = TempDir::new().unwrap();
    let exporter =
        LabelExporter::new(&config_for(&server), FileSink::new(dir.path())).unwrap();
    let request = ExportRequest::new(80, 1234, 0, "Domicilio", AddressType::Particular);

    let err = exporter.export(&request).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(catch_all.hits(), 0);
}

#[tokio::test]
async fn test_missing_order_id_issues_no_network_call() {
    let server = MockServer::start_async().await;
    let catch_all = server.mock(|when, then| {
        when.method(GET);
        then.status(200);
    });

    let dir = TempDir::new().unwrap();
    let exporter =
        LabelExporter::new(&config_for(&server), FileSink::new(dir.path())).unwrap();
    let request = ExportRequest {
        context_id: 80,
        order_id: None,
        package_count: 1,
        shipping_label_type: "Domicilio".to_string(),
        address_type: AddressType::Particular,
    };

    let err = exporter.export(&request).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(catch_all.hits(), 0);
}

#[tokio::test]
async fn test_label_error_carries_diagnostic_preview() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/api/pedidos/label_zpl/80/1234/1");
        then.status(500)
            .body("No se pudo generar la etiqueta ZPL.");
    });

    let dir = TempDir::new().unwrap();
    let exporter =
        LabelExporter::new(&config_for(&server), FileSink::new(dir.path())).unwrap();
    let request = ExportRequest::new(80, 1234, 1, "Domicilio", AddressType::Particular);

    let err = exporter.export(&request).await.unwrap_err();

    let ClientError::HttpStatus {
        status,
        body_preview,
    } = err
    else {
        panic!("expected HttpStatus, got {err:?}");
    };
    assert_eq!(status, 500);
    assert_eq!(body_preview, "No se pudo generar la etiqueta ZPL.");
    // Nothing was saved
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_export_order_reads_current_overlay_at_call_time() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/pedidos/label_zpl/80/1234/3")
            .query_param("tipo_envio_etiqueta", "Sucursal")
            .query_param("tipo_domicilio", "Comercial");
        then.status(200).body("^XA^XZ");
    });

    let store: SharedOrderStore = Arc::new(RwLock::new(OrderStore::new()));
    {
        let mut store = store.write().unwrap();
        store.replace_snapshot(vec![order(1234)], OverlayPolicy::ResetToDefaults);
        store.update_overlay(&OrderId::Number(1234), OverlayUpdate::PackageCount(3));
        store.update_overlay(
            &OrderId::Number(1234),
            OverlayUpdate::ShippingLabelType("Sucursal".to_string()),
        );
        store.update_overlay(
            &OrderId::Number(1234),
            OverlayUpdate::AddressType(AddressType::Comercial),
        );
    }

    let dir = TempDir::new().unwrap();
    let exporter =
        LabelExporter::new(&config_for(&server), FileSink::new(dir.path())).unwrap();

    let name = exporter
        .export_order(&store, &OrderId::Number(1234))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(name, "etiqueta_pedido_ExpID80_SOH1234.txt");
    // The export wrote nothing back into the overlay
    assert_eq!(
        store.read().unwrap().get(&OrderId::Number(1234)).unwrap().overlay.package_count,
        3
    );
}

#[tokio::test]
async fn test_export_order_for_unknown_id_is_a_validation_error() {
    let server = MockServer::start_async().await;
    let catch_all = server.mock(|when, then| {
        when.method(GET);
        then.status(200);
    });

    let store: SharedOrderStore = Arc::new(RwLock::new(OrderStore::new()));
    let dir = TempDir::new().unwrap();
    let exporter =
        LabelExporter::new(&config_for(&server), FileSink::new(dir.path())).unwrap();

    let err = exporter
        .export_order(&store, &OrderId::Number(99))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(catch_all.hits(), 0);
}
