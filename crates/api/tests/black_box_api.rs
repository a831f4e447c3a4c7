use std::sync::Arc;

use catalog_api::app::{build_app, AppServices};
use catalog_infra::catalog_store::{BatchWriteOutput, CatalogStore, InMemoryCatalogStore, StoreError};
use catalog_infra::object_source::InMemoryObjectSource;
use catalog_products::Item;
use reqwest::StatusCode;
use serde_json::json;

const BUCKET: &str = "catalog-uploads";

struct TestServer {
    base_url: String,
    source: Arc<InMemoryObjectSource>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryCatalogStore::new())).await
    }

    async fn spawn_with_store(store: Arc<dyn CatalogStore>) -> Self {
        // Same router as prod, in-memory object source, ephemeral port.
        let source = Arc::new(InMemoryObjectSource::new());
        let services = Arc::new(AppServices::new(source.clone(), store, 25));
        let app = build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            source,
            handle,
        }
    }

    async fn upload(&self, client: &reqwest::Client, key: &str, body: &str) -> serde_json::Value {
        self.source.put(BUCKET, key, body);
        let res = client
            .post(format!("{}/notifications/object-created", self.base_url))
            .json(&notification(key))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Store whose every call fails as if the database were down.
struct UnavailableStore;

#[async_trait::async_trait]
impl CatalogStore for UnavailableStore {
    async fn query(&self, _sku: &str) -> Result<Vec<Item>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn batch_write(&self, _items: Vec<Item>) -> Result<BatchWriteOutput, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

fn notification(key: &str) -> serde_json::Value {
    json!({
        "Records": [{
            "s3": {
                "bucket": { "name": BUCKET },
                "object": { "key": key }
            }
        }]
    })
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn empty_catalog_lists_no_products() {
    let srv = TestServer::spawn().await;

    for path in ["/products", "/products/"] {
        let res = reqwest::get(format!("{}{}", srv.base_url, path)).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK, "GET {path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "products": [] }), "GET {path}");
    }
}

#[tokio::test]
async fn store_failure_is_500_with_error_code() {
    let srv = TestServer::spawn_with_store(Arc::new(UnavailableStore)).await;

    for path in ["/products", "/products/A1"] {
        let res = reqwest::get(format!("{}{}", srv.base_url, path)).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "GET {path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "store_error", "GET {path}");
        assert!(body["message"].as_str().unwrap().contains("connection refused"));
    }
}

#[tokio::test]
async fn unknown_sku_is_404_with_empty_body() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/products/NOPE", srv.base_url)).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn upload_then_read_merged_products() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let report = srv
        .upload(&client, "products/batch1.csv", "sku,name,price\nA1,Widget,9.99\nA2,Gadget,19.99\n")
        .await;
    assert_eq!(report["files"][0]["outcome"]["status"], "imported");
    assert_eq!(report["files"][0]["outcome"]["rows"], 2);
    srv.upload(&client, "stock/batch1.csv", "sku,quantity\nA1,42\n").await;

    let res = client
        .get(format!("{}/products/A1", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let a1: serde_json::Value = res.json().await.unwrap();
    assert_eq!(a1, json!({ "sku": "A1", "name": "Widget", "price": 9.99, "quantity": 42 }));

    let res = client
        .get(format!("{}/products/A2", srv.base_url))
        .send()
        .await
        .unwrap();
    let a2: serde_json::Value = res.json().await.unwrap();
    assert_eq!(a2, json!({ "sku": "A2", "name": "Gadget", "price": 19.99 }));

    let res = client
        .get(format!("{}/products", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["products"][0], a1);
    assert_eq!(body["products"][1], a2);
}

#[tokio::test]
async fn skipped_and_missing_files_still_return_200() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/notifications/object-created", srv.base_url))
        .json(&json!({
            "Records": [
                { "s3": { "bucket": { "name": BUCKET }, "object": { "key": "loose.csv" } } },
                { "s3": { "bucket": { "name": BUCKET }, "object": { "key": "stock/never-uploaded.csv" } } }
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let report: serde_json::Value = res.json().await.unwrap();
    assert_eq!(report["files"][0]["outcome"], json!({ "status": "skipped", "reason": "malformed_key" }));
    assert_eq!(report["files"][1]["outcome"]["status"], "fetch_failed");

    let res = reqwest::get(format!("{}/products", srv.base_url)).await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "products": [] }));
}

#[tokio::test]
async fn unparsable_notification_is_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/notifications/object-created", srv.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_notification");
}
