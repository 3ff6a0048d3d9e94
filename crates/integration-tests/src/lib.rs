//! Integration tests for Mobile Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mobile-shop-integration-tests
//! ```
//!
//! Everything runs in-process: a fake upstream product API and the real
//! storefront router are served on ephemeral local ports, so no network
//! access or credentials are needed.
//!
//! # Test Categories
//!
//! - `phones_api` - Storefront routes, error envelopes, proxy data source
//! - `cart_store` - Cart behavior across hydration and persistence

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, RawQuery},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use mobile_shop_storefront::config::{StorefrontConfig, UpstreamConfig};
use mobile_shop_storefront::repository::PhoneRepository;
use mobile_shop_storefront::routes::router;
use mobile_shop_storefront::state::AppState;
use mobile_shop_storefront::upstream::UpstreamClient;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// API key the fake upstream accepts.
pub const TEST_API_KEY: &str = "integration-key";

/// Upstream timeout used by test storefronts.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(300);

/// Serve `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Catalog served by the fake upstream.
#[must_use]
pub fn catalog() -> Vec<Value> {
    vec![
        json!({ "id": "SMG-S24", "brand": "Samsung", "name": "Galaxy S24", "basePrice": 899, "imageUrl": "s24.png" }),
        json!({ "id": "APL-IP15", "brand": "Apple", "name": "iPhone 15", "basePrice": 909.99, "imageUrl": "ip15.png" }),
        json!({ "id": "GGL-PX8", "brand": "Google", "name": "Pixel 8", "basePrice": 699, "imageUrl": "px8.png" }),
        json!({ "id": "SMG-S24", "brand": "Samsung", "name": "Galaxy S24 (repeat)", "basePrice": 1, "imageUrl": "" }),
    ]
}

/// Detail record for `id`.
#[must_use]
pub fn detail(id: &str) -> Value {
    json!({
        "id": id,
        "brand": "Samsung",
        "name": "Galaxy S24",
        "description": "Compact flagship",
        "basePrice": 899,
        "rating": 4.6,
        "specs": { "screen": "6.2\"", "battery": "4000 mAh", "os": "Android 14" },
        "colorOptions": [
            { "name": "Onyx Black", "hexCode": "#000000", "imageUrl": "s24-black.png" },
            { "name": "Cobalt Violet", "hexCode": "#8a7fbf", "imageUrl": "s24-violet.png" }
        ],
        "storageOptions": [
            { "capacity": "128GB", "price": 899 },
            { "capacity": "256GB", "price": 959 }
        ],
        "similarProducts": [
            { "id": "GGL-PX8", "brand": "Google", "name": "Pixel 8", "basePrice": 699, "imageUrl": "px8.png" }
        ]
    })
}

async fn list_products(headers: HeaderMap, RawQuery(query): RawQuery) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_API_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid api key" })));
    }

    let query = query.unwrap_or_default();
    if query.contains("search=slow") {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
    if query.contains("search=broken") {
        return (StatusCode::OK, Json(json!({ "products": [] })));
    }

    let term = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("search="))
        .unwrap_or_default()
        .to_lowercase();
    let phones: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&term))
        })
        .collect();
    (StatusCode::OK, Json(Value::Array(phones)))
}

async fn show_product(headers: HeaderMap, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_API_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid api key" })));
    }

    match id.as_str() {
        "missing" => (StatusCode::NOT_FOUND, Json(json!({ "error": "Product not found" }))),
        "listing" => (StatusCode::OK, Json(json!([]))),
        _ => (StatusCode::OK, Json(detail(&id))),
    }
}

/// Start the fake upstream product API and return its base URL.
pub async fn start_upstream() -> String {
    let router = Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(show_product));
    let addr = serve(router).await;
    format!("http://{addr}/")
}

/// A running storefront in front of a fake upstream.
pub struct TestContext {
    pub upstream_url: String,
    pub storefront_url: String,
    pub client: reqwest::Client,
}

impl TestContext {
    /// Start a fake upstream and a correctly configured storefront.
    pub async fn new() -> Self {
        let upstream_url = start_upstream().await;
        let storefront_url =
            start_storefront(UpstreamConfig::new(upstream_url.clone(), TEST_API_KEY)).await;
        Self {
            upstream_url,
            storefront_url,
            client: reqwest::Client::new(),
        }
    }

    /// Repository talking to this context's upstream.
    #[must_use]
    pub fn repository(&self) -> PhoneRepository {
        PhoneRepository::new(
            UpstreamClient::with_timeout(TEST_TIMEOUT),
            UpstreamConfig::new(self.upstream_url.clone(), TEST_API_KEY),
        )
    }

    /// `GET` a storefront path and return the status and JSON body.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.storefront_url))
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        let body = response.json::<Value>().await.unwrap();
        (status, body)
    }
}

/// Start a storefront with the given upstream settings and return its origin.
pub async fn start_storefront(upstream: UpstreamConfig) -> String {
    let repository = PhoneRepository::new(UpstreamClient::with_timeout(TEST_TIMEOUT), upstream.clone());
    let state = AppState::from_parts(StorefrontConfig::with_upstream(upstream), repository);
    let addr = serve(router(state)).await;
    format!("http://{addr}")
}
