//! Integration tests for the PPS storefront.
//!
//! Every test runs the real router on an ephemeral port in front of an
//! `httpmock` server standing in for Medusa, so no backend or network
//! access is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pps-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Product listing, product cache and its restore
//! - `storefront_cart` - Per-visitor cart flow over HTTP
//! - `cart_restore` - Cart snapshots surviving a restart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::Path;

use pps_storefront::config::{ConfigError, MedusaConfig, StorefrontConfig};
use pps_storefront::routes;
use pps_storefront::state::AppState;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// A storefront server running on a background task.
///
/// The server stops when this is dropped.
pub struct TestStorefront {
    addr: SocketAddr,
    state: AppState,
    handle: JoinHandle<()>,
}

impl TestStorefront {
    /// Start a storefront talking to `medusa_url` and persisting under
    /// `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no port can
    /// be bound.
    pub async fn spawn(
        medusa_url: &str,
        data_dir: &Path,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = test_config(medusa_url, data_dir)?;
        let state = AppState::new(config);
        let app = routes::app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The server's application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }
}

impl Drop for TestStorefront {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Storefront configuration for tests: no retries, no Sentry.
///
/// # Errors
///
/// Returns `ConfigError` if `medusa_url` does not parse.
pub fn test_config(medusa_url: &str, data_dir: &Path) -> Result<StorefrontConfig, ConfigError> {
    let mut medusa = MedusaConfig::for_backend(medusa_url)?;
    medusa.max_retries = 0;

    Ok(StorefrontConfig {
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://localhost".to_string(),
        data_dir: data_dir.to_path_buf(),
        medusa,
        sentry_dsn: None,
        sentry_environment: None,
    })
}

/// HTTP client that keeps cookies, so it acts as one visitor.
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub fn visitor_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().cookie_store(true).build()
}

/// A Medusa cart payload with one `{id, variant_id, quantity}` entry per item.
#[must_use]
pub fn cart_json(id: &str, items: &[(&str, &str, u32)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(line_id, variant_id, quantity)| {
            json!({"id": line_id, "variant_id": variant_id, "quantity": quantity})
        })
        .collect();
    let subtotal: u32 = items
        .iter()
        .filter_map(|item| item["quantity"].as_u64())
        .map(|q| u32::try_from(q).unwrap_or(0) * 1000)
        .sum();

    json!({
        "id": id,
        "items": items,
        "subtotal": subtotal,
        "total": subtotal,
        "currency_code": "usd"
    })
}

/// A Medusa product payload with one priced variant.
#[must_use]
pub fn product_json(id: &str, title: &str, amount: u32) -> Value {
    json!({
        "id": id,
        "title": title,
        "variants": [{
            "id": format!("{id}_variant"),
            "title": "Default",
            "prices": [{"amount": amount, "currency_code": "usd"}]
        }]
    })
}
