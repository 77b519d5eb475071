//! Medusa store API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP with JSON bodies. Transient failures
//! (network errors, 429, 5xx) of `GET` requests are retried with a linear
//! backoff. Cart writes are sent once: a 5xx does not prove the backend
//! skipped the write, and a second `POST /store/carts` would create a second
//! cart. No request timeout is imposed beyond the transport default.

use std::sync::Arc;
use std::time::Duration;

use pps_core::{CartId, LineItemId, ProductId, Quantity, VariantId};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::MedusaConfig;

use super::types::{
    AddLineItemBody, Cart, CartResponse, Collection, CollectionListResponse, CreateCartBody,
    Product, ProductListQuery, ProductListResponse, ProductResponse, UpdateLineItemBody,
};
use super::{RemoteServiceError, StoreApi};

/// Header carrying the publishable key on store-scoped calls.
pub const PUBLISHABLE_KEY_HEADER: &str = "x-publishable-api-key";

/// Base delay between retries; attempt `n` waits `n` times this.
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Maximum number of body characters kept in errors and logs.
const BODY_SNIPPET_LEN: usize = 500;

// =============================================================================
// MedusaClient
// =============================================================================

/// Client for the Medusa store API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct MedusaClient {
    inner: Arc<MedusaClientInner>,
}

struct MedusaClientInner {
    client: reqwest::Client,
    config: MedusaConfig,
}

impl MedusaClient {
    /// Create a new store API client.
    #[must_use]
    pub fn new(config: &MedusaConfig) -> Self {
        Self {
            inner: Arc::new(MedusaClientInner {
                client: reqwest::Client::new(),
                config: config.clone(),
            }),
        }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &MedusaConfig {
        &self.inner.config
    }

    /// Build a URL from the backend base and percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteServiceError> {
        let mut url = self.inner.config.backend_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RemoteServiceError::MalformedResponse(format!(
                    "backend URL cannot be a base: {}",
                    self.inner.config.backend_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute a request, retrying transient failures of reads.
    async fn execute<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, RemoteServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let max_retries = if method == Method::GET {
            self.inner.config.max_retries
        } else {
            0
        };
        let mut attempt: u32 = 0;

        loop {
            match self.execute_once(method.clone(), url.clone(), body).await {
                Err(err) if err.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    warn!(
                        error = %err,
                        attempt,
                        max_retries,
                        url = %url,
                        "Transient Medusa error, retrying"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                result => return result,
            }
        }
    }

    /// Execute a single request.
    async fn execute_once<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, RemoteServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let mut request = self
            .inner
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.inner.config.publishable_key {
            request = request.header(PUBLISHABLE_KEY_HEADER, key.expose_secret());
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let snippet = snippet(&response_text);
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(status = %status, body = %snippet, "Medusa returned non-success status");
            } else {
                debug!(status = %status, body = %snippet, "Medusa returned non-success status");
            }
            return Err(RemoteServiceError::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&response_text),
                "Failed to parse Medusa response"
            );
            RemoteServiceError::from(e)
        })
    }

    async fn cart_call<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Cart, RemoteServiceError>
    where
        B: Serialize + Sync,
    {
        let url = self.url(segments)?;
        let response: CartResponse = self.execute(method, url, body).await?;
        response.into_cart().ok_or_else(|| {
            RemoteServiceError::MalformedResponse("response contains no cart".to_string())
        })
    }
}

impl StoreApi for MedusaClient {
    // =========================================================================
    // Catalog
    // =========================================================================

    #[instrument(skip(self), fields(limit = query.limit))]
    async fn list_products(
        &self,
        query: &ProductListQuery,
    ) -> Result<Vec<Product>, RemoteServiceError> {
        let mut url = self.url(&["store", "products"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(offset) = query.offset {
                pairs.append_pair("offset", &offset.to_string());
            }
            let region = query
                .region_id
                .as_ref()
                .map(pps_core::RegionId::as_str)
                .or(self.inner.config.region_id.as_deref());
            if let Some(region) = region {
                pairs.append_pair("region_id", region);
            }
        }

        let response: ProductListResponse = self.execute(Method::GET, url, None::<&()>).await?;
        debug!(count = response.products.len(), "Listed products");
        Ok(response.products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn retrieve_product(&self, id: &ProductId) -> Result<Product, RemoteServiceError> {
        let url = self.url(&["store", "products", id.as_str()])?;
        let response: ProductResponse = self.execute(Method::GET, url, None::<&()>).await?;
        response.product.ok_or_else(|| {
            RemoteServiceError::MalformedResponse("response contains no product".to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<Collection>, RemoteServiceError> {
        let url = self.url(&["store", "collections"])?;
        let response: CollectionListResponse =
            self.execute(Method::GET, url, None::<&()>).await?;
        Ok(response.collections)
    }

    // =========================================================================
    // Cart (never cached - mutable state)
    // =========================================================================

    #[instrument(skip(self))]
    async fn create_cart(&self) -> Result<Cart, RemoteServiceError> {
        let body = CreateCartBody {
            region_id: self.inner.config.region_id.as_deref(),
        };
        self.cart_call(Method::POST, &["store", "carts"], Some(&body))
            .await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn retrieve_cart(&self, cart_id: &CartId) -> Result<Cart, RemoteServiceError> {
        self.cart_call(Method::GET, &["store", "carts", cart_id.as_str()], None::<&()>)
            .await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id, quantity = %quantity))]
    async fn add_line_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: Quantity,
    ) -> Result<Cart, RemoteServiceError> {
        let body = AddLineItemBody {
            variant_id: variant_id.as_str(),
            quantity: quantity.get(),
        };
        self.cart_call(
            Method::POST,
            &["store", "carts", cart_id.as_str(), "line-items"],
            Some(&body),
        )
        .await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id, line_item_id = %line_item_id, quantity = %quantity))]
    async fn update_line_item(
        &self,
        cart_id: &CartId,
        line_item_id: &LineItemId,
        quantity: Quantity,
    ) -> Result<Cart, RemoteServiceError> {
        let body = UpdateLineItemBody {
            quantity: quantity.get(),
        };
        self.cart_call(
            Method::POST,
            &[
                "store",
                "carts",
                cart_id.as_str(),
                "line-items",
                line_item_id.as_str(),
            ],
            Some(&body),
        )
        .await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id, line_item_id = %line_item_id))]
    async fn delete_line_item(
        &self,
        cart_id: &CartId,
        line_item_id: &LineItemId,
    ) -> Result<Cart, RemoteServiceError> {
        self.cart_call(
            Method::DELETE,
            &[
                "store",
                "carts",
                cart_id.as_str(),
                "line-items",
                line_item_id.as_str(),
            ],
            None::<&()>,
        )
        .await
    }
}

/// Truncate a response body for logs and error messages.
fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}
