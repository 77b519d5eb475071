//! Cart snapshots surviving a restart.

#![allow(clippy::unwrap_used)]

use httpmock::prelude::*;
use pps_core::VariantId;
use pps_integration_tests::{TestStorefront, cart_json, test_config, visitor_client};
use pps_storefront::cart::VisitorCarts;
use pps_storefront::medusa::MedusaClient;
use serde_json::{Value, json};

#[tokio::test]
async fn test_cart_restored_for_same_visitor() {
    let medusa = MockServer::start_async().await;
    let create = medusa
        .mock_async(|when, then| {
            when.method(POST).path("/store/carts");
            then.status(200).json_body(json!({"cart": cart_json("cart_1", &[])}));
        })
        .await;
    medusa
        .mock_async(|when, then| {
            when.method(POST).path("/store/carts/cart_1/line-items");
            then.status(200)
                .json_body(json!({"cart": cart_json("cart_1", &[("li_1", "variant_1", 3)])}));
        })
        .await;
    let retrieve = medusa
        .mock_async(|when, then| {
            when.method(GET).path("/store/carts/cart_1");
            then.status(200)
                .json_body(json!({"cart": cart_json("cart_1", &[("li_1", "variant_1", 4)])}));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&medusa.base_url(), dir.path()).unwrap();

    {
        let carts = VisitorCarts::new(MedusaClient::new(&config.medusa), config.carts_dir());
        let cart = carts.for_visitor("visitor-a").await;
        cart.add_item(&VariantId::new("variant_1"), 3).await.unwrap();
    }

    // A fresh registry reads the snapshot back from disk
    let carts = VisitorCarts::new(MedusaClient::new(&config.medusa), config.carts_dir());
    let cart = carts.for_visitor("visitor-a").await;
    let restored = cart.snapshot().unwrap();
    assert_eq!(restored.id.as_str(), "cart_1");
    assert_eq!(restored.item_count(), 3);

    // Refresh reuses the restored ID instead of creating a cart
    let refreshed = cart.refresh_cart().await.unwrap();
    assert_eq!(refreshed.item_count(), 4);
    create.assert_hits_async(1).await;
    retrieve.assert_hits_async(1).await;

    assert!(carts.for_visitor("visitor-b").await.snapshot().is_none());
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let medusa = MockServer::start_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&medusa.base_url(), dir.path()).unwrap();

    let visitor_dir = config.carts_dir().join("visitor-a");
    std::fs::create_dir_all(&visitor_dir).unwrap();
    std::fs::write(visitor_dir.join("medusa_cart.json"), "{not json").unwrap();

    let carts = VisitorCarts::new(MedusaClient::new(&config.medusa), config.carts_dir());
    let cart = carts.for_visitor("visitor-a").await;
    assert!(cart.snapshot().is_none());
    assert!(cart.cart_id().is_none());
}

#[tokio::test]
async fn test_visitor_keeps_cart_across_server_restart() {
    let medusa = MockServer::start_async().await;
    let create = medusa
        .mock_async(|when, then| {
            when.method(POST).path("/store/carts");
            then.status(200).json_body(json!({"cart": cart_json("cart_1", &[])}));
        })
        .await;
    medusa
        .mock_async(|when, then| {
            when.method(POST).path("/store/carts/cart_1/line-items");
            then.status(200)
                .json_body(json!({"cart": cart_json("cart_1", &[("li_1", "variant_1", 2)])}));
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = visitor_client().unwrap();

    let first = TestStorefront::spawn(&medusa.base_url(), dir.path())
        .await
        .unwrap();
    let response = client
        .post(first.url("/api/cart/items"))
        .json(&json!({"variant_id": "variant_1", "quantity": 2}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    drop(first);

    // Same data directory and same cookie jar, new process state
    let second = TestStorefront::spawn(&medusa.base_url(), dir.path())
        .await
        .unwrap();
    let view: Value = client
        .get(second.url("/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["cart"]["id"], "cart_1");
    assert_eq!(view["summary"]["item_count"], 2);
    create.assert_hits_async(1).await;
}
