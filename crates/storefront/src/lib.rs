//! PPS storefront library.
//!
//! Glue between a storefront and a Medusa store API:
//!
//! - [`medusa`] - REST client for products, collections and carts
//! - [`cache`] - product cache with durable-storage fallback
//! - [`cart`] - cart synchronizer that mirrors the backend's cart
//! - [`storage`] - durable key-value snapshots
//! - [`services`] - catalog loading and session-token authentication
//! - [`routes`] / [`middleware`] - the axum HTTP surface
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod cart;
pub mod config;
pub mod error;
pub mod medusa;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
