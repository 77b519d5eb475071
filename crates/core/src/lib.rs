//! PPS Core - Shared types library.
//!
//! This crate provides common types used across all PPS components:
//! - `storefront` - Medusa client, product cache, cart synchronizer, HTTP surface
//! - `cli` - Command-line tools for inspecting the catalog and driving a cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
