//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Session-token validation and the in-memory session backend
//! - `catalog` - Product and collection loading that degrades on failure

pub mod auth;
pub mod catalog;
