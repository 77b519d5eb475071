//! Domain models for the storefront.
//!
//! Catalog and cart types live in [`crate::medusa`]; these are the types the
//! storefront owns itself.

pub mod session;
pub mod user;

pub use session::{AuthSession, keys};
pub use user::AuthUser;
