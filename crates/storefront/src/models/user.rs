//! User domain types.

use serde::{Deserialize, Serialize};

use pps_core::UserId;

/// A logged-in storefront user, as resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
}
