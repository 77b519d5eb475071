//! Session-related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pps_core::{SessionId, UserId};

/// A server-side authentication session.
///
/// The client holds the token; only its digest is used as the ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Lower-hex SHA-256 of the session token.
    pub id: SessionId,
    /// User who owns the session.
    pub user_id: UserId,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Keys and cookie names for session data.
pub mod keys {
    /// Cookie carrying the authentication session token.
    pub const AUTH_COOKIE: &str = "auth-session";

    /// Visitor-session key holding the anonymous visitor ID.
    pub const VISITOR_ID: &str = "visitor_id";
}
