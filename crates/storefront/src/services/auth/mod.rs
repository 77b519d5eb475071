//! Session-token authentication.
//!
//! The browser holds an opaque token in the `auth-session` cookie. The
//! server never stores the token itself: the session ID is the lower-hex
//! SHA-256 of the token.
//!
//! Sessions last 30 days. A session validated within 15 days of expiry is
//! extended to 30 days from now, so active users stay logged in.

mod error;

pub use error::AuthError;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use pps_core::{SessionId, UserId};

use crate::models::{AuthSession, AuthUser};

/// How long a fresh or renewed session lasts.
pub const SESSION_LIFETIME: Duration = Duration::days(30);

/// Sessions closer than this to expiry are renewed on validation.
pub const SESSION_RENEWAL_WINDOW: Duration = Duration::days(15);

/// Outcome of validating a session token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionValidation {
    pub session: Option<AuthSession>,
    pub user: Option<AuthUser>,
}

impl SessionValidation {
    /// No valid session for the token.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            session: None,
            user: None,
        }
    }
}

/// Backend that resolves session tokens to users.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Resolve a token. An unknown or expired token is not an error; it
    /// yields [`SessionValidation::none`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the backend itself fails.
    async fn validate_session_token(&self, token: &str) -> Result<SessionValidation, AuthError>;

    /// End a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the backend itself fails.
    async fn invalidate_session(&self, id: &SessionId) -> Result<(), AuthError>;
}

/// Generate a new session token: 20 random bytes, URL-safe base64.
#[must_use]
pub fn generate_session_token() -> String {
    let mut bytes = [0_u8; 20];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Session ID for a token.
#[must_use]
pub fn session_id_for_token(token: &str) -> SessionId {
    SessionId::new(format!("{:x}", Sha256::digest(token.as_bytes())))
}

// =============================================================================
// InMemorySessionStore
// =============================================================================

/// Process-local session backend.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, AuthSession>>,
    users: RwLock<HashMap<UserId, AuthUser>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `user` identified by `token`.
    pub fn create_session(&self, token: &str, user: AuthUser) -> AuthSession {
        self.create_session_at(token, user, Utc::now())
    }

    fn create_session_at(&self, token: &str, user: AuthUser, now: DateTime<Utc>) -> AuthSession {
        let session = AuthSession {
            id: session_id_for_token(token),
            user_id: user.id.clone(),
            expires_at: now + SESSION_LIFETIME,
        };

        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id.clone(), user);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id.clone(), session.clone());

        debug!(user_id = %session.user_id, "Created session");
        session
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> SessionValidation {
        let id = session_id_for_token(token);
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let Some(session) = sessions.get_mut(&id) else {
            return SessionValidation::none();
        };

        if session.is_expired(now) {
            debug!(session_id = %id, "Session expired");
            sessions.remove(&id);
            return SessionValidation::none();
        }

        if now >= session.expires_at - SESSION_RENEWAL_WINDOW {
            session.expires_at = now + SESSION_LIFETIME;
            debug!(session_id = %id, expires_at = %session.expires_at, "Renewed session");
        }

        let session = session.clone();
        drop(sessions);

        let user = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session.user_id)
            .cloned();

        match user {
            Some(user) => SessionValidation {
                session: Some(session),
                user: Some(user),
            },
            None => SessionValidation::none(),
        }
    }
}

#[async_trait]
impl SessionValidator for InMemorySessionStore {
    async fn validate_session_token(&self, token: &str) -> Result<SessionValidation, AuthError> {
        Ok(self.validate_at(token, Utc::now()))
    }

    async fn invalidate_session(&self, id: &SessionId) -> Result<(), AuthError> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        debug!(session_id = %id, "Invalidated session");
        Ok(())
    }
}
