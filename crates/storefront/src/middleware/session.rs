//! Visitor session configuration.
//!
//! Anonymous visitors get a `tower-sessions` session carrying a generated
//! visitor ID. The ID selects the visitor's cart; the session itself holds
//! nothing else.
//!
//! Session records are files under `<data_dir>/sessions/`, so a visitor
//! keeps their cart across server restarts.

use std::path::PathBuf;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::models::keys;
use crate::storage::{DurableStore, FileStore, StorageError};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pps_visitor";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the visitor session layer, storing sessions under
/// [`StorefrontConfig::sessions_dir`].
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<FileSessionStore> {
    SessionManagerLayer::new(FileSessionStore::new(config.sessions_dir()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Session store keeping one JSON record per session in a directory.
///
/// File I/O runs on the blocking pool. Expired records are deleted when
/// they are next loaded.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    files: FileStore,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            files: FileStore::new(dir),
        }
    }

    async fn run<T, F>(&self, op: F) -> session_store::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&FileStore) -> Result<T, StorageError> + Send + 'static,
    {
        let files = self.files.clone();
        tokio::task::spawn_blocking(move || op(&files))
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?
            .map_err(|e| session_store::Error::Backend(e.to_string()))
    }

    async fn read(&self, id: Id) -> session_store::Result<Option<String>> {
        self.run(move |files| files.get_item(&id.to_string())).await
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.read(record.id).await?.is_some() {
            record.id = Id::default();
        }
        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let id = record.id;
        self.run(move |files| files.set_item(&id.to_string(), &json))
            .await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let Some(json) = self.read(*session_id).await? else {
            return Ok(None);
        };
        let record: Record = serde_json::from_str(&json)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        if record.expiry_date <= OffsetDateTime::now_utc() {
            debug!("Dropping expired visitor session");
            self.delete(session_id).await?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let id = *session_id;
        self.run(move |files| files.remove_item(&id.to_string()))
            .await
    }
}

/// Extractor yielding the visitor ID, assigning one on first visit.
///
/// IDs are UUIDs generated here, so they are safe to use as directory names.
pub struct Visitor(pub String);

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;

        let existing = session.get::<String>(keys::VISITOR_ID).await.map_err(|e| {
            error!(error = %e, "Failed to read visitor session");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        })?;

        if let Some(id) = existing.filter(|id| Uuid::parse_str(id).is_ok()) {
            return Ok(Self(id));
        }

        let id = Uuid::new_v4().to_string();
        session.insert(keys::VISITOR_ID, &id).await.map_err(|e| {
            error!(error = %e, "Failed to write visitor session");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        })?;
        Ok(Self(id))
    }
}
