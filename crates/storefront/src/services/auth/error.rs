//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during session validation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The session backend could not be reached or failed.
    #[error("session backend error: {0}")]
    Backend(String),

    /// The session references a user that does not exist.
    #[error("user not found")]
    UserNotFound,
}
