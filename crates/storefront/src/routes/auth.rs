//! Auth route handlers.

use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, instrument};

use crate::error::Result;
use crate::middleware::CurrentSession;
use crate::middleware::auth::{append_cookie, removal_cookie};
use crate::state::AppState;

/// Log out: end the session and drop the cookie.
///
/// Answers `401 Unauthorized` when there is no session.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Option<Extension<CurrentSession>>,
) -> Result<Response> {
    let Some(session) = session.and_then(|Extension(current)| current.0) else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    state.sessions().invalidate_session(&session.id).await?;
    info!(user_id = %session.user_id, "User logged out");

    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, &removal_cookie(state.config().is_secure()));

    Ok((StatusCode::FOUND, headers, Redirect::to("/auth/login")).into_response())
}
