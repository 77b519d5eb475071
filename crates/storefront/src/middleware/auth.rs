//! Session-cookie authentication middleware and extractors.
//!
//! [`auth_session_middleware`] resolves the `auth-session` cookie once per
//! request and stores the outcome in request extensions. Handlers read it
//! with [`OptionalAuth`] or [`RequireAuth`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use tower_sessions::cookie::{Cookie, SameSite, time::OffsetDateTime};
use tracing::{debug, error};

use crate::models::{AuthSession, AuthUser, keys};
use crate::state::AppState;

/// The user resolved from the session cookie, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthUser>);

/// The session resolved from the session cookie, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<AuthSession>);

/// Validate the session cookie and expose the result to handlers.
///
/// - No cookie: user and session are `None`.
/// - Valid session: the cookie is re-set with the session's (possibly
///   renewed) expiry.
/// - Unknown or expired token: the cookie is deleted.
/// - Backend failure: `500 Internal Server Error`.
///
/// A handler that sets the cookie itself (logout) takes precedence.
pub async fn auth_session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        request.extensions_mut().insert(CurrentUser(None));
        request.extensions_mut().insert(CurrentSession(None));
        return next.run(request).await;
    };

    let validation = match state.sessions().validate_session_token(&token).await {
        Ok(validation) => validation,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            error!(error = %e, sentry_event_id = %event_id, "Session validation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };

    let secure = state.config().is_secure();
    let cookie = match &validation.session {
        Some(session) => session_cookie(&token, session.expires_at, secure),
        None => {
            debug!("Dropping invalid session cookie");
            removal_cookie(secure)
        }
    };

    request
        .extensions_mut()
        .insert(CurrentUser(validation.user));
    request
        .extensions_mut()
        .insert(CurrentSession(validation.session));

    let mut response = next.run(request).await;

    if !sets_auth_cookie(response.headers()) {
        append_cookie(response.headers_mut(), &cookie);
    }

    response
}

/// Read the session token from the request's cookies.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == keys::AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// The session cookie carrying `token` until `expires_at`.
#[must_use]
pub fn session_cookie(token: &str, expires_at: DateTime<Utc>, secure: bool) -> Cookie<'static> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);

    Cookie::build((keys::AUTH_COOKIE, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .expires(expires)
        .build()
}

/// A cookie that deletes the session cookie.
#[must_use]
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((keys::AUTH_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(tower_sessions::cookie::time::Duration::ZERO)
        .build()
}

/// Append a `Set-Cookie` header.
pub fn append_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.append(SET_COOKIE, value);
    }
}

fn sets_auth_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{}=", keys::AUTH_COOKIE);
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

// =============================================================================
// Extractors
// =============================================================================

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, page requests are redirected to the login page
/// and `/api/` requests get `401 Unauthorized`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

/// Error returned when authentication is required but nobody is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .and_then(|current| current.0.clone())
            .map(Self)
            .ok_or_else(|| {
                if parts.uri.path().starts_with("/api/") {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<CurrentUser>()
                .and_then(|current| current.0.clone()),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth-session=tok123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok123"));

        let mut empty = HeaderMap::new();
        empty.insert(COOKIE, HeaderValue::from_static("auth-session="));
        assert!(session_token(&empty).is_none());
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let expires = DateTime::from_timestamp(1_900_000_000, 0).unwrap();
        let rendered = session_cookie("tok", expires, true).to_string();

        assert!(rendered.starts_with("auth-session=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Expires="));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let rendered = removal_cookie(false).to_string();
        assert!(rendered.starts_with("auth-session=;"));
        assert!(rendered.contains("Max-Age=0"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_handler_cookie_takes_precedence() {
        let mut headers = HeaderMap::new();
        assert!(!sets_auth_cookie(&headers));

        append_cookie(&mut headers, &removal_cookie(false));
        assert!(sets_auth_cookie(&headers));
    }
}
