//! Account route handlers (requires auth).

use axum::Json;

use crate::middleware::RequireAuth;
use crate::models::AuthUser;

/// Show the logged-in user.
pub async fn show(RequireAuth(user): RequireAuth) -> Json<AuthUser> {
    Json(user)
}
