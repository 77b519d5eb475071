//! Collection route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::medusa::Collection;
use crate::services::catalog;
use crate::state::AppState;

/// List collections. A backend failure yields an empty list.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<Collection>> {
    Json(catalog::load_collections(state.medusa()).await)
}
