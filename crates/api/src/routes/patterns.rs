//! Route definitions for the learned-pattern store.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::patterns;
use crate::state::AppState;

/// Pattern routes mounted at `/patterns`.
///
/// ```text
/// GET    /                     -> list_patterns
/// GET    /{id}                 -> get_pattern
/// POST   /{id}/deactivate      -> deactivate_pattern
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(patterns::list_patterns))
        .route("/{id}", get(patterns::get_pattern))
        .route("/{id}/deactivate", post(patterns::deactivate_pattern))
}
