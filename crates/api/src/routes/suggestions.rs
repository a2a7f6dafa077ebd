//! Route definitions for the review queue and suggestion resolutions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::suggestions;
use crate::state::AppState;

/// Suggestion routes mounted at `/suggestions`.
///
/// ```text
/// GET    /                  -> list_queue
/// GET    /next              -> next_suggestion
/// GET    /{id}              -> get_suggestion
/// POST   /{id}/approve      -> approve_suggestion
/// POST   /{id}/reject       -> reject_suggestion
/// POST   /{id}/skip         -> skip_suggestion
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(suggestions::list_queue))
        .route("/next", get(suggestions::next_suggestion))
        .route("/{id}", get(suggestions::get_suggestion))
        .route("/{id}/approve", post(suggestions::approve_suggestion))
        .route("/{id}/reject", post(suggestions::reject_suggestion))
        .route("/{id}/skip", post(suggestions::skip_suggestion))
}
