//! Route definitions for source documents and detector ingestion.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Document routes mounted at `/documents`.
///
/// ```text
/// POST   /                       -> create_document
/// GET    /{id}                   -> get_document
/// POST   /{id}/detections        -> ingest_detections
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(documents::create_document))
        .route("/{id}", get(documents::get_document))
        .route("/{id}/detections", post(documents::ingest_detections))
}
