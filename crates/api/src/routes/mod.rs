pub mod documents;
pub mod health;
pub mod patterns;
pub mod suggestions;
pub mod tags;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /documents                         register source document (POST)
/// /documents/{id}                    document with its links (GET)
/// /documents/{id}/detections         ingest a detector batch (POST)
///
/// /suggestions                       pending review queue (GET)
/// /suggestions/next                  highest-priority pending item (GET)
/// /suggestions/{id}                  full review detail (GET)
/// /suggestions/{id}/approve          apply and resolve (POST)
/// /suggestions/{id}/reject           reject, optionally with correction (POST)
/// /suggestions/{id}/skip             defer without resolving (POST)
///
/// /patterns                          list learned patterns (GET)
/// /patterns/{id}                     pattern detail (GET)
/// /patterns/{id}/deactivate          retire a pattern (POST)
///
/// /tags                              list, create
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/documents", documents::router())
        .nest("/suggestions", suggestions::router())
        .nest("/patterns", patterns::router())
        .nest("/tags", tags::router())
}
