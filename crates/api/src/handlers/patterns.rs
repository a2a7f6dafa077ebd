//! Handlers for the learned-pattern store.

use atelier_core::error::CoreError;
use atelier_db::models::pattern::{Pattern, PatternListParams};
use atelier_db::repositories::PatternRepo;
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// `GET /api/v1/patterns`
pub async fn list_patterns(
    State(state): State<AppState>,
    Query(params): Query<PatternListParams>,
) -> AppResult<Json<DataResponse<Vec<Pattern>>>> {
    let patterns = PatternRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: patterns }))
}

/// `GET /api/v1/patterns/{id}`
pub async fn get_pattern(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DataResponse<Pattern>>> {
    let pattern = PatternRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Pattern",
            id,
        }))?;
    Ok(Json(DataResponse { data: pattern }))
}

/// `POST /api/v1/patterns/{id}/deactivate`
///
/// Rows are never deleted; deactivation preserves the history that
/// explains past auto-classifications.
pub async fn deactivate_pattern(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DataResponse<Pattern>>> {
    if let Some(pattern) = PatternRepo::deactivate(&state.pool, id).await? {
        tracing::info!(pattern_id = id, "Pattern deactivated");
        return Ok(Json(DataResponse { data: pattern }));
    }
    match PatternRepo::find_by_id(&state.pool, id).await? {
        Some(_) => Err(AppError::Core(CoreError::Conflict(format!(
            "Pattern {id} is already inactive"
        )))),
        None => Err(AppError::Core(CoreError::NotFound {
            entity: "Pattern",
            id,
        })),
    }
}
