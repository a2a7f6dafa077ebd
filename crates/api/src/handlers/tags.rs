//! Handlers for the tag dictionary.

use atelier_core::error::CoreError;
use atelier_db::models::tag::{CreateTag, Tag};
use atelier_db::repositories::TagRepo;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// `GET /api/v1/tags`
pub async fn list_tags(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Tag>>>> {
    let tags = TagRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// `POST /api/v1/tags`
///
/// Idempotent on name: posting an existing tag returns it unchanged.
pub async fn create_tag(
    State(state): State<AppState>,
    Json(input): Json<CreateTag>,
) -> AppResult<(StatusCode, Json<DataResponse<Tag>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Tag name must not be empty".to_string(),
        )));
    }
    let mut conn = state.pool.acquire().await?;
    let tag = TagRepo::create_or_get(&mut conn, &input.name, input.category.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}
