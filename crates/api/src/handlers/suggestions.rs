//! Handlers for the suggestion review queue and resolutions.

use atelier_core::error::CoreError;
use atelier_core::mutation::MutationPreview;
use atelier_core::queue::{self, QueueCursor, DEFAULT_QUEUE_LIMIT, MAX_QUEUE_LIMIT};
use atelier_db::models::correction::CorrectionWithTargets;
use atelier_db::models::document::SourceDocument;
use atelier_db::models::suggestion::{Suggestion, SuggestionListParams};
use atelier_db::models::tag::Tag;
use atelier_db::repositories::{CorrectionRepo, DocumentRepo, SuggestionRepo, TagRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use crate::engine::decision::{self, ApproveRequest, RejectRequest, ResolutionOutcome};
use crate::engine::matcher::{self, MatchAnnotation};
use crate::engine::preview;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A queue entry: the stored suggestion plus its read-time annotation.
#[derive(Debug, Serialize)]
pub struct QueueItem {
    #[serde(flatten)]
    pub suggestion: Suggestion,
    pub annotation: MatchAnnotation,
}

/// One page of the review queue.
#[derive(Debug, Serialize)]
pub struct QueuePage {
    pub items: Vec<QueueItem>,
    /// Keyset token for the next page; absent on the last page.
    pub next_cursor: Option<String>,
}

/// Everything a reviewer sees for one suggestion.
#[derive(Debug, Serialize)]
pub struct SuggestionDetail {
    #[serde(flatten)]
    pub suggestion: Suggestion,
    pub document: Option<SourceDocument>,
    pub annotation: Option<MatchAnnotation>,
    /// The mutation diff approval would apply; absent once resolved or
    /// when the suggestion has no executable actions.
    pub preview: Option<MutationPreview>,
    pub tags: Vec<Tag>,
    pub correction: Option<CorrectionWithTargets>,
}

/// `GET /api/v1/suggestions`
///
/// The pending review queue, ordered by confidence DESC, created_at DESC,
/// id DESC, annotated with active pattern matches at read time.
pub async fn list_queue(
    State(state): State<AppState>,
    Query(params): Query<SuggestionListParams>,
) -> AppResult<Json<DataResponse<QueuePage>>> {
    let page = fetch_queue_page(&state, &params).await?;
    Ok(Json(DataResponse { data: page }))
}

/// `GET /api/v1/suggestions/next`
///
/// The single highest-priority pending suggestion after the cursor, or
/// `null` when the queue is exhausted.
pub async fn next_suggestion(
    State(state): State<AppState>,
    Query(mut params): Query<SuggestionListParams>,
) -> AppResult<Json<DataResponse<Option<QueueItem>>>> {
    params.limit = Some(1);
    let page = fetch_queue_page(&state, &params).await?;
    Ok(Json(DataResponse {
        data: page.items.into_iter().next(),
    }))
}

/// `GET /api/v1/suggestions/{id}`
pub async fn get_suggestion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DataResponse<SuggestionDetail>>> {
    let suggestion = SuggestionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Suggestion",
            id,
        }))?;

    let document = DocumentRepo::find_by_id(&state.pool, suggestion.source_id).await?;
    let annotation = match &document {
        Some(doc) => Some(
            matcher::annotate(
                &state.pool,
                &state.config.internal_domains,
                doc,
                &suggestion,
            )
            .await?,
        ),
        None => None,
    };

    let preview = if suggestion.status == atelier_core::suggestion::STATUS_PENDING {
        preview::for_approval(&suggestion, None).ok()
    } else {
        None
    };

    let tags = TagRepo::list_for_suggestion(&state.pool, id).await?;
    let correction = CorrectionRepo::find_by_suggestion(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: SuggestionDetail {
            suggestion,
            document,
            annotation,
            preview,
            tags,
            correction,
        },
    }))
}

/// `POST /api/v1/suggestions/{id}/approve`
pub async fn approve_suggestion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ApproveRequest>,
) -> AppResult<Json<DataResponse<ResolutionOutcome>>> {
    let outcome =
        decision::approve(&state.pool, &state.config.internal_domains, id, &req).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// `POST /api/v1/suggestions/{id}/reject`
pub async fn reject_suggestion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> AppResult<Json<DataResponse<ResolutionOutcome>>> {
    let outcome =
        decision::reject(&state.pool, &state.config.internal_domains, id, &req).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// `POST /api/v1/suggestions/{id}/skip`
pub async fn skip_suggestion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DataResponse<Suggestion>>> {
    let skipped = decision::skip(&state.pool, id).await?;
    Ok(Json(DataResponse { data: skipped }))
}

/* --------------------------------------------------------------------------
Queue assembly
-------------------------------------------------------------------------- */

async fn fetch_queue_page(
    state: &AppState,
    params: &SuggestionListParams,
) -> AppResult<QueuePage> {
    let limit = queue::clamp_limit(params.limit, DEFAULT_QUEUE_LIMIT, MAX_QUEUE_LIMIT);
    let after = params
        .after
        .as_deref()
        .map(QueueCursor::decode)
        .transpose()?;

    let suggestions =
        SuggestionRepo::list_pending(&state.pool, params, limit, after.as_ref()).await?;

    let next_cursor = if suggestions.len() as i64 == limit {
        suggestions.last().map(|s| {
            QueueCursor {
                confidence: s.confidence,
                created_at: s.created_at,
                id: s.id,
            }
            .encode()
        })
    } else {
        None
    };

    // Annotation needs the source document; fetch and match per item
    // concurrently, page sizes are small.
    let items = futures::future::try_join_all(suggestions.into_iter().map(|suggestion| {
        async move {
            let document = DocumentRepo::find_by_id(&state.pool, suggestion.source_id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError(format!(
                        "Suggestion {} references missing document {}",
                        suggestion.id, suggestion.source_id
                    ))
                })?;
            let annotation = matcher::annotate(
                &state.pool,
                &state.config.internal_domains,
                &document,
                &suggestion,
            )
            .await?;
            Ok::<_, AppError>(QueueItem {
                suggestion,
                annotation,
            })
        }
    }))
    .await?;

    Ok(QueuePage { items, next_cursor })
}
