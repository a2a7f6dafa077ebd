//! Handlers for source documents and detector ingestion.

use atelier_core::error::CoreError;
use atelier_db::models::document::{CreateSourceDocument, SourceDocument};
use atelier_db::models::link::DocumentLink;
use atelier_db::repositories::{DocumentRepo, LinkRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::engine::ingest::{self, IngestReport, IngestRequest};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A document with its catalog links.
#[derive(Debug, Serialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: SourceDocument,
    pub links: Vec<DocumentLink>,
}

/// `POST /api/v1/documents`
pub async fn create_document(
    State(state): State<AppState>,
    Json(input): Json<CreateSourceDocument>,
) -> AppResult<(StatusCode, Json<DataResponse<SourceDocument>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Document title must not be empty".to_string(),
        )));
    }
    let document = DocumentRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: document }),
    ))
}

/// `GET /api/v1/documents/{id}`
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DataResponse<DocumentDetail>>> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;
    let links = LinkRepo::list_by_source(&state.pool, &document.doc_type, document.id).await?;
    Ok(Json(DataResponse {
        data: DocumentDetail { document, links },
    }))
}

/// `POST /api/v1/documents/{id}/detections`
///
/// Ingest one detector batch for the document. Always returns 200 with a
/// report; malformed drafts are quarantined inside it, never a batch-level
/// failure.
pub async fn ingest_detections(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<IngestRequest>,
) -> AppResult<Json<DataResponse<IngestReport>>> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;

    let report = ingest::ingest(
        &state.pool,
        &state.config.internal_domains,
        state.config.auto_apply_enabled,
        &document,
        &req,
    )
    .await?;

    Ok(Json(DataResponse { data: report }))
}
