//! Document link models.
//!
//! A link row is the realized mutation of an approved link-style suggestion
//! or of a correction's replacement targets.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `document_links` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentLink {
    pub id: DbId,
    pub source_type: String,
    pub source_id: DbId,
    pub target_type: String,
    pub target_id: DbId,
    pub created_from_suggestion_id: Option<DbId>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a document link.
#[derive(Debug, Clone)]
pub struct NewDocumentLink {
    pub source_type: String,
    pub source_id: DbId,
    pub target_type: String,
    pub target_id: DbId,
    pub created_from_suggestion_id: Option<DbId>,
    pub created_by: Option<String>,
}
