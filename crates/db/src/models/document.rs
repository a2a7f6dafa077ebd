//! Source document models and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `source_documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SourceDocument {
    pub id: DbId,
    pub doc_type: String,
    pub title: String,
    pub sender: Option<String>,
    pub body_text: Option<String>,
    pub received_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for registering a new source document.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSourceDocument {
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    pub title: String,
    pub sender: Option<String>,
    pub body_text: Option<String>,
    pub received_at: Option<Timestamp>,
}

fn default_doc_type() -> String {
    "email".to_string()
}
