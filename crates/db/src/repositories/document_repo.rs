//! Repository for the `source_documents` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateSourceDocument, SourceDocument};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, doc_type, title, sender, body_text, received_at, created_at";

/// Provides operations for source documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Register a new source document.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSourceDocument,
    ) -> Result<SourceDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO source_documents (doc_type, title, sender, body_text, received_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SourceDocument>(&query)
            .bind(&input.doc_type)
            .bind(&input.title)
            .bind(&input.sender)
            .bind(&input.body_text)
            .bind(input.received_at)
            .fetch_one(pool)
            .await
    }

    /// Find a document by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SourceDocument>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM source_documents WHERE id = $1");
        sqlx::query_as::<_, SourceDocument>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
