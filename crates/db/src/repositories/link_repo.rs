//! Repository for the `document_links` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::link::{DocumentLink, NewDocumentLink};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, source_type, source_id, target_type, target_id, \
    created_from_suggestion_id, created_by, created_at";

/// Provides operations for document links.
pub struct LinkRepo;

impl LinkRepo {
    /// Insert a link unless the (source, target) pair already exists.
    ///
    /// Returns `None` when the pair was already linked, which makes link
    /// application idempotent at the row level.
    pub async fn insert_if_absent(
        conn: &mut sqlx::PgConnection,
        input: &NewDocumentLink,
    ) -> Result<Option<DocumentLink>, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_links
                (source_type, source_id, target_type, target_id,
                 created_from_suggestion_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (source_type, source_id, target_type, target_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentLink>(&query)
            .bind(&input.source_type)
            .bind(input.source_id)
            .bind(&input.target_type)
            .bind(input.target_id)
            .bind(input.created_from_suggestion_id)
            .bind(&input.created_by)
            .fetch_optional(conn)
            .await
    }

    /// List all links for a source document.
    pub async fn list_by_source(
        pool: &PgPool,
        source_type: &str,
        source_id: DbId,
    ) -> Result<Vec<DocumentLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_links
             WHERE source_type = $1 AND source_id = $2
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, DocumentLink>(&query)
            .bind(source_type)
            .bind(source_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the (source, target) pair is already linked.
    pub async fn pair_exists(
        conn: &mut sqlx::PgConnection,
        source_type: &str,
        source_id: DbId,
        target_type: &str,
        target_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM document_links
                WHERE source_type = $1 AND source_id = $2
                  AND target_type = $3 AND target_id = $4
             )",
        )
        .bind(source_type)
        .bind(source_id)
        .bind(target_type)
        .bind(target_id)
        .fetch_one(conn)
        .await
    }
}
