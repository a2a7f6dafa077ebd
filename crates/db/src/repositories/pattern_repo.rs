//! Repository for the `patterns` table.
//!
//! Patterns are append/deactivate-only: a superseding write deactivates the
//! previous active row for the same key in the same transaction, preserving
//! the history that explains past auto-classifications.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::pattern::{CreatePattern, Pattern, PatternListParams};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, pattern_type, pattern_key, target_type, target_id, \
    confidence_boost, auto_apply, is_active, created_from_suggestion_id, notes, \
    created_at, deactivated_at";

/// Provides operations for learned patterns.
pub struct PatternRepo;

impl PatternRepo {
    /// Create a pattern, deactivating any existing active row with the same
    /// (pattern_type, pattern_key) so the key resolves to exactly one
    /// active target. Both writes commit together.
    pub async fn create_superseding(
        pool: &PgPool,
        input: &CreatePattern,
    ) -> Result<Pattern, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let superseded = sqlx::query(
            "UPDATE patterns
             SET is_active = FALSE, deactivated_at = now()
             WHERE pattern_type = $1 AND pattern_key = $2 AND is_active",
        )
        .bind(&input.pattern_type)
        .bind(&input.pattern_key)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let query = format!(
            "INSERT INTO patterns
                (pattern_type, pattern_key, target_type, target_id,
                 confidence_boost, auto_apply, created_from_suggestion_id, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let pattern = sqlx::query_as::<_, Pattern>(&query)
            .bind(&input.pattern_type)
            .bind(&input.pattern_key)
            .bind(&input.target_type)
            .bind(input.target_id)
            .bind(input.confidence_boost)
            .bind(input.auto_apply)
            .bind(input.created_from_suggestion_id)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if superseded > 0 {
            tracing::info!(
                pattern_id = pattern.id,
                pattern_type = %pattern.pattern_type,
                pattern_key = %pattern.pattern_key,
                superseded,
                "Pattern superseded prior active rule",
            );
        }

        Ok(pattern)
    }

    /// Find a pattern by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pattern>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patterns WHERE id = $1");
        sqlx::query_as::<_, Pattern>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the active pattern for an exact (pattern_type, pattern_key).
    pub async fn find_active_by_key(
        pool: &PgPool,
        pattern_type: &str,
        pattern_key: &str,
    ) -> Result<Option<Pattern>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM patterns
             WHERE pattern_type = $1 AND pattern_key = $2 AND is_active"
        );
        sqlx::query_as::<_, Pattern>(&query)
            .bind(pattern_type)
            .bind(pattern_key)
            .fetch_optional(pool)
            .await
    }

    /// List all active patterns of a given type. Used by the matcher to
    /// test keyword patterns against document text.
    pub async fn list_active_by_type(
        pool: &PgPool,
        pattern_type: &str,
    ) -> Result<Vec<Pattern>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM patterns
             WHERE pattern_type = $1 AND is_active
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Pattern>(&query)
            .bind(pattern_type)
            .fetch_all(pool)
            .await
    }

    /// List patterns, optionally filtered by type and activity.
    pub async fn list(
        pool: &PgPool,
        params: &PatternListParams,
    ) -> Result<Vec<Pattern>, sqlx::Error> {
        let active_only = params.active_only.unwrap_or(true);
        let query = format!(
            "SELECT {COLUMNS} FROM patterns
             WHERE ($1::text IS NULL OR pattern_type = $1)
               AND (NOT $2 OR is_active)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Pattern>(&query)
            .bind(&params.pattern_type)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    /// Deactivate a pattern. Returns `None` when the row is missing or
    /// already inactive. The row itself is never deleted.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Option<Pattern>, sqlx::Error> {
        let query = format!(
            "UPDATE patterns
             SET is_active = FALSE, deactivated_at = now()
             WHERE id = $1 AND is_active
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pattern>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
