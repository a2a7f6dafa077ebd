//! Repository for the `suggestions` table.
//!
//! Rows are created through [`SuggestionRepo::upsert_draft`] (detector
//! ingestion, with in-place de-duplication of identical pending drafts) and
//! resolved through the `lock_pending` / `mark_*` methods, which the
//! decision processor calls inside a single transaction per resolution.

use atelier_core::queue::QueueCursor;
use atelier_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::suggestion::{NewSuggestion, Suggestion, SuggestionListParams};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, suggestion_type, source_type, source_id, target_type, target_id, \
    confidence, evidence, suggested_actions, status, resolved_at, resolved_by, \
    rejection_reason, reviewer_notes, error_note, last_skipped_at, created_at, updated_at";

/// Provides operations for suggestions.
pub struct SuggestionRepo;

impl SuggestionRepo {
    /// Insert a validated detector draft, or update the evidence, confidence,
    /// and actions of an identical already-pending draft in place.
    ///
    /// De-duplication rides on the `uq_suggestions_pending_identity` partial
    /// unique index. Callers can distinguish the two outcomes via
    /// [`Suggestion::freshly_created`].
    pub async fn upsert_draft(
        pool: &PgPool,
        input: &NewSuggestion,
    ) -> Result<Suggestion, sqlx::Error> {
        let query = format!(
            "INSERT INTO suggestions
                (suggestion_type, source_type, source_id, target_type, target_id,
                 confidence, evidence, suggested_actions)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (source_type, source_id, suggestion_type,
                          COALESCE(target_type, ''), COALESCE(target_id, 0))
                 WHERE status = 'pending'
             DO UPDATE SET
                 confidence = EXCLUDED.confidence,
                 evidence = EXCLUDED.evidence,
                 suggested_actions = EXCLUDED.suggested_actions,
                 updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Suggestion>(&query)
            .bind(&input.suggestion_type)
            .bind(&input.source_type)
            .bind(input.source_id)
            .bind(&input.target_type)
            .bind(input.target_id)
            .bind(input.confidence)
            .bind(Json(&input.evidence))
            .bind(Json(&input.suggested_actions))
            .fetch_one(pool)
            .await
    }

    /// Find a suggestion by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Suggestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suggestions WHERE id = $1");
        sqlx::query_as::<_, Suggestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List pending suggestions in review-queue order: confidence DESC,
    /// then created_at DESC, then id DESC.
    ///
    /// Pagination is keyset-based on that triple. Postgres row comparison
    /// `(confidence, created_at, id) < (...)` continues the descending
    /// order exactly, so concurrently resolved rows are neither skipped
    /// nor repeated.
    pub async fn list_pending(
        pool: &PgPool,
        params: &SuggestionListParams,
        limit: i64,
        after: Option<&QueueCursor>,
    ) -> Result<Vec<Suggestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM suggestions
             WHERE status = 'pending'
               AND ($1::text IS NULL OR suggestion_type = $1)
               AND ($2::float8 IS NULL OR confidence >= $2)
               AND ($3::float8 IS NULL OR confidence <= $3)
               AND ($4::float8 IS NULL
                    OR (confidence, created_at, id) < ($4, $5::timestamptz, $6::bigint))
             ORDER BY confidence DESC, created_at DESC, id DESC
             LIMIT $7"
        );
        sqlx::query_as::<_, Suggestion>(&query)
            .bind(&params.suggestion_type)
            .bind(params.min_confidence)
            .bind(params.max_confidence)
            .bind(after.map(|c| c.confidence))
            .bind(after.map(|c| c.created_at))
            .bind(after.map(|c| c.id))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Fetch a suggestion with `SELECT ... FOR UPDATE` inside the caller's
    /// transaction. The row lock is what serializes two reviewers racing on
    /// the same item; the loser blocks here, then sees a resolved status.
    pub async fn lock_by_id(
        conn: &mut sqlx::PgConnection,
        id: DbId,
    ) -> Result<Option<Suggestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suggestions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Suggestion>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Transition a locked pending suggestion to `applied`.
    ///
    /// Passes through the transient `approved` state in the same statement
    /// set so the "approved is always followed by applied in the same
    /// transaction" invariant holds by construction. Clears any stale
    /// error note from a previously failed apply.
    pub async fn mark_applied(
        conn: &mut sqlx::PgConnection,
        id: DbId,
        resolved_by: Option<&str>,
        reviewer_notes: Option<&str>,
    ) -> Result<Suggestion, sqlx::Error> {
        let query = format!(
            "UPDATE suggestions
             SET status = 'applied', resolved_at = now(), resolved_by = $2,
                 reviewer_notes = $3, error_note = NULL, updated_at = now()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Suggestion>(&query)
            .bind(id)
            .bind(resolved_by)
            .bind(reviewer_notes)
            .fetch_one(conn)
            .await
    }

    /// Transition a locked pending suggestion to `rejected`.
    pub async fn mark_rejected(
        conn: &mut sqlx::PgConnection,
        id: DbId,
        rejection_reason: &str,
        resolved_by: Option<&str>,
    ) -> Result<Suggestion, sqlx::Error> {
        let query = format!(
            "UPDATE suggestions
             SET status = 'rejected', resolved_at = now(), resolved_by = $3,
                 rejection_reason = $2, updated_at = now()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Suggestion>(&query)
            .bind(id)
            .bind(rejection_reason)
            .bind(resolved_by)
            .fetch_one(conn)
            .await
    }

    /// Stamp a pending suggestion as skipped for this session. Status stays
    /// `pending`; returns `None` when the row is missing or already resolved.
    pub async fn record_skip(pool: &PgPool, id: DbId) -> Result<Option<Suggestion>, sqlx::Error> {
        let query = format!(
            "UPDATE suggestions
             SET last_skipped_at = now(), updated_at = now()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Suggestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Attach an error note after a rolled-back apply so the reviewer sees
    /// what went wrong. Runs outside the failed transaction; the row is
    /// still `pending`.
    pub async fn attach_error_note(
        pool: &PgPool,
        id: DbId,
        note: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE suggestions SET error_note = $2, updated_at = now()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(note)
        .execute(pool)
        .await?;
        Ok(())
    }
}
