//! Repository for the `corrections` and `correction_targets` tables.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::correction::{Correction, CorrectionTarget, CorrectionWithTargets, TargetRef};

const COLUMNS: &str =
    "id, suggestion_id, rejection_reason, notes, created_pattern_id, created_at";

const TARGET_COLUMNS: &str = "id, correction_id, target_type, target_id";

/// Provides operations for correction records.
pub struct CorrectionRepo;

impl CorrectionRepo {
    /// Insert a correction with its target rows inside the caller's
    /// transaction (the same one that rejects the suggestion).
    pub async fn create(
        conn: &mut sqlx::PgConnection,
        suggestion_id: DbId,
        rejection_reason: &str,
        notes: Option<&str>,
        targets: &[TargetRef],
    ) -> Result<Correction, sqlx::Error> {
        let query = format!(
            "INSERT INTO corrections (suggestion_id, rejection_reason, notes)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let correction = sqlx::query_as::<_, Correction>(&query)
            .bind(suggestion_id)
            .bind(rejection_reason)
            .bind(notes)
            .fetch_one(&mut *conn)
            .await?;

        for target in targets {
            sqlx::query(
                "INSERT INTO correction_targets (correction_id, target_type, target_id)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (correction_id, target_type, target_id) DO NOTHING",
            )
            .bind(correction.id)
            .bind(&target.target_type)
            .bind(target.target_id)
            .execute(&mut *conn)
            .await?;
        }

        Ok(correction)
    }

    /// Record the pattern learned from this correction, once the pattern
    /// write (which happens after the rejection commits) has succeeded.
    pub async fn set_created_pattern(
        pool: &PgPool,
        correction_id: DbId,
        pattern_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE corrections SET created_pattern_id = $2 WHERE id = $1")
            .bind(correction_id)
            .bind(pattern_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Fetch the correction (with targets) for a rejected suggestion.
    pub async fn find_by_suggestion(
        pool: &PgPool,
        suggestion_id: DbId,
    ) -> Result<Option<CorrectionWithTargets>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM corrections WHERE suggestion_id = $1");
        let Some(correction) = sqlx::query_as::<_, Correction>(&query)
            .bind(suggestion_id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let targets_query = format!(
            "SELECT {TARGET_COLUMNS} FROM correction_targets
             WHERE correction_id = $1
             ORDER BY id"
        );
        let targets = sqlx::query_as::<_, CorrectionTarget>(&targets_query)
            .bind(correction.id)
            .fetch_all(pool)
            .await?;

        Ok(Some(CorrectionWithTargets {
            correction,
            targets,
        }))
    }
}
