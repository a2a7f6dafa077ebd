//! Repository for the `tags` dictionary and `suggestion_tags` join table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::tag::Tag;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, category, created_at";

/// Provides operations for tags.
pub struct TagRepo;

impl TagRepo {
    /// Create a tag, or return the existing one with the same normalized
    /// name. Names are stored lowercase.
    pub async fn create_or_get(
        conn: &mut sqlx::PgConnection,
        name: &str,
        category: Option<&str>,
    ) -> Result<Tag, sqlx::Error> {
        let name = name.trim().to_lowercase();
        let query = format!(
            "INSERT INTO tags (name, category)
             VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(&name)
            .bind(category)
            .fetch_one(conn)
            .await
    }

    /// List all tags, alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags ORDER BY name");
        sqlx::query_as::<_, Tag>(&query).fetch_all(pool).await
    }

    /// Associate a tag with a suggestion. Idempotent.
    pub async fn apply_to_suggestion(
        conn: &mut sqlx::PgConnection,
        suggestion_id: DbId,
        tag_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO suggestion_tags (suggestion_id, tag_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(suggestion_id)
        .bind(tag_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// List the tags applied to a suggestion.
    pub async fn list_for_suggestion(
        pool: &PgPool,
        suggestion_id: DbId,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let query = "SELECT t.id, t.name, t.category, t.created_at FROM tags t
             JOIN suggestion_tags st ON st.tag_id = t.id
             WHERE st.suggestion_id = $1
             ORDER BY t.name";
        sqlx::query_as::<_, Tag>(query)
            .bind(suggestion_id)
            .fetch_all(pool)
            .await
    }
}
