//! Tag dictionary models. Tags are reviewer annotation only and never feed
//! back into scoring.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub category: Option<String>,
}
