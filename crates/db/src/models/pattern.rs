//! Learned pattern models and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `patterns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pattern {
    pub id: DbId,
    pub pattern_type: String,
    pub pattern_key: String,
    pub target_type: String,
    pub target_id: DbId,
    pub confidence_boost: f64,
    pub auto_apply: bool,
    pub is_active: bool,
    pub created_from_suggestion_id: Option<DbId>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub deactivated_at: Option<Timestamp>,
}

/// DTO for creating a pattern. `pattern_key` is expected to be already
/// normalized and validated by `atelier_core::pattern`.
#[derive(Debug, Clone)]
pub struct CreatePattern {
    pub pattern_type: String,
    pub pattern_key: String,
    pub target_type: String,
    pub target_id: DbId,
    pub confidence_boost: f64,
    pub auto_apply: bool,
    pub created_from_suggestion_id: Option<DbId>,
    pub notes: Option<String>,
}

/// Query parameters for listing patterns.
#[derive(Debug, Default, Deserialize)]
pub struct PatternListParams {
    pub pattern_type: Option<String>,
    /// When true (the default), only active patterns are returned.
    pub active_only: Option<bool>,
}
